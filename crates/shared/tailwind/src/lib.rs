//! # Tailwind configuration documents
//!
//! Reads, checks and writes the `tailwind.config.js` files that drive the frontend's CSS
//! build. Nothing here generates CSS or runs plugins; the documents are plain data handed
//! to the Tailwind CLI.
//!
//! ```rust
//! use tally_tailwind::{ContentSet, TailwindConfig};
//!
//! let config = TailwindConfig::from_js(r#"
//!     /** @type {import('tailwindcss').Config} */
//!     module.exports = {
//!         content: ["./frontend/templates/**/*.{html,js}", "./node_modules/flowbite/**/*.js"],
//!         theme: { extend: {} },
//!         darkMode: "class",
//!         plugins: [require("flowbite/plugin")],
//!     };
//! "#)?;
//!
//! assert_eq!(config.content[1], "./node_modules/flowbite/**/*.js");
//! assert!(config.validate().is_ok());
//! assert!(ContentSet::compile(&config)?.matches("frontend/templates/home.html"));
//! # Ok::<(), tally_tailwind::TailwindError>(())
//! ```

mod content;
mod diff;
mod document;
mod error;
mod loader;
mod parser;
mod render;
mod validate;

pub use crate::content::ContentSet;
pub use crate::diff::FieldDiff;
pub use crate::document::{DarkMode, PluginRef, TailwindConfig, Theme};
pub use crate::error::{TailwindError, TailwindErrorExt};
pub use crate::loader::{Format, LoadedDocument, load_all};
pub use crate::validate::{Problem, ValidationReport};
