//! # Domain Models
//!
//! Plain data shared by every Tally crate: configuration sections, API constants,
//! the records kept in the document store and the feature-slice registry.
//! Depends on `serde` only; no I/O and no business logic belong here.

pub mod config;
pub mod constants;
pub mod records;
pub mod registry;
