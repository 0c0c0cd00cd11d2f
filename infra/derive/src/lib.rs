#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every Tally crate:
//!
//! * [`macro@tally_error`] turns an enum into a `thiserror` error with `.context(..)` support.
//! * [`macro@tally_slice`] wraps feature state into an `Arc` handle registered with the kernel.
//! * [`macro@api_model`] / [`macro@api_handler`] keep DTOs and handlers consistent with `OpenAPI`.
//! * [`macro@main`] boots a Tokio runtime profile from `tally-runtime`.
//!
//! Examples are `ignore`d here because a proc-macro crate cannot use its own macros;
//! working usages live in the consuming crates and in `tests/`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns `async fn main` into a plain `fn main` running on a `tally-runtime` profile.
///
/// Profiles: `server`, `tool`, `default` (no argument).
///
/// ```rust,ignore
/// #[tally_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares a request/response model for the HTTP API.
///
/// * Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` unless already derived.
/// * Applies `#[serde(rename_all = "camelCase")]` unless `rename_all = "..."` is given.
/// * Applies `#[serde(deny_unknown_fields)]` unless `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[api_model(rename_all = "snake_case")]
/// pub struct TodoView {
///     pub id: String,
///     pub task_complete: bool,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an axum handler with `utoipa::path`, forwarding the arguments unchanged.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "system")]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines an error enum wired into the workspace error conventions.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * A `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant carrying a `source` field.
/// * `From<Source>` for those variants, so `?` works on upstream errors.
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for the `#[error(..)]` strings.
///
/// # Requirements
///
/// Variants use named fields only. A variant with a source must also have
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[tally_error]
/// pub enum DatabaseError {
///     #[error("I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal database error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &Path) -> Result<Vec<u8>, DatabaseError> {
///     std::fs::read(path).context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn tally_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares the shared state of a feature slice.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is an `Arc` handle that
/// derefs to it and implements `tally_kernel::domain::registry::FeatureSlice`.
///
/// ```rust,ignore
/// #[tally_derive::tally_slice]
/// pub struct Todos {
///     pub store: Collection<TodoRecord>,
/// }
///
/// let slice = Todos::new(TodosInner { store });
/// ```
#[proc_macro_attribute]
pub fn tally_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
