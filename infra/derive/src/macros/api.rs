use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token};

const DEFAULT_RENAME: &str = "camelCase";

/// Expands `#[api_model]`: derives plus the serde naming and strictness policy.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let args = match ModelArgs::parse(args) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error(),
    };
    let existing = SerdeAttrs::collect(&input.attrs);
    let derives = derived_traits(&input.attrs);

    let derive_attr = missing_derives(&derives);

    let rename = args.rename_all.unwrap_or_else(|| LitStr::new(DEFAULT_RENAME, Span::call_site()));
    let rename_attr = match &existing.rename_all {
        Some(current) if current.value() != rename.value() => {
            return syn::Error::new_spanned(
                current,
                "serde(rename_all) disagrees with api_model(rename_all); keep only one",
            )
            .to_compile_error();
        },
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #rename)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (existing.deny_unknown_fields, deny) {
        (true, false) => {
            return syn::Error::new_spanned(
                &input.ident,
                "serde(deny_unknown_fields) is set explicitly; remove it before opting out",
            )
            .to_compile_error();
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote! {},
    };

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands `#[api_handler(..)]` into a `utoipa::path` registration.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

impl ModelArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
        let mut parsed = Self::default();

        for meta in metas {
            let Meta::NameValue(nv) = meta else {
                return Err(syn::Error::new_spanned(
                    meta,
                    "expected `rename_all = \"...\"` or `deny_unknown_fields = bool`",
                ));
            };

            if nv.path.is_ident("rename_all") {
                if parsed.rename_all.is_some() {
                    return Err(syn::Error::new_spanned(&nv, "duplicate `rename_all`"));
                }
                parsed.rename_all = Some(string_literal(&nv)?);
            } else if nv.path.is_ident("deny_unknown_fields") {
                if parsed.deny_unknown_fields.is_some() {
                    return Err(syn::Error::new_spanned(&nv, "duplicate `deny_unknown_fields`"));
                }
                parsed.deny_unknown_fields = Some(bool_literal(&nv)?);
            } else {
                return Err(syn::Error::new_spanned(
                    &nv.path,
                    "unsupported argument; expected `rename_all` or `deny_unknown_fields`",
                ));
            }
        }

        Ok(parsed)
    }
}

fn string_literal(nv: &MetaNameValue) -> syn::Result<LitStr> {
    if let Expr::Lit(expr) = &nv.value
        && let Lit::Str(lit) = &expr.lit
    {
        return Ok(lit.clone());
    }
    Err(syn::Error::new_spanned(&nv.value, "expected a string literal"))
}

fn bool_literal(nv: &MetaNameValue) -> syn::Result<bool> {
    if let Expr::Lit(expr) = &nv.value
        && let Lit::Bool(lit) = &expr.lit
    {
        return Ok(lit.value);
    }
    Err(syn::Error::new_spanned(&nv.value, "expected `true` or `false`"))
}

#[derive(Default)]
struct SerdeAttrs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl SerdeAttrs {
    fn collect(attrs: &[Attribute]) -> Self {
        let mut found = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    found.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    found.deny_unknown_fields = true;
                } else if meta.input.peek(Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                }
                Ok(())
            });
        }
        found
    }
}

fn missing_derives(derives: &FxHashSet<String>) -> TokenStream {
    let mut tokens = Vec::new();
    if !derives.contains("Debug") {
        tokens.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        tokens.push(quote! { ::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        tokens.push(quote! { ::serde::Deserialize });
    }
    if !derives.contains("ToSchema") {
        tokens.push(quote! { ::utoipa::ToSchema });
    }

    if tokens.is_empty() { quote! {} } else { quote! { #[derive(#(#tokens),*)] } }
}

/// Names of the traits listed in `#[derive(..)]`, by last path segment.
pub(crate) fn derived_traits(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                traits.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}
