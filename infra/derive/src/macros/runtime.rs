use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, ItemFn, ReturnType, Type};

/// Expands `#[tally_runtime::main(profile)]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            input.sig.fn_token,
            "#[tally_runtime::main] can only wrap an `async fn`",
        )
        .to_compile_error();
    }

    if !input.sig.inputs.is_empty() {
        return Error::new_spanned(&input.sig.inputs, "#[tally_runtime::main] takes no arguments")
            .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[tally_runtime::main] requires the function to return a Result",
        )
        .to_compile_error();
    }

    let profile = match profile_constructor(args) {
        Ok(profile) => profile,
        Err(err) => return err,
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let profile = #profile;
            let runtime = ::tally_runtime::build_runtime(&profile)?;
            runtime.block_on(async move #block)
        }
    }
}

fn profile_constructor(args: TokenStream) -> Result<TokenStream, TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::tally_runtime::RuntimeProfile::default() });
    }

    let ident: syn::Ident = syn::parse2(args).map_err(|err| err.to_compile_error())?;
    match ident.to_string().as_str() {
        "server" => Ok(quote! { ::tally_runtime::RuntimeProfile::server() }),
        "tool" => Ok(quote! { ::tally_runtime::RuntimeProfile::tool() }),
        "default" => Ok(quote! { ::tally_runtime::RuntimeProfile::default() }),
        other => Err(Error::new_spanned(
            &ident,
            format!("unknown runtime profile `{other}`; expected `server`, `tool` or `default`"),
        )
        .to_compile_error()),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
