use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ExprLit, ItemFn, Lit, Meta, ReturnType, Token, Type};

const ATTRIBUTE: &str = "#[docket_runtime::main]";

/// Expands `#[docket_runtime::main(profile, key = value, ..)]`.
///
/// The optional leading profile is `server` or `default`. Overrides:
/// `worker_threads = <int>`, `thread_name = "<str>"` and `shutdown_timeout_ms = <int>`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    match expand(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(args: TokenStream, input: &ItemFn) -> syn::Result<TokenStream> {
    check_signature(input)?;
    let config = runtime_config(args)?;

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    Ok(quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let runtime_config = #config;
            let runtime = ::docket_runtime::build_runtime(&runtime_config)?;
            let outcome = runtime.block_on(async #block);
            runtime.shutdown_timeout(runtime_config.shutdown_timeout);
            outcome
        }
    })
}

fn check_signature(input: &ItemFn) -> syn::Result<()> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            &input.sig.ident,
            format!("{ATTRIBUTE} can only be used on async functions"),
        ));
    }
    if !input.sig.inputs.is_empty() {
        return Err(Error::new_spanned(
            &input.sig.inputs,
            format!("{ATTRIBUTE} functions take no arguments"),
        ));
    }
    let returns_result = match &input.sig.output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(path) => path.path.segments.last().is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if !returns_result {
        return Err(Error::new_spanned(
            &input.sig.output,
            format!("{ATTRIBUTE} requires a Result return type"),
        ));
    }
    Ok(())
}

/// Builds the `RuntimeConfig` expression: the profile first, then each override in order.
fn runtime_config(args: TokenStream) -> syn::Result<TokenStream> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;

    let mut profile = quote! { ::docket_runtime::RuntimeConfig::default() };
    let mut overrides = Vec::new();

    for (position, meta) in metas.into_iter().enumerate() {
        match meta {
            Meta::Path(path) if position == 0 => {
                profile = match path.get_ident().map(ToString::to_string).as_deref() {
                    Some("server") => quote! { ::docket_runtime::RuntimeConfig::server() },
                    Some("default") => quote! { ::docket_runtime::RuntimeConfig::default() },
                    _ => {
                        return Err(Error::new_spanned(
                            path,
                            "Unknown runtime profile. Use: server or default",
                        ));
                    },
                };
            },
            Meta::NameValue(pair) => {
                let key = pair.path.get_ident().map(ToString::to_string).unwrap_or_default();
                let Expr::Lit(ExprLit { lit, .. }) = &pair.value else {
                    return Err(Error::new_spanned(&pair.value, "expected a literal"));
                };
                overrides.push(match (key.as_str(), lit) {
                    ("worker_threads", Lit::Int(n)) => {
                        let n = n.base10_parse::<usize>()?;
                        quote! { .with_worker_threads(#n) }
                    },
                    ("thread_name", Lit::Str(name)) => quote! { .with_thread_name(#name) },
                    ("shutdown_timeout_ms", Lit::Int(ms)) => {
                        let ms = ms.base10_parse::<u64>()?;
                        quote! { .with_shutdown_timeout(::std::time::Duration::from_millis(#ms)) }
                    },
                    _ => {
                        return Err(Error::new_spanned(
                            &pair,
                            "Unknown override. Use: worker_threads = <int>, \
                             thread_name = \"<str>\" or shutdown_timeout_ms = <int>",
                        ));
                    },
                });
            },
            other => {
                return Err(Error::new_spanned(
                    other,
                    "The profile must come first, followed by key = value overrides",
                ));
            },
        }
    }

    Ok(quote! { #profile #(#overrides)* })
}
