#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the docket infrastructure crates.
//!
//! * [`macro@docket_error`] turns a plain enum into a context-aware error type and,
//!   optionally, bridges it into the shared `docket_kernel::Error` taxonomy.
//! * [`macro@main`] bootstraps the tuned Tokio runtime from `docket-runtime`.
//!
//! Examples are `ignore`d to avoid compiling in this crate; the integration tests under
//! `tests/` exercise the real expansions.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap the docket Tokio runtime.
///
/// Transforms an `async fn main` into a standard `fn main` that builds a runtime from the
/// selected profile, blocks on the body, and shuts the runtime down with a bounded timeout.
///
/// # Arguments
///
/// * `server` - Tuned for a long-running network service.
/// * `default` - Worker threads auto-detected, conservative stack size.
///
/// The profile may be followed by overrides: `worker_threads = 2`,
/// `thread_name = "docket-io"` and `shutdown_timeout_ms = 500`.
///
/// # Examples
///
/// ```rust,ignore
/// #[docket_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for infrastructure error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
/// * **Classification**: Variants tagged `#[kind(NotFound)]` (or `BadRequest`, `Internal`,
///   `Unknown`) make the macro emit `kind()` and `From<Enum> for docket_kernel::Error`.
///   Untagged variants classify as `Unknown`. The consuming crate must depend on
///   `docket-kernel` when any variant is tagged.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants with a `source` field must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[docket_derive::docket_error]
/// pub enum StoreError {
///     #[kind(NotFound)]
///     #[error("Missing{}: {message}", format_context(.context))]
///     Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[kind(Internal)]
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn docket_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
