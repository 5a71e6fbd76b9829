use docket_derive::docket_error;
use std::borrow::Cow;

#[docket_error]
pub enum LookupError {
    #[kind(NotFound)]
    #[error("Missing{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unclassified{}: {message}", format_context(.context))]
    Other { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = LookupError::Missing { message: "key".into(), context: None };
    let classified: docket_kernel::Error = err.into();
    assert!(classified.is(docket_kernel::ErrorKind::NotFound));
}
