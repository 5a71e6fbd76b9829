//! Classified errors shared by every layer of the service.
//!
//! A failure is classified exactly once, where it is first detected, by building the error
//! with [`Error::with_kind`] (or [`Error::wrap_as`] for a foreign cause). Outer layers only
//! attach context through [`Error::wrap`] / [`ResultExt::context`], which leaves the
//! classification of the chain untouched. The transport boundary reads it back with
//! [`Error::is`].
//!
//! ```rust
//! use docket_kernel::{Error, ErrorKind, ResultExt};
//!
//! fn lookup(id: &str) -> Result<(), Error> {
//!     Err(Error::not_found(format!("document with id ({id}) was not found")))
//! }
//!
//! let err = lookup("42").context("failed to get document by id (42)").unwrap_err();
//! assert!(err.is(ErrorKind::NotFound));
//! assert_eq!(
//!     err.to_string(),
//!     "failed to get document by id (42): document with id (42) was not found"
//! );
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The closed set of failure categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Not classified by the layer that produced it.
    #[default]
    Unknown,
    /// The caller supplied invalid input.
    BadRequest,
    /// The requested resource does not exist.
    NotFound,
    /// Infrastructure, serialization or programming failure.
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The owned link from an [`Error`] to whatever caused it.
#[derive(Debug)]
pub enum Cause {
    /// Another classified error; the chain continues through it.
    Classified(Box<Error>),
    /// An error from outside the taxonomy. Opaque to classification.
    Foreign(BoxError),
}

impl Cause {
    /// The cause itself, as the next link of a `source()` walk.
    #[must_use]
    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        match self {
            Self::Classified(err) => &**err,
            Self::Foreign(err) => &**err,
        }
    }

    fn new<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: BoxError = Box::new(cause);
        match boxed.downcast::<Error>() {
            Ok(classified) => Self::Classified(classified),
            Err(foreign) => Self::Foreign(foreign),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classified(err) => fmt::Display::fmt(err, f),
            Self::Foreign(err) => fmt::Display::fmt(err, f),
        }
    }
}

/// A classified error: message, kind and an optional owned cause.
///
/// `Display` renders the message fixed at construction and nothing else. `source()` yields
/// the cause itself, so a classified cause still downcasts to [`Error`].
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    cause: Option<Cause>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(Cause::as_error)
    }
}

impl Error {
    /// An unclassified error.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Unknown, message)
    }

    /// An error classified at construction.
    pub fn with_kind(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, message: message.into(), cause: None }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Internal, message)
    }

    /// Attaches context to `cause`.
    ///
    /// The new message is `"{message}: {cause}"`, computed once here. The wrapper itself is
    /// unclassified, so the chain keeps whatever classification `cause` carries.
    pub fn wrap<E>(cause: E, message: impl Into<Cow<'static, str>>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::compose(ErrorKind::Unknown, cause, &message.into())
    }

    /// Classifies a failure that originates outside the taxonomy, keeping it as the cause.
    ///
    /// Use this only where the failure is first detected.
    pub fn wrap_as<E>(kind: ErrorKind, cause: E, message: impl Into<Cow<'static, str>>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::compose(kind, cause, &message.into())
    }

    /// Classifies `cause` without adding context: the message is the cause's own rendering.
    pub fn classify<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let message = cause.to_string();
        Self { kind, message: message.into(), cause: Some(Cause::new(cause)) }
    }

    fn compose<E>(kind: ErrorKind, cause: E, message: &str) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let message = format!("{message}: {cause}");
        Self { kind, message: message.into(), cause: Some(Cause::new(cause)) }
    }

    /// The classification carried by this node alone.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// The first classification found walking the chain from this node inward.
    #[must_use]
    pub fn classification(&self) -> ErrorKind {
        if self.kind != ErrorKind::Unknown {
            return self.kind;
        }
        match &self.cause {
            Some(Cause::Classified(inner)) => inner.classification(),
            Some(Cause::Foreign(_)) | None => ErrorKind::Unknown,
        }
    }

    /// Walks the chain and reports whether any node is classified as `kind`.
    ///
    /// `Unknown` matches a chain in which no node carries a classification.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        if kind == ErrorKind::Unknown {
            return self.classification() == ErrorKind::Unknown;
        }
        if self.kind == kind {
            return true;
        }
        match &self.cause {
            Some(Cause::Classified(inner)) => inner.is(kind),
            Some(Cause::Foreign(_)) | None => false,
        }
    }
}

/// Classification check for any error value.
///
/// `None` never matches. An error that is not an [`Error`] matches only [`ErrorKind::Unknown`].
#[must_use]
pub fn is_type(err: Option<&(dyn StdError + 'static)>, kind: ErrorKind) -> bool {
    let Some(err) = err else {
        return false;
    };
    err.downcast_ref::<Error>().map_or(kind == ErrorKind::Unknown, |classified| classified.is(kind))
}

/// Context helpers for results whose error can become the cause of an [`Error`].
pub trait ResultExt<T> {
    /// Wraps the error with `message`. See [`Error::wrap`].
    ///
    /// # Errors
    /// Returns the wrapped error when `self` is `Err`.
    fn context(self, message: impl Into<Cow<'static, str>>) -> Result<T>;

    /// Like [`ResultExt::context`], building the message only on failure.
    ///
    /// # Errors
    /// Returns the wrapped error when `self` is `Err`.
    fn with_context<M, F>(self, f: F) -> Result<T>
    where
        M: Into<Cow<'static, str>>,
        F: FnOnce() -> M;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[inline]
    fn context(self, message: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|err| Error::wrap(err, message))
    }

    #[inline]
    fn with_context<M, F>(self, f: F) -> Result<T>
    where
        M: Into<Cow<'static, str>>,
        F: FnOnce() -> M,
    {
        self.map_err(|err| Error::wrap(err, f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_kind() -> impl Strategy<Value = ErrorKind> {
        prop_oneof![
            Just(ErrorKind::Unknown),
            Just(ErrorKind::BadRequest),
            Just(ErrorKind::NotFound),
            Just(ErrorKind::Internal),
        ]
    }

    #[test]
    fn new_is_unclassified() {
        let err = Error::new("some-error");
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.is(ErrorKind::Unknown));
        assert!(!err.is(ErrorKind::Internal));
    }

    #[test]
    fn display_is_the_message_only() {
        let inner = Error::not_found("missing");
        let outer = Error::wrap(inner, "lookup");
        assert_eq!(outer.to_string(), "lookup: missing");
        assert_eq!(outer.message(), "lookup: missing");
        assert_eq!(format!("{:?}", outer.message()), "\"lookup: missing\"");
    }

    #[test]
    fn wrapper_is_unclassified_but_chain_is_not() {
        let err = Error::wrap(Error::bad_request("bad id"), "failed to get document");
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.classification(), ErrorKind::BadRequest);
        assert!(err.is(ErrorKind::BadRequest));
        assert!(!err.is(ErrorKind::Unknown));
    }

    #[test]
    fn foreign_causes_are_opaque() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::wrap(io, "reading schema");
        assert!(err.is(ErrorKind::Unknown));
        assert!(!err.is(ErrorKind::NotFound));
        assert!(matches!(err.cause(), Some(Cause::Foreign(_))));
    }

    #[test]
    fn wrap_as_classifies_foreign_failures() {
        let io = std::io::Error::other("disk full");
        let err = Error::wrap_as(ErrorKind::Internal, io, "write failed");
        assert!(err.is(ErrorKind::Internal));
        assert_eq!(err.to_string(), "write failed: disk full");
    }

    #[test]
    fn classify_keeps_the_cause_rendering() {
        let err = Error::classify(ErrorKind::Internal, std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "boom");
        assert!(err.is(ErrorKind::Internal));
    }

    #[test]
    fn is_type_handles_absent_and_foreign_errors() {
        let kinds = [ErrorKind::Unknown, ErrorKind::BadRequest, ErrorKind::NotFound, ErrorKind::Internal];
        for kind in kinds {
            assert!(!is_type(None, kind));
        }

        let foreign: &(dyn StdError + 'static) = &std::fmt::Error;
        assert!(is_type(Some(foreign), ErrorKind::Unknown));
        assert!(!is_type(Some(foreign), ErrorKind::BadRequest));

        let classified = Error::not_found("gone");
        let classified: &(dyn StdError + 'static) = &classified;
        assert!(is_type(Some(classified), ErrorKind::NotFound));
    }

    #[test]
    fn source_chain_is_walkable() {
        let io = std::io::Error::other("socket closed");
        let err = Error::wrap(Error::wrap_as(ErrorKind::Internal, io, "read"), "handler");

        let mut rendered = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = Some(&err);
        while let Some(e) = current {
            rendered.push(e.to_string());
            current = e.source();
        }
        assert_eq!(rendered, ["handler: read: socket closed", "read: socket closed", "socket closed"]);
    }

    #[test]
    fn source_keeps_classified_causes_inspectable() {
        let err = Error::wrap(Error::not_found("gone"), "outer");

        let source = err.source();
        assert!(source.and_then(|s| s.downcast_ref::<Error>()).is_some());
        assert!(is_type(source, ErrorKind::NotFound));
        assert!(!is_type(source, ErrorKind::Unknown));

        let twice = Error::wrap(err, "outermost");
        let inner = twice.source().and_then(|e| e.source());
        assert!(is_type(inner, ErrorKind::NotFound));
        assert_eq!(inner.map(ToString::to_string).as_deref(), Some("gone"));
    }

    #[test]
    fn context_helpers_wrap() {
        let res: std::result::Result<(), Error> = Err(Error::not_found("x"));
        let err = res.with_context(|| format!("id ({})", 7)).unwrap_err();
        assert_eq!(err.to_string(), "id (7): x");
        assert!(err.is(ErrorKind::NotFound));
    }

    proptest! {
        #[test]
        fn classification_survives_any_number_of_wraps(
            kind in any_kind(),
            queried in any_kind(),
            wraps in 0usize..16,
        ) {
            let mut err = Error::with_kind(kind, "innermost");
            for depth in 0..wraps {
                err = Error::wrap(err, format!("layer {depth}"));
            }
            prop_assert_eq!(err.is(queried), queried == kind);
            prop_assert_eq!(err.classification(), kind);
        }
    }
}
