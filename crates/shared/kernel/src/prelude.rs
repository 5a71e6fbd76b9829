pub use crate::config::{Configuration, Settings};
pub use crate::error::{Error, ErrorKind, Result, ResultExt, is_type};
pub use crate::ports::{DocumentStore, SchemaValidator};
pub use docket_domain::Document;
