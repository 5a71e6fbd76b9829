//! Kernel utilities shared across the service layers.
//!
//! * [`error`]: the classified error taxonomy every layer speaks.
//! * [`config`]: typed lookups by dotted key over file and environment sources.
//! * [`ports`]: the traits driven adapters implement for the domain.
//!
//! ```rust
//! use docket_kernel::prelude::*;
//!
//! let settings = Settings::from_toml("[server]\nport = 8080\ntimeout = \"5s\"").unwrap();
//! assert_eq!(settings.get_int("server.port").unwrap(), 8080);
//!
//! let err = settings.get_int("server.missing").unwrap_err();
//! assert!(err.is(ErrorKind::NotFound));
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod prelude;

pub use docket_domain as domain;
pub use error::{Cause, Error, ErrorKind, Result, ResultExt, is_type};
