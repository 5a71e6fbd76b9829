//! # Schema
//!
//! A registry of named, compiled JSON Schemas.
//!
//! Request handlers validate raw bytes before decoding them, so malformed or incomplete
//! payloads are rejected as `BadRequest` with a message that lists every violation.
//!
//! * **Shared**: cloning a [`SchemaRegistry`] shares the same entries.
//! * **Concurrent**: `FxHashMap` + `parking_lot::RwLock`; validation runs outside the lock.
//!
//! ```rust
//! use docket_kernel::prelude::*;
//! use docket_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::new();
//! registry.set_schema("tag", br#"{"type":"string","maxLength":3}"#).unwrap();
//!
//! assert!(registry.validate("tag", br#""abc""#).is_ok());
//! let err = registry.validate("tag", br#""abcd""#).unwrap_err();
//! assert!(err.is(ErrorKind::BadRequest));
//! ```

use docket_kernel::ports::SchemaValidator;
use docket_kernel::{Error, ErrorKind, Result};
use fxhash::FxHashMap;
use jsonschema::Validator;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Thread-safe store of compiled validators keyed by schema name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Arc<RwLock<FxHashMap<String, Arc<Validator>>>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Arc<Validator>> {
        self.schemas.read().get(name).cloned()
    }
}

impl SchemaValidator for SchemaRegistry {
    fn set_schema(&self, name: &str, schema: &[u8]) -> Result<()> {
        let document: Value = serde_json::from_slice(schema)
            .map_err(|e| Error::wrap_as(ErrorKind::BadRequest, e, "failed to read json schema"))?;
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| Error::bad_request(format!("failed to read json schema: {e}")))?;

        let replaced = self.schemas.write().insert(name.to_owned(), Arc::new(validator)).is_some();
        debug!(schema = name, replaced, "Schema registered");
        Ok(())
    }

    fn validate(&self, name: &str, input: &[u8]) -> Result<()> {
        let validator =
            self.get(name).ok_or_else(|| Error::internal(format!("no schema found for: {name}")))?;

        let instance: Value = serde_json::from_slice(input)
            .map_err(|e| Error::wrap_as(ErrorKind::BadRequest, e, "failed to read json input"))?;

        let violations: Vec<String> = validator
            .iter_errors(&instance)
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "/".to_owned() } else { path };
                format!("{path}: {e}")
            })
            .collect();

        if violations.is_empty() {
            trace!(schema = name, "Payload accepted");
            return Ok(());
        }

        Err(Error::bad_request(format!(
            "json is not valid according to the json schema. Errors: {}",
            violations.join("; ")
        )))
    }
}
