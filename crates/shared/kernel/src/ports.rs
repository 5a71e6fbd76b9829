//! Contracts between the domain and its driven adapters.
//!
//! Implementations classify their own failures into the shared taxonomy before returning,
//! so callers only ever wrap.

use crate::error::Result;
use docket_domain::Document;
use std::future::Future;

/// Persistence port for documents.
///
/// Implementations must be safe for concurrent use: requests run on independent tasks and
/// may overlap with [`DocumentStore::teardown`].
pub trait DocumentStore: Send + Sync + 'static {
    /// Loads the document stored under `id`.
    ///
    /// Expected classifications: `BadRequest` for a malformed id, `NotFound` for an unknown
    /// one, `Internal` for everything else.
    fn get_document_by_id(&self, id: &str) -> impl Future<Output = Result<Document>> + Send;

    /// Persists `doc` and returns the id assigned to it.
    fn save_document(&self, doc: &Document) -> impl Future<Output = Result<String>> + Send;

    /// Releases every resource held by the store. Called once, during shutdown.
    fn teardown(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Registry of named schemas used to validate raw request payloads.
pub trait SchemaValidator: Send + Sync + 'static {
    /// Compiles and registers `schema` under `name`, replacing any previous entry.
    ///
    /// # Errors
    /// `BadRequest` when `schema` is not a valid schema document.
    fn set_schema(&self, name: &str, schema: &[u8]) -> Result<()>;

    /// Validates `input` against the schema registered under `name`.
    ///
    /// # Errors
    /// `BadRequest` when `input` is not JSON or violates the schema; `Internal` when no schema
    /// is registered under `name`.
    fn validate(&self, name: &str, input: &[u8]) -> Result<()>;
}
