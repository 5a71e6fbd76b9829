//! Documents feature slice.
//!
//! [`DocumentDomain`] is the service the transport adapters call. It owns the persistence
//! port exclusively, forwards every call to it, and wraps failures with what was being
//! attempted. Classification is left to the store, so a `NotFound` from the store is still a
//! `NotFound` after wrapping.

use docket_kernel::domain::Document;
use docket_kernel::ports::DocumentStore;
use docket_kernel::{Result, ResultExt};
use std::future::Future;
use tracing::{debug, info};

/// Document use cases as seen by driving adapters.
pub trait DocumentService: Send + Sync + 'static {
    fn get_document(&self, id: &str) -> impl Future<Output = Result<Document>> + Send;

    /// Stores `doc` and returns the id assigned by the store.
    fn add_document(&self, doc: Document) -> impl Future<Output = Result<String>> + Send;

    /// Releases the persistence port. Meant to be called once, during shutdown.
    fn teardown(&self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug)]
pub struct DocumentDomain<S> {
    store: S,
}

impl<S: DocumentStore> DocumentDomain<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store, mainly for inspection in tests.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: DocumentStore> DocumentService for DocumentDomain<S> {
    async fn get_document(&self, id: &str) -> Result<Document> {
        let doc = self
            .store
            .get_document_by_id(id)
            .await
            .with_context(|| format!("failed to get document by id ({id})"))?;
        debug!(%id, name = %doc.name, "Document fetched");
        Ok(doc)
    }

    async fn add_document(&self, doc: Document) -> Result<String> {
        self.store
            .save_document(&doc)
            .await
            .with_context(|| format!("failed to save document ({})", doc.name))
    }

    async fn teardown(&self) -> Result<()> {
        self.store.teardown().await.context("failed to gracefully teardown document store")?;
        info!("Document domain torn down");
        Ok(())
    }
}
