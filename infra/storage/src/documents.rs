//! The [`DocumentStore`] adapter over the storage sandbox.
//!
//! Each document is one JSON file named after its id, inside a sharded collection directory.

use crate::collection::Collection;
use crate::engine::Storage;
use crate::error::{StorageError, StorageErrorExt};
use crate::id::{self, IdGenerator};
use crate::options::{StorageOptions, optional};
use docket_kernel::domain::Document;
use docket_kernel::domain::constants::DEFAULT_COLLECTION;
use docket_kernel::config::Configuration;
use docket_kernel::ports::DocumentStore;
use docket_kernel::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub const COLLECTION_KEY: &str = "storage.collection";

const FILE_EXTENSION: &str = "json";

/// File-backed document repository.
#[derive(Debug)]
pub struct DocumentRepository {
    collection: Collection,
    ids: IdGenerator,
    closed: AtomicBool,
}

impl DocumentRepository {
    /// Opens the repository described by the `storage.*` keys of `conf`.
    ///
    /// `storage.data_dir` is required. `storage.collection` defaults to `documents` and
    /// `storage.compression` to `none`.
    ///
    /// # Errors
    /// Configuration errors keep their classification. Failures to open the data directory
    /// are Internal.
    pub async fn connect(conf: &impl Configuration) -> Result<Self> {
        let options = StorageOptions::from_config(conf)?;
        let collection =
            optional(conf.get_string(COLLECTION_KEY), || DEFAULT_COLLECTION.to_owned())?;

        let storage = options.open().await?;
        Self::open(&storage, collection.as_str())
    }

    /// Binds the repository to `collection` inside an already connected engine.
    ///
    /// # Errors
    /// BadRequest for an illegal collection name, Internal if the id generator cannot be
    /// seeded.
    pub fn open(storage: &Storage, collection: &str) -> Result<Self> {
        let collection = storage.collection(collection)?;
        let ids = IdGenerator::new()?;
        info!(collection = %collection.name(), root = %storage.root().display(), "Document repository opened");
        Ok(Self { collection, ids, closed: AtomicBool::new(false) })
    }

    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::internal("document store is closed"));
        }
        Ok(())
    }

    fn file_name(id: &str) -> String {
        format!("{id}.{FILE_EXTENSION}")
    }
}

impl DocumentStore for DocumentRepository {
    async fn get_document_by_id(&self, id: &str) -> Result<Document> {
        self.ensure_open()?;

        if !id::is_valid(id) {
            return Err(Error::bad_request(format!("id ({id}) is not a valid document id")));
        }
        let id = id.to_ascii_lowercase();

        let bytes = match self.collection.read(Self::file_name(&id)).await {
            Ok(bytes) => bytes,
            Err(err @ StorageError::FileNotFound { .. }) => {
                debug!(%id, error = %err, "Document lookup missed");
                return Err(Error::not_found(format!("document with id ({id}) was not found")));
            },
            Err(err) => return Err(err.into()),
        };

        let document = serde_json::from_slice::<Document>(&bytes)
            .context(format!("Corrupted document {id}"))?;
        Ok(document)
    }

    async fn save_document(&self, doc: &Document) -> Result<String> {
        self.ensure_open()?;

        let bytes = serde_json::to_vec(doc).context("Failed to encode document")?;
        let id = self.ids.next_id();
        self.collection.write(Self::file_name(&id), &bytes).await?;

        debug!(%id, name = %doc.name, "Document stored");
        Ok(id)
    }

    async fn teardown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::internal("document store is closed"));
        }
        self.collection.storage().sync_root().await;
        info!(collection = %self.collection.name(), "Document repository closed");
        Ok(())
    }
}
