//! File-backed document storage.
//!
//! Two layers:
//! 1. **[`Storage`]**: a sandboxed engine over one root directory. Paths are normalized and
//!    checked against the canonical root, writes go through a temp file, `fsync` and rename,
//!    and payloads are optionally LZ4 compressed. Stale temp files from interrupted writes
//!    are purged on connect.
//! 2. **[`DocumentRepository`]**: the domain's [`DocumentStore`](docket_kernel::ports::DocumentStore),
//!    storing each document as JSON under a sharded [`Collection`].
//!
//! Failures surface as [`StorageError`] internally and are classified into
//! [`docket_kernel::Error`] at the repository boundary.
//!
//! ```rust
//! use docket_kernel::prelude::*;
//! use docket_storage::DocumentRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let dir = tmp.path().display().to_string().replace('\\', "/");
//!     let settings = Settings::from_toml(&format!("[storage]\ndata_dir = \"{dir}\""))?;
//!     let store = DocumentRepository::connect(&settings).await?;
//!
//!     let id = store.save_document(&Document::new("a", Default::default())).await?;
//!     assert_eq!(store.get_document_by_id(&id).await?.name, "a");
//!
//!     store.teardown().await
//! }
//! ```

mod collection;
mod documents;
mod engine;
mod error;
mod id;
mod maintenance;
mod options;
mod security;

pub use collection::{Collection, CollectionName};
pub use documents::{COLLECTION_KEY, DocumentRepository};
pub use engine::{Compression, Storage};
pub use error::{StorageError, StorageErrorExt};
pub use options::{COMPRESSION_KEY, DATA_DIR_KEY, StorageOptions};
