//! Where the engine keeps its files and how it writes them.

use crate::engine::{Compression, Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use docket_kernel::config::Configuration;
use docket_kernel::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

pub const DATA_DIR_KEY: &str = "storage.data_dir";
pub const COMPRESSION_KEY: &str = "storage.compression";

/// Settings needed to open a [`Storage`] root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    root: PathBuf,
    compression: Compression,
    create: bool,
}

impl StorageOptions {
    /// Uncompressed storage under `root`, created on open if missing.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), compression: Compression::None, create: true }
    }

    /// Reads `storage.data_dir` (required) and `storage.compression` (`none` when unset).
    ///
    /// # Errors
    /// `NotFound` without a data directory; `Internal` for an unknown compression.
    pub fn from_config(conf: &impl Configuration) -> Result<Self> {
        let root = conf.get_string(DATA_DIR_KEY)?;
        let compression = optional(conf.get_string(COMPRESSION_KEY), String::new)?
            .parse::<Compression>()
            .context(format!("invalid value for {COMPRESSION_KEY}"))?;
        Ok(Self::new(root).compression(compression))
    }

    #[must_use]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Whether [`StorageOptions::open`] creates a missing root. On by default.
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens the sandbox: ensures the root exists, canonicalizes it and purges temp files
    /// left by interrupted writes.
    ///
    /// # Errors
    /// [`StorageError::DirectoryNotFound`] when the root is missing and creation is off,
    /// [`StorageError::Io`] when it cannot be created or resolved.
    pub async fn open(self) -> Result<Storage, StorageError> {
        let Self { root, compression, create } = self;

        if create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to create storage root: {}", root.display()))?;
        } else if !fs::try_exists(&root).await.unwrap_or(false) {
            return Err(StorageError::DirectoryNotFound {
                message: root.display().to_string().into(),
                context: Some("Storage root must exist when create is disabled".into()),
            });
        }

        let canonical = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;
        info!(path = %canonical.display(), ?compression, "Storage root opened");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };
        storage.purge_tmp().await;
        Ok(storage)
    }
}

/// Falls back to `default` when the key is absent; other lookup failures pass through.
pub(crate) fn optional(value: Result<String>, default: impl FnOnce() -> String) -> Result<String> {
    match value {
        Ok(value) => Ok(value),
        Err(err) if err.is(ErrorKind::NotFound) => Ok(default()),
        Err(err) => Err(err),
    }
}
