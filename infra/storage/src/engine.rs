//! Sandboxed, atomic and optionally compressed file I/O.
//!
//! [`Storage`] owns the physical root. Every path it touches is resolved through
//! [`crate::security`] first; [`crate::collection::Collection`] views add the collection
//! prefix and shard directories on top.

use crate::collection::{Collection, CollectionName};
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Marker embedded in temporary file names; also what the startup purge looks for.
pub(crate) const TMP_MARKER: &str = ".dockettmp.";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(&data).context("Lz4 decompression failed")
            },
        }
    }
}

impl FromStr for Compression {
    type Err = StorageError;

    /// Parses the `storage.compression` setting: `none` or `lz4`, in any letter case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "lz4" => Ok(Self::Lz4),
            other => Err(StorageError::Internal {
                message: format!("unsupported compression: {other}").into(),
                context: None,
            }),
        }
    }
}

#[derive(Debug)]
pub struct StorageInner {
    /// Canonical physical root; every resolved path starts with it.
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    pub(crate) tmp_counter: AtomicU64,
}

/// A cloneable handle to the storage sandbox.
///
/// # Example
///
/// ```rust
/// use docket_storage::{Compression, StorageError, StorageOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("data");
///     let storage = StorageOptions::new(&root).compression(Compression::Lz4).open().await?;
///
///     let documents = storage.collection("documents")?;
///     documents.write("65a1f0c2e4b0a1b2c3d4e5f6.json", br#"{"name":"a"}"#).await?;
///
///     // <root>/documents/65/a1/65a1f0c2e4b0a1b2c3d4e5f6.json
///     let path = documents.resolve("65a1f0c2e4b0a1b2c3d4e5f6.json")?;
///     assert!(path.ends_with("documents/65/a1/65a1f0c2e4b0a1b2c3d4e5f6.json"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    /// Returns a sharded view scoped to one collection directory.
    ///
    /// Names are lowercased and limited to ASCII alphanumerics and underscores.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] for an empty or illegal name.
    pub fn collection<N>(&self, name: N) -> Result<Collection, StorageError>
    where
        N: TryInto<CollectionName, Error = StorageError>,
    {
        Ok(Collection::new(self.clone(), name.try_into()?))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.inner.compression
    }

    /// Resolves `path` relative to the root without sharding.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Reads and decompresses the file at an already resolved path.
    pub(crate) async fn read_resolved(&self, resolved: &Path) -> Result<Vec<u8>, StorageError> {
        let data = match fs::read(resolved).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", resolved.display()).into()),
                });
            },
        };

        self.inner.compression.decompress(data)
    }

    /// Writes `data` to an already resolved path with a temp-file swap.
    ///
    /// The payload goes to `<name>.dockettmp.<n>`, is fsynced, then renamed over the target,
    /// so readers never observe a partial file. Shard directories are created on demand.
    pub(crate) async fn write_resolved(
        &self,
        resolved: &Path,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create shards for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(resolved, &self.tmp_counter);
        let payload = self.inner.compression.compress(data);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&payload).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                        .into(),
                ),
            });
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), "File saved atomically");
        Ok(())
    }

    /// Flushes directory metadata for the root.
    pub async fn sync_root(&self) {
        sync_dir(&self.root).await;
    }

    /// Removes orphaned temp files left behind by an interrupted write.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("document");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{n}"))
}
