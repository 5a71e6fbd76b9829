use crate::engine::Storage;
use crate::error::StorageError;
use crate::security;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A validated collection directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(Arc<str>);

impl TryFrom<String> for CollectionName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.trim().to_lowercase();

        if name.is_empty() {
            return Err(StorageError::PathTraversalAttempt {
                message: "EMPTY".into(),
                context: Some("Collection name cannot be empty".into()),
            });
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::PathTraversalAttempt {
                message: name.into(),
                context: Some("Collection name contains illegal characters".into()),
            });
        }

        Ok(Self(name.into()))
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A view of the storage engine scoped to one collection.
///
/// File names are sharded two levels deep by their first four characters:
/// `abcdef.json` lands at `<root>/<collection>/ab/cd/abcdef.json`. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Collection {
    storage: Storage,
    name: CollectionName,
}

impl Collection {
    pub(crate) const fn new(storage: Storage, name: CollectionName) -> Self {
        Self { storage, name }
    }

    #[must_use]
    pub const fn name(&self) -> &CollectionName {
        &self.name
    }

    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Resolves `file_name` to its sharded physical path inside the sandbox.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the result escapes the sandbox.
    pub fn resolve(&self, file_name: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_sharded(&self.storage.root, self.name.as_ref(), file_name)
    }

    /// Reads a file, decompressing it when the engine compresses.
    ///
    /// # Errors
    /// Returns [`StorageError::FileNotFound`] if the file does not exist.
    pub async fn read(&self, file_name: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(file_name)?;
        self.storage.read_resolved(&resolved).await
    }

    /// Writes a file atomically.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] when the disk refuses the write.
    pub async fn write(
        &self,
        file_name: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = self.resolve(file_name)?;
        self.storage.write_resolved(&resolved, data).await
    }

    /// # Errors
    /// Only path resolution failures are reported; a missing file is `Ok(false)`.
    pub fn exists(&self, file_name: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(file_name)?.exists())
    }
}
