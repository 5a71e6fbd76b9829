use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

/// Collapses `.` and `..` lexically; `..` may never climb above the relative base.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(path, "Path attempted to escape sandbox via '..'"));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "Absolute paths are not allowed in sandbox"));
            },
        }
    }

    Ok(out)
}

/// Joins `path` to `root`, rejecting anything that lands outside it.
///
/// Existing paths are canonicalized so symlinks are followed before the check. For paths
/// that do not exist yet, the closest existing ancestor is checked instead.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(_) => Err(traversal(path, "Path resolves outside the sandbox")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => check_ancestors(root, joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// Resolves `file_name` inside `collection` with two shard levels taken from its first four
/// characters. Shorter names are stored unsharded.
pub(crate) fn resolve_sharded(
    root: &Path,
    collection: &str,
    file_name: impl AsRef<Path>,
) -> Result<PathBuf, StorageError> {
    let file_name = file_name.as_ref();
    let name = file_name
        .file_name()
        .filter(|name| Path::new(name) == file_name)
        .and_then(|name| name.to_str())
        .ok_or_else(|| traversal(file_name, "Target must be a bare file name"))?;

    let mut relative = PathBuf::from(collection);
    if let (Some(first), Some(second)) = (name.get(0..2), name.get(2..4)) {
        relative.push(first);
        relative.push(second);
    }
    relative.push(name);

    resolve_path(root, relative)
}

fn check_ancestors(root: &Path, joined: PathBuf) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(traversal(&joined, "Path is outside sandbox boundaries"));
    }

    let mut current = joined.parent();
    while let Some(ancestor) = current {
        if ancestor == root {
            return Ok(joined);
        }
        if ancestor.exists() {
            return match ancestor.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined),
                Ok(canonical) => Err(traversal(
                    &canonical,
                    "Existing parent directory is a symlink outside sandbox",
                )),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }
        current = ancestor.parent();
    }

    Err(traversal(&joined, "No valid parent directory found within sandbox"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_segments_collapse_inside_the_base() {
        let normalized = normalize_relative(Path::new("a/./b/../c")).unwrap();
        assert_eq!(normalized, PathBuf::from("a/c"));
    }

    #[test]
    fn escaping_segments_are_rejected() {
        assert!(normalize_relative(Path::new("../x")).is_err());
        assert!(normalize_relative(Path::new("a/../../x")).is_err());
        assert!(normalize_relative(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn sharding_uses_the_first_four_characters() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();

        let path = resolve_sharded(&root, "documents", "65a1f0c2.json").unwrap();
        assert_eq!(path, root.join("documents/65/a1/65a1f0c2.json"));

        let short = resolve_sharded(&root, "documents", "ab").unwrap();
        assert_eq!(short, root.join("documents/ab"));
    }

    #[test]
    fn sharded_names_must_be_bare() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();

        assert!(resolve_sharded(&root, "documents", "../escape.json").is_err());
        assert!(resolve_sharded(&root, "documents", "nested/file.json").is_err());
        assert!(resolve_sharded(&root, "documents", "").is_err());
    }
}
