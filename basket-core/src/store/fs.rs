//! Filesystem-backed artifact store.

use camino::{Utf8Path, Utf8PathBuf};

use super::{ArtifactStore, StoreError};

/// Blob store rooted at a directory; keys are relative paths.
///
/// # Examples
///
/// ```no_run
/// use basket_core::{ArtifactStore, DEFAULT_MODEL_KEY, FsArtifactStore};
///
/// let store = FsArtifactStore::new("artifacts");
/// assert!(!store.exists(DEFAULT_MODEL_KEY) || store.exists(DEFAULT_MODEL_KEY));
/// ```
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: Utf8PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on the first write.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.root.join(key)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        std::fs::read(self.path_for(key).as_std_path()).map_err(|source| StoreError::Read {
            key: key.to_owned(),
            source,
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path()).map_err(|source| StoreError::Write {
                key: key.to_owned(),
                source,
            })?;
        }
        std::fs::write(path.as_std_path(), bytes).map_err(|source| StoreError::Write {
            key: key.to_owned(),
            source,
        })
    }
}
