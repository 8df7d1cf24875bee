//! Test-only in-memory collaborators used by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::metadata::{ItemDetails, MetadataError, MetadataLookup, UserProfile};
use crate::store::{ArtifactStore, StoreError};

/// In-memory blob store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(key))
            .unwrap_or(false)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(key).cloned())
            .ok_or_else(|| StoreError::Read {
                key: key.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such blob"),
            })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_owned(), bytes.to_vec());
        }
        Ok(())
    }
}

/// Store whose reads always fail, for exercising degradation paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingArtifactStore;

impl ArtifactStore for FailingArtifactStore {
    fn exists(&self, _key: &str) -> bool {
        true
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::Read {
            key: key.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "simulated read failure"),
        })
    }

    fn write(&self, key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
        })
    }
}

/// Metadata lookup with fixed contents; unknown identifiers fail.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: HashMap<i64, ItemDetails>,
    users: HashMap<i64, UserProfile>,
}

impl StaticCatalog {
    /// Catalogue seeded with the given items and users.
    #[must_use]
    pub fn new(items: Vec<ItemDetails>, users: Vec<UserProfile>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.item_id, item)).collect(),
            users: users.into_iter().map(|user| (user.user_id, user)).collect(),
        }
    }
}

impl MetadataLookup for StaticCatalog {
    fn item(&self, item_id: i64) -> Result<ItemDetails, MetadataError> {
        self.items
            .get(&item_id)
            .cloned()
            .ok_or(MetadataError::NotFound { id: item_id })
    }

    fn user(&self, user_id: i64) -> Result<UserProfile, MetadataError> {
        self.users
            .get(&user_id)
            .cloned()
            .ok_or(MetadataError::NotFound { id: user_id })
    }
}

/// Catalogue that counts lookups, for asserting cache behaviour.
#[derive(Debug, Default)]
pub struct CountingCatalog {
    inner: StaticCatalog,
    item_lookups: AtomicUsize,
}

impl CountingCatalog {
    /// Catalogue holding a single item.
    #[must_use]
    pub fn with_item(item: ItemDetails) -> Self {
        Self {
            inner: StaticCatalog::new(vec![item], Vec::new()),
            item_lookups: AtomicUsize::new(0),
        }
    }

    /// Number of item lookups that reached the backend.
    #[must_use]
    pub fn item_lookups(&self) -> usize {
        self.item_lookups.load(Ordering::SeqCst)
    }
}

impl MetadataLookup for CountingCatalog {
    fn item(&self, item_id: i64) -> Result<ItemDetails, MetadataError> {
        self.item_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.item(item_id)
    }

    fn user(&self, user_id: i64) -> Result<UserProfile, MetadataError> {
        self.inner.user(user_id)
    }
}
