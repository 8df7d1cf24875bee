//! JSON catalogue backing item and user metadata lookups.

use std::collections::HashMap;

use basket_core::{ItemDetails, MetadataError, MetadataLookup, UserProfile};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

/// On-disk catalogue document.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<ItemDetails>,
    #[serde(default)]
    users: Vec<UserProfile>,
}

/// Errors raised while loading a catalogue file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the file failed.
    #[error("failed to read catalogue at {path}")]
    Io {
        /// Requested catalogue path.
        path: Utf8PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document was not valid catalogue JSON.
    #[error("failed to parse catalogue at {path}")]
    Parse {
        /// Requested catalogue path.
        path: Utf8PathBuf,
        /// Source decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Metadata lookup over a JSON document of items and users.
///
/// Unknown identifiers produce [`MetadataError::NotFound`]; the serving
/// layer substitutes placeholders rather than failing the request.
#[derive(Debug, Default)]
pub struct JsonCatalog {
    items: HashMap<i64, ItemDetails>,
    users: HashMap<i64, UserProfile>,
}

impl JsonCatalog {
    /// Loads the catalogue document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        let contents =
            std::fs::read_to_string(path.as_std_path()).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file: CatalogFile =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!(
            "loaded catalogue from {path}: {} items, {} users",
            file.items.len(),
            file.users.len()
        );
        Ok(Self {
            items: file.items.into_iter().map(|item| (item.item_id, item)).collect(),
            users: file.users.into_iter().map(|user| (user.user_id, user)).collect(),
        })
    }

    /// An empty catalogue; every lookup falls back to placeholders.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl MetadataLookup for JsonCatalog {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_catalog(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    fn load(file: &NamedTempFile) -> Result<JsonCatalog, CatalogError> {
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();
        JsonCatalog::load(&path)
    }

    #[rstest]
    fn resolves_known_items_and_users() {
        let file = write_catalog(
            r#"{
                "items": [
                    {"item_id": 2001, "name": "kettle", "category": "kitchen", "price": 1200.0, "brand": "acme"}
                ],
                "users": [
                    {"user_id": 1001, "age": 34, "gender": "f", "city": "Osaka"}
                ]
            }"#,
        );
        let catalog = load(&file).unwrap();
        assert_eq!(catalog.item(2001).unwrap().name, "kettle");
        assert_eq!(catalog.user(1001).unwrap().city.as_deref(), Some("Osaka"));
    }

    #[rstest]
    fn unknown_identifiers_are_not_found() {
        let file = write_catalog(r#"{"items": [], "users": []}"#);
        let catalog = load(&file).unwrap();
        assert!(matches!(
            catalog.item(1),
            Err(MetadataError::NotFound { id: 1 })
        ));
        assert!(matches!(
            catalog.user(2),
            Err(MetadataError::NotFound { id: 2 })
        ));
    }

    #[rstest]
    fn sections_are_optional() {
        let file = write_catalog("{}");
        let catalog = load(&file).unwrap();
        assert!(catalog.item(1).is_err());
    }

    #[rstest]
    fn invalid_documents_fail_to_parse() {
        let file = write_catalog("not json");
        assert!(matches!(load(&file), Err(CatalogError::Parse { .. })));
    }
}
