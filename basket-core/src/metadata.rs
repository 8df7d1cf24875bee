//! Item and user metadata collaborators.
//!
//! Lookups enrich serving responses. A failed lookup never drops the
//! field: the serving layer substitutes a clearly-marked placeholder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptive attributes for one catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    /// External item identifier.
    pub item_id: i64,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Current unit price.
    pub price: f64,
    /// Brand label.
    pub brand: String,
}

impl ItemDetails {
    /// Stand-in returned when the catalogue lookup fails.
    #[must_use]
    pub fn placeholder(item_id: i64) -> Self {
        Self {
            item_id,
            name: format!("item {item_id}"),
            category: "unknown".to_owned(),
            price: 0.0,
            brand: "unknown".to_owned(),
        }
    }
}

/// Demographic attributes for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// External user identifier.
    pub user_id: i64,
    /// Age in years, when known.
    pub age: Option<u32>,
    /// Self-reported gender, when known.
    pub gender: Option<String>,
    /// Home city, when known.
    pub city: Option<String>,
}

impl UserProfile {
    /// Stand-in returned when the user lookup fails.
    #[must_use]
    pub const fn placeholder(user_id: i64) -> Self {
        Self {
            user_id,
            age: None,
            gender: None,
            city: None,
        }
    }
}

/// Failure to resolve metadata for an identifier.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Nothing is recorded under the identifier.
    #[error("no metadata recorded for id {id}")]
    NotFound {
        /// Requested identifier.
        id: i64,
    },
    /// The backing catalogue failed.
    #[error("metadata backend failure for id {id}")]
    Backend {
        /// Requested identifier.
        id: i64,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Resolves descriptive attributes for item and user identifiers.
pub trait MetadataLookup: Send + Sync {
    /// Looks up catalogue details for `item_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the item is unknown or the backend
    /// fails; callers substitute [`ItemDetails::placeholder`].
    fn item(&self, item_id: i64) -> Result<ItemDetails, MetadataError>;

    /// Looks up the profile for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the user is unknown or the backend
    /// fails; callers substitute [`UserProfile::placeholder`].
    fn user(&self, user_id: i64) -> Result<UserProfile, MetadataError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn item_placeholder_is_clearly_marked() {
        let details = ItemDetails::placeholder(42);
        assert_eq!(details.item_id, 42);
        assert_eq!(details.name, "item 42");
        assert_eq!(details.category, "unknown");
        assert_eq!(details.price, 0.0);
    }

    #[rstest]
    fn user_placeholder_has_no_demographics() {
        let profile = UserProfile::placeholder(7);
        assert_eq!(profile.user_id, 7);
        assert_eq!(profile.age, None);
        assert_eq!(profile.city, None);
    }
}
