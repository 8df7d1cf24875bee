//! Stateless serving facade over the persisted model.

use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;
use thiserror::Error;

use crate::store::{ArtifactStore, DEFAULT_MODEL_KEY, load_model};
use crate::{
    BoundedCache, ItemDetails, MetadataLookup, Model, ModelInfo, Recommendation, UserProfile,
};

/// Upper bound on personalised recommendation counts.
pub const MAX_RECOMMENDATIONS: usize = 20;
/// Default personalised recommendation count.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;
/// Upper bound on popularity result counts.
pub const MAX_POPULAR: usize = 50;
/// Default popularity result count.
pub const DEFAULT_POPULAR: usize = 10;

const METADATA_CACHE_CAPACITY: usize = 100;

/// Request validation failures, the only error surfaced from the serving
/// path. Everything else degrades internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The requested result count was outside the allowed range.
    ///
    /// Out-of-range counts are rejected rather than clamped so callers
    /// learn about the limit.
    #[error("count must be between 1 and {max}, got {given}")]
    CountOutOfRange {
        /// Count the caller asked for.
        given: usize,
        /// Maximum permitted count.
        max: usize,
    },
}

/// A ranked item optionally enriched with catalogue metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    /// External item identifier.
    pub item_id: i64,
    /// Aggregated recommendation score.
    pub score: f64,
    /// Catalogue details, present when metadata was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ItemDetails>,
}

/// Query facade that loads the model once and serves read-only requests.
///
/// The model slot fills on first use and is reused for the process
/// lifetime; picking up a retrained artifact requires a new deployment.
/// Concurrent first requests may race the load, but the slot converges on
/// a single model and every query observes an immutable artifact.
pub struct RecommendationService {
    store: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataLookup>,
    model_key: String,
    model: OnceLock<Arc<Model>>,
    item_cache: Mutex<BoundedCache<i64, ItemDetails>>,
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService")
            .field("model_key", &self.model_key)
            .field("loaded", &self.model.get().is_some())
            .finish_non_exhaustive()
    }
}

impl RecommendationService {
    /// Creates a service reading the artifact under [`DEFAULT_MODEL_KEY`].
    #[must_use]
    pub fn new(store: Arc<dyn ArtifactStore>, metadata: Arc<dyn MetadataLookup>) -> Self {
        Self {
            store,
            metadata,
            model_key: DEFAULT_MODEL_KEY.to_owned(),
            model: OnceLock::new(),
            item_cache: Mutex::new(BoundedCache::new(METADATA_CACHE_CAPACITY)),
        }
    }

    /// Overrides the artifact key.
    #[must_use]
    pub fn with_model_key(mut self, key: impl Into<String>) -> Self {
        self.model_key = key.into();
        self
    }

    /// Injects an already-built model, bypassing the store.
    ///
    /// Intended for tests and embedded use where the artifact is
    /// constructed in process.
    #[must_use]
    pub fn with_model(self, model: Model) -> Self {
        let _ = self.model.set(Arc::new(model));
        self
    }

    fn model(&self) -> Arc<Model> {
        Arc::clone(
            self.model
                .get_or_init(|| Arc::new(load_model(self.store.as_ref(), &self.model_key))),
        )
    }

    /// Personalised recommendations for `user_id`.
    ///
    /// `count` defaults to [`DEFAULT_RECOMMENDATIONS`] and must lie in
    /// `1..=`[`MAX_RECOMMENDATIONS`]. The result is never empty for a
    /// valid request while any popular item exists, because unknown users
    /// and internal failures degrade to the popularity ranking.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::CountOutOfRange`] for an invalid `count`.
    pub fn recommendations(
        &self,
        user_id: i64,
        count: Option<usize>,
        include_metadata: bool,
    ) -> Result<Vec<RankedItem>, RequestError> {
        let count = validate_count(count, DEFAULT_RECOMMENDATIONS, MAX_RECOMMENDATIONS)?;
        let ranked = self.model().recommend(user_id, count);
        Ok(self.enrich(ranked, include_metadata))
    }

    /// Globally popular items.
    ///
    /// `count` defaults to [`DEFAULT_POPULAR`] and must lie in
    /// `1..=`[`MAX_POPULAR`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::CountOutOfRange`] for an invalid `count`.
    pub fn popular(
        &self,
        count: Option<usize>,
        include_metadata: bool,
    ) -> Result<Vec<RankedItem>, RequestError> {
        let count = validate_count(count, DEFAULT_POPULAR, MAX_POPULAR)?;
        let ranked = self.model().popular(count);
        Ok(self.enrich(ranked, include_metadata))
    }

    /// Truthful description of the currently loaded model.
    #[must_use]
    pub fn model_info(&self) -> ModelInfo {
        self.model().info()
    }

    /// Profile for `user_id`, substituting a placeholder on lookup
    /// failure.
    #[must_use]
    pub fn user_profile(&self, user_id: i64) -> UserProfile {
        match self.metadata.user(user_id) {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("profile lookup failed for user {user_id}: {err}; using placeholder");
                UserProfile::placeholder(user_id)
            }
        }
    }

    fn enrich(&self, ranked: Vec<Recommendation>, include_metadata: bool) -> Vec<RankedItem> {
        ranked
            .into_iter()
            .map(|entry| RankedItem {
                item_id: entry.item_id,
                score: entry.score,
                details: include_metadata.then(|| self.item_details(entry.item_id)),
            })
            .collect()
    }

    fn item_details(&self, item_id: i64) -> ItemDetails {
        if let Ok(cache) = self.item_cache.lock() {
            if let Some(hit) = cache.get(&item_id) {
                return hit;
            }
        }
        let details = match self.metadata.item(item_id) {
            Ok(details) => details,
            Err(err) => {
                log::warn!("metadata lookup failed for item {item_id}: {err}; using placeholder");
                ItemDetails::placeholder(item_id)
            }
        };
        if let Ok(mut cache) = self.item_cache.lock() {
            cache.insert(item_id, details.clone());
        }
        details
    }
}

fn validate_count(
    count: Option<usize>,
    default: usize,
    max: usize,
) -> Result<usize, RequestError> {
    let count = count.unwrap_or(default);
    if count == 0 || count > max {
        return Err(RequestError::CountOutOfRange { given: count, max });
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingCatalog, MemoryArtifactStore, StaticCatalog};
    use crate::{
        FALLBACK_POPULAR_ITEMS, FeatureProjector, InteractionMatrixBuilder, ModelArtifact,
        ModelKind, save_model,
    };
    use rstest::{fixture, rstest};

    fn trained_artifact() -> ModelArtifact {
        let training = InteractionMatrixBuilder::build(&[]);
        let fit = FeatureProjector::new(8).fit(&training.matrix).unwrap();
        ModelArtifact::new(training, fit)
    }

    #[fixture]
    fn dummy_service() -> RecommendationService {
        RecommendationService::new(
            Arc::new(MemoryArtifactStore::default()),
            Arc::new(StaticCatalog::default()),
        )
    }

    #[rstest]
    fn empty_store_serves_the_dummy_model(dummy_service: RecommendationService) {
        let info = dummy_service.model_info();
        assert_eq!(info.kind, ModelKind::Dummy);
        let ranked = dummy_service.popular(Some(3), false).unwrap();
        let ids: Vec<i64> = ranked.iter().map(|item| item.item_id).collect();
        assert_eq!(ids, FALLBACK_POPULAR_ITEMS[..3].to_vec());
    }

    #[rstest]
    fn persisted_artifact_is_loaded_once_and_reused() {
        let store = Arc::new(MemoryArtifactStore::default());
        save_model(store.as_ref(), DEFAULT_MODEL_KEY, &trained_artifact()).unwrap();
        let service =
            RecommendationService::new(store, Arc::new(StaticCatalog::default()));
        assert_eq!(service.model_info().kind, ModelKind::CollaborativeFiltering);
        // Repeat queries observe the same cached model.
        assert_eq!(service.model_info().kind, ModelKind::CollaborativeFiltering);
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(21))]
    fn recommendation_counts_outside_the_range_are_rejected(
        dummy_service: RecommendationService,
        #[case] count: Option<usize>,
    ) {
        let result = dummy_service.recommendations(1001, count, false);
        assert!(matches!(
            result,
            Err(RequestError::CountOutOfRange { max: 20, .. })
        ));
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(51))]
    fn popular_counts_outside_the_range_are_rejected(
        dummy_service: RecommendationService,
        #[case] count: Option<usize>,
    ) {
        let result = dummy_service.popular(count, false);
        assert!(matches!(
            result,
            Err(RequestError::CountOutOfRange { max: 50, .. })
        ));
    }

    #[rstest]
    fn defaults_apply_when_no_count_is_given(dummy_service: RecommendationService) {
        let ranked = dummy_service.recommendations(1001, None, false).unwrap();
        assert_eq!(ranked.len(), DEFAULT_RECOMMENDATIONS);
    }

    #[rstest]
    fn injected_model_bypasses_the_store() {
        let service = RecommendationService::new(
            Arc::new(MemoryArtifactStore::default()),
            Arc::new(StaticCatalog::default()),
        )
        .with_model(Model::Trained(trained_artifact()));
        assert_eq!(service.model_info().kind, ModelKind::CollaborativeFiltering);
    }

    #[rstest]
    fn failed_metadata_lookup_substitutes_a_placeholder(dummy_service: RecommendationService) {
        let ranked = dummy_service.popular(Some(1), true).unwrap();
        let details = ranked[0].details.as_ref().unwrap();
        assert_eq!(details.category, "unknown");
        assert_eq!(details.name, format!("item {}", ranked[0].item_id));
    }

    #[rstest]
    fn known_metadata_is_attached_and_cached() {
        let catalog = Arc::new(CountingCatalog::with_item(ItemDetails {
            item_id: FALLBACK_POPULAR_ITEMS[0],
            name: "espresso machine".to_owned(),
            category: "kitchen".to_owned(),
            price: 4200.0,
            brand: "acme".to_owned(),
        }));
        let service = RecommendationService::new(
            Arc::new(MemoryArtifactStore::default()),
            Arc::clone(&catalog) as Arc<dyn MetadataLookup>,
        );
        for _ in 0..3 {
            let ranked = service.popular(Some(1), true).unwrap();
            let details = ranked[0].details.as_ref().unwrap();
            assert_eq!(details.name, "espresso machine");
        }
        assert_eq!(catalog.item_lookups(), 1);
    }

    #[rstest]
    fn metadata_can_be_omitted(dummy_service: RecommendationService) {
        let ranked = dummy_service.popular(Some(2), false).unwrap();
        assert!(ranked.iter().all(|item| item.details.is_none()));
    }

    #[rstest]
    fn unknown_user_profile_falls_back_to_placeholder(dummy_service: RecommendationService) {
        let profile = dummy_service.user_profile(12345);
        assert_eq!(profile, UserProfile::placeholder(12345));
    }
}
