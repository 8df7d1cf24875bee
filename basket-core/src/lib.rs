//! Collaborative-filtering recommendation engine over purchase history.
//!
//! The crate covers the full batch-train/batch-serve cycle:
//!
//! - [`InteractionMatrixBuilder`] turns aggregated purchase records into a
//!   dense user–item score matrix with stable index mappings.
//! - [`FeatureProjector`] standardises the matrix and reduces it to a
//!   low-rank latent feature space via truncated SVD.
//! - [`Recommender`] ranks candidate items through similarity-weighted
//!   neighbour purchases, falling back to global popularity for unknown
//!   users and on any internal failure.
//! - [`ModelArtifact`] bundles everything a serving instance needs, with
//!   [`save_model`]/[`load_model`] persisting it through an
//!   [`ArtifactStore`]; a missing artifact degrades to [`DummyModel`].
//! - [`RecommendationService`] is the stateless facade that loads the
//!   artifact once per process and answers recommendation, popularity, and
//!   diagnostic queries.
//!
//! # Examples
//!
//! ```
//! use basket_core::{InteractionRecord, TrainingConfig, Recommender};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = vec![
//!     InteractionRecord::new(1001, 2001, 1.0, 900.0, 2)?,
//!     InteractionRecord::new(1002, 2001, 1.0, 850.0, 1)?,
//!     InteractionRecord::new(1002, 2002, 2.0, 400.0, 1)?,
//! ];
//! let artifact = basket_core::train(&records, &TrainingConfig::default())?;
//! let ranked = Recommender::new(&artifact).recommend(1001, 5);
//! assert!(ranked.iter().all(|entry| entry.item_id != 2001));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod artifact;
mod cache;
mod config;
mod index;
mod interaction;
mod matrix;
mod metadata;
mod projector;
mod recommend;
pub mod sample;
mod service;
mod source;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{DummyModel, FALLBACK_POPULAR_ITEMS, Model, ModelArtifact, ModelInfo, ModelKind};
pub use cache::BoundedCache;
pub use config::{DEFAULT_WINDOW_DAYS, TrainingConfig};
pub use index::IdIndex;
pub use interaction::{InteractionRecord, InteractionRecordError};
pub use matrix::{InteractionMatrixBuilder, TrainingMatrix};
pub use metadata::{ItemDetails, MetadataError, MetadataLookup, UserProfile};
pub use projector::{
    ColumnScaler, DEFAULT_MAX_RANK, FeatureProjector, ProjectorFit, TrainingError,
};
pub use recommend::{DEFAULT_NEIGHBOURS, Recommendation, Recommender};
pub use service::{
    DEFAULT_POPULAR, DEFAULT_RECOMMENDATIONS, MAX_POPULAR, MAX_RECOMMENDATIONS, RankedItem,
    RecommendationService, RequestError,
};
pub use source::{InteractionSource, SourceError};
pub use store::{
    ArtifactStore, DEFAULT_MODEL_KEY, FsArtifactStore, SaveError, StoreError, load_model,
    save_model,
};

/// Runs one batch training cycle over `records`.
///
/// Builds the interaction matrix (substituting the synthetic sample set
/// when `records` is empty), fits the projection, and bundles the result
/// into a [`ModelArtifact`] stamped with the training time.
///
/// # Errors
///
/// Returns [`TrainingError`] when the matrix cannot support the configured
/// decomposition; this aborts the run rather than producing a degenerate
/// model.
pub fn train(
    records: &[InteractionRecord],
    config: &TrainingConfig,
) -> Result<ModelArtifact, TrainingError> {
    let training = InteractionMatrixBuilder::build(records);
    let fit = FeatureProjector::new(config.max_rank).fit(&training.matrix)?;
    Ok(ModelArtifact::new(training, fit))
}
