//! Facade crate for the basket recommendation engine.
//!
//! Re-exports the core training and serving API so downstream users can
//! depend on a single crate.

#![forbid(unsafe_code)]

pub use basket_core::{
    ArtifactStore, BoundedCache, DummyModel, FeatureProjector, FsArtifactStore, IdIndex,
    InteractionMatrixBuilder, InteractionRecord, InteractionRecordError, InteractionSource,
    ItemDetails, MetadataError, MetadataLookup, Model, ModelArtifact, ModelInfo, ModelKind,
    ProjectorFit, RankedItem, Recommendation, RecommendationService, Recommender, RequestError,
    SaveError, SourceError, StoreError, TrainingConfig, TrainingError, UserProfile, load_model,
    save_model, train,
};
