//! Artifact persistence: the blob-store contract and the bincode codec.
//!
//! A deployment keeps exactly one named artifact object, overwritten
//! wholesale on each retrain. Loading never fails outward: a missing or
//! unreadable artifact degrades to the dummy model.

use bincode::Options;
use thiserror::Error;

use crate::{DummyModel, Model, ModelArtifact};

mod fs;

pub use fs::FsArtifactStore;

/// Key under which the single deployment artifact is stored.
pub const DEFAULT_MODEL_KEY: &str = "models/recommend_model.bin";

/// Errors raised by blob store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the blob at `key` failed.
    #[error("failed to read artifact {key}")]
    Read {
        /// Requested key.
        key: String,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Writing the blob at `key` failed.
    #[error("failed to write artifact {key}")]
    Write {
        /// Requested key.
        key: String,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Durable blob store holding the persisted model artifact.
///
/// Implementations must be shareable across serving threads.
pub trait ArtifactStore: Send + Sync {
    /// Reports whether `key` currently exists.
    fn exists(&self, key: &str) -> bool;

    /// Reads the full contents of `key`.
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Writes `bytes` to `key`, replacing any previous contents.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Bincode options used for the artifact payload.
pub(crate) fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
}

/// Failures while saving an artifact.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Serialising the artifact failed.
    #[error("failed to serialise model artifact")]
    Serialise(#[source] bincode::Error),
    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serialises `artifact` and writes it to `key`, replacing any previous
/// model.
///
/// # Errors
///
/// Returns [`SaveError`] when serialisation or the store write fails.
/// Unlike loading, saving is part of a training run and fails loudly.
pub fn save_model<S>(store: &S, key: &str, artifact: &ModelArtifact) -> Result<(), SaveError>
where
    S: ArtifactStore + ?Sized,
{
    let bytes = bincode_options()
        .serialize(artifact)
        .map_err(SaveError::Serialise)?;
    store.write(key, &bytes)?;
    log::info!("saved model artifact to {key} ({} bytes)", bytes.len());
    Ok(())
}

/// Loads the model at `key`, degrading to [`DummyModel`] when unavailable.
///
/// A missing key, a failed read, and an undecodable payload are treated
/// identically: the caller receives a dummy model and serving continues.
/// This is a documented degradation, not an error path.
#[must_use]
pub fn load_model<S>(store: &S, key: &str) -> Model
where
    S: ArtifactStore + ?Sized,
{
    if !store.exists(key) {
        log::warn!("no model artifact at {key}; serving the dummy model");
        return Model::Dummy(DummyModel::new());
    }
    let bytes = match store.read(key) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("failed to read model artifact at {key}: {err}; serving the dummy model");
            return Model::Dummy(DummyModel::new());
        }
    };
    match bincode_options().deserialize::<ModelArtifact>(&bytes) {
        Ok(artifact) => {
            log::info!("loaded model artifact trained at {}", artifact.trained_at);
            Model::Trained(artifact)
        }
        Err(err) => {
            log::warn!("model artifact at {key} is unreadable: {err}; serving the dummy model");
            Model::Dummy(DummyModel::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingArtifactStore, MemoryArtifactStore};
    use crate::{FeatureProjector, InteractionMatrixBuilder};
    use rstest::{fixture, rstest};

    #[fixture]
    fn artifact() -> ModelArtifact {
        let training = InteractionMatrixBuilder::build(&[]);
        let fit = FeatureProjector::new(8).fit(&training.matrix).unwrap();
        ModelArtifact::new(training, fit)
    }

    #[rstest]
    fn round_trip_preserves_mappings_and_matrix(artifact: ModelArtifact) {
        let store = MemoryArtifactStore::default();
        save_model(&store, DEFAULT_MODEL_KEY, &artifact).unwrap();
        let Model::Trained(loaded) = load_model(&store, DEFAULT_MODEL_KEY) else {
            panic!("expected a trained model");
        };
        assert_eq!(loaded.users, artifact.users);
        assert_eq!(loaded.items, artifact.items);
        assert_eq!(loaded.matrix, artifact.matrix);
        assert_eq!(loaded.trained_at, artifact.trained_at);
        let feature_drift =
            (&loaded.projection.features - &artifact.projection.features).abs().max();
        assert!(feature_drift < 1e-6);
        let component_drift =
            (&loaded.projection.components - &artifact.projection.components).abs().max();
        assert!(component_drift < 1e-6);
        let scaler = &loaded.projection.scaler;
        let saved = &artifact.projection.scaler;
        for (lhs, rhs) in scaler
            .means()
            .iter()
            .chain(scaler.scales())
            .zip(saved.means().iter().chain(saved.scales()))
        {
            assert!((lhs - rhs).abs() < 1e-6);
        }
    }

    #[rstest]
    fn missing_artifact_degrades_to_dummy() {
        let store = MemoryArtifactStore::default();
        assert!(load_model(&store, DEFAULT_MODEL_KEY).is_dummy());
    }

    #[rstest]
    fn unreadable_artifact_degrades_to_dummy() {
        let store = FailingArtifactStore;
        assert!(load_model(&store, DEFAULT_MODEL_KEY).is_dummy());
    }

    #[rstest]
    fn corrupt_payload_degrades_to_dummy() {
        let store = MemoryArtifactStore::default();
        store.write(DEFAULT_MODEL_KEY, b"not a model").unwrap();
        assert!(load_model(&store, DEFAULT_MODEL_KEY).is_dummy());
    }

    #[rstest]
    fn save_overwrites_the_previous_artifact(artifact: ModelArtifact) {
        let store = MemoryArtifactStore::default();
        save_model(&store, DEFAULT_MODEL_KEY, &artifact).unwrap();
        save_model(&store, DEFAULT_MODEL_KEY, &artifact).unwrap();
        assert!(matches!(
            load_model(&store, DEFAULT_MODEL_KEY),
            Model::Trained(_)
        ));
    }
}
