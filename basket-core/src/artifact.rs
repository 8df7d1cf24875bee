//! The persisted model bundle and its degraded stand-in.

use chrono::{DateTime, Utc};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{IdIndex, ProjectorFit, Recommendation, Recommender, TrainingMatrix};

/// Item identifiers served when no trained artifact is available.
pub const FALLBACK_POPULAR_ITEMS: [i64; 5] = [2001, 2002, 2003, 2004, 2005];

/// The complete trained model persisted between training and serving.
///
/// Created by one training run, serialised wholesale, and loaded read-only
/// by serving instances. A retrain supersedes the artifact entirely; there
/// are no partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// User identifier mapping.
    pub users: IdIndex,
    /// Item identifier mapping.
    pub items: IdIndex,
    /// Dense users×items score matrix.
    pub matrix: DMatrix<f64>,
    /// Fitted scaler, components, and latent features.
    pub projection: ProjectorFit,
    /// When the training run produced this artifact.
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Bundles a training run's outputs, stamping the training time.
    #[must_use]
    pub fn new(training: TrainingMatrix, projection: ProjectorFit) -> Self {
        Self {
            users: training.users,
            items: training.items,
            matrix: training.matrix,
            projection,
            trained_at: Utc::now(),
        }
    }

    /// The fitted latent rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.projection.rank()
    }

    /// Ranks items by their total score across all users.
    ///
    /// Ties break by ascending item index so the ordering is
    /// deterministic. Returns at most `k` entries. A column without an
    /// entry in the item mapping marks a corrupt artifact; the column is
    /// skipped and the inconsistency logged.
    #[must_use]
    pub fn popular(&self, k: usize) -> Vec<Recommendation> {
        let totals = self.matrix.row_sum();
        let mut ranked: Vec<(usize, f64)> = totals.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked
            .into_iter()
            .take(k)
            .filter_map(|(index, score)| match self.items.id_at(index) {
                Some(item_id) => Some(Recommendation { item_id, score }),
                None => {
                    log::warn!(
                        "item index {index} is missing from the item mapping; skipping it in the popularity ranking"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Static stand-in used when no artifact can be loaded.
///
/// Holds only an ordered popular-item list and a creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DummyModel {
    /// Static ordered list of popular item identifiers.
    pub popular_items: Vec<i64>,
    /// When this stand-in was synthesised.
    pub created_at: DateTime<Utc>,
}

impl DummyModel {
    /// Creates the stand-in with the fixed popular-item list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            popular_items: FALLBACK_POPULAR_ITEMS.to_vec(),
            created_at: Utc::now(),
        }
    }

    /// First `k` static items with synthetically decreasing scores.
    ///
    /// The `1.0 − 0.1×rank` scores exist only to keep the response shape
    /// consistent with the trained path.
    #[must_use]
    pub fn popular(&self, k: usize) -> Vec<Recommendation> {
        self.popular_items
            .iter()
            .take(k)
            .enumerate()
            .map(|(rank, &item_id)| Recommendation {
                item_id,
                score: 1.0 - 0.1 * rank as f64,
            })
            .collect()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Exactly one of: a trained artifact or the dummy stand-in.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// A trained collaborative-filtering artifact.
    Trained(ModelArtifact),
    /// The degraded static model.
    Dummy(DummyModel),
}

impl Model {
    /// Ranks up to `k` items for `user_id`, degrading as needed.
    #[must_use]
    pub fn recommend(&self, user_id: i64, k: usize) -> Vec<Recommendation> {
        match self {
            Self::Trained(artifact) => Recommender::new(artifact).recommend(user_id, k),
            Self::Dummy(dummy) => dummy.popular(k),
        }
    }

    /// Ranks up to `k` items by aggregate popularity.
    #[must_use]
    pub fn popular(&self, k: usize) -> Vec<Recommendation> {
        match self {
            Self::Trained(artifact) => artifact.popular(k),
            Self::Dummy(dummy) => dummy.popular(k),
        }
    }

    /// Reports whether this is the degraded stand-in.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        matches!(self, Self::Dummy(_))
    }

    /// Truthful description of the loaded model.
    #[must_use]
    pub fn info(&self) -> ModelInfo {
        match self {
            Self::Trained(artifact) => ModelInfo {
                kind: ModelKind::CollaborativeFiltering,
                trained_at: artifact.trained_at,
                n_users: Some(artifact.users.len()),
                n_items: Some(artifact.items.len()),
                rank: Some(artifact.rank()),
            },
            Self::Dummy(dummy) => ModelInfo {
                kind: ModelKind::Dummy,
                trained_at: dummy.created_at,
                n_users: None,
                n_items: None,
                rank: None,
            },
        }
    }
}

/// Which kind of model is currently serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// The degraded static stand-in.
    Dummy,
    /// A trained collaborative-filtering artifact.
    CollaborativeFiltering,
}

/// Serialisable description of the loaded model, served for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Trained or dummy.
    pub kind: ModelKind,
    /// Training (or synthesis) timestamp.
    pub trained_at: DateTime<Utc>,
    /// Users in the mapping; absent for the dummy model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_users: Option<usize>,
    /// Items in the mapping; absent for the dummy model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_items: Option<usize>,
    /// Fitted latent rank; absent for the dummy model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}
