//! Neighbour-based recommendation over the latent feature space.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::ModelArtifact;

/// Number of similar users consulted when scoring candidates.
pub const DEFAULT_NEIGHBOURS: usize = 10;

/// One ranked item with its aggregated score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    /// External item identifier.
    pub item_id: i64,
    /// Aggregated recommendation score.
    pub score: f64,
}

/// Internal failures in the personalised path.
///
/// These never reach callers: [`Recommender::recommend`] maps every one of
/// them to the popularity fallback.
#[derive(Debug, Error, PartialEq, Eq)]
enum RecommendError {
    /// The latent feature matrix has no row for the user.
    #[error("latent features have no row for user index {index}")]
    FeatureRowMissing {
        /// Offending user index.
        index: usize,
    },
    /// The interaction matrix has no row for the user.
    #[error("interaction matrix has no row for user index {index}")]
    MatrixRowMissing {
        /// Offending user index.
        index: usize,
    },
    /// A candidate item index has no external identifier.
    #[error("item index {index} is missing from the item mapping")]
    UnmappedItem {
        /// Offending item index.
        index: usize,
    },
}

/// Scores candidate items for one user from similarity-weighted neighbour
/// purchases.
///
/// # Examples
///
/// ```
/// use basket_core::{
///     FeatureProjector, InteractionMatrixBuilder, ModelArtifact, Recommender,
/// };
///
/// let training = InteractionMatrixBuilder::build(&[]);
/// let fit = FeatureProjector::default().fit(&training.matrix).unwrap();
/// let artifact = ModelArtifact::new(training, fit);
/// let ranked = Recommender::new(&artifact).recommend(1001, 5);
/// assert!(ranked.len() <= 5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    artifact: &'a ModelArtifact,
    neighbours: usize,
}

impl<'a> Recommender<'a> {
    /// Creates a recommender over `artifact` with the default neighbour
    /// count.
    #[must_use]
    pub const fn new(artifact: &'a ModelArtifact) -> Self {
        Self {
            artifact,
            neighbours: DEFAULT_NEIGHBOURS,
        }
    }

    /// Overrides the number of neighbours consulted.
    #[must_use]
    pub const fn with_neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours;
        self
    }

    /// Ranks up to `k` items the user has not purchased, best first.
    ///
    /// Unknown users take the cold-start path and receive the popularity
    /// ranking. Internal failures also degrade to popularity, so the call
    /// always yields a usable list.
    #[must_use]
    pub fn recommend(&self, user_id: i64, k: usize) -> Vec<Recommendation> {
        let Some(user_index) = self.artifact.users.index_of(user_id) else {
            log::info!("user {user_id} has no interaction history; serving popular items");
            return self.popular(k);
        };
        match self.personalised(user_index, k) {
            Ok(ranked) => ranked,
            Err(err) => {
                log::warn!(
                    "personalised ranking failed for user {user_id}: {err}; serving popular items"
                );
                self.popular(k)
            }
        }
    }

    /// Ranks up to `k` items by aggregate popularity.
    #[must_use]
    pub fn popular(&self, k: usize) -> Vec<Recommendation> {
        self.artifact.popular(k)
    }

    fn personalised(&self, user_index: usize, k: usize) -> Result<Vec<Recommendation>, RecommendError> {
        let features = &self.artifact.projection.features;
        let matrix = &self.artifact.matrix;
        if user_index >= features.nrows() {
            return Err(RecommendError::FeatureRowMissing { index: user_index });
        }
        if user_index >= matrix.nrows() {
            return Err(RecommendError::MatrixRowMissing { index: user_index });
        }

        let neighbours = self.nearest_neighbours(user_index);

        // Similarity-weighted sum of each neighbour's purchase scores. Only
        // items the neighbour actually purchased contribute.
        let mut candidates: HashMap<usize, f64> = HashMap::new();
        for &(neighbour, similarity) in &neighbours {
            for item in 0..matrix.ncols() {
                let score = matrix[(neighbour, item)];
                if score > 0.0 {
                    *candidates.entry(item).or_insert(0.0) += score * similarity;
                }
            }
        }

        // Never recommend something the user already purchased.
        for item in 0..matrix.ncols() {
            if matrix[(user_index, item)] > 0.0 {
                candidates.remove(&item);
            }
        }

        let mut ranked: Vec<(usize, f64)> = candidates.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(k);

        let mut result = Vec::with_capacity(ranked.len());
        for (index, score) in ranked {
            let item_id = self
                .artifact
                .items
                .id_at(index)
                .ok_or(RecommendError::UnmappedItem { index })?;
            result.push(Recommendation { item_id, score });
        }
        Ok(result)
    }

    /// Top-N users by cosine similarity to `user_index`, self excluded,
    /// ties broken by ascending user index.
    fn nearest_neighbours(&self, user_index: usize) -> Vec<(usize, f64)> {
        let features = &self.artifact.projection.features;
        let target = features.row(user_index);
        let target_norm = target.norm();

        let mut similarities = Vec::with_capacity(features.nrows().saturating_sub(1));
        for other in 0..features.nrows() {
            if other == user_index {
                continue;
            }
            let row = features.row(other);
            let denominator = target_norm * row.norm();
            let similarity = if denominator > 0.0 {
                target.dot(&row) / denominator
            } else {
                0.0
            };
            similarities.push((other, similarity));
        }
        similarities.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        similarities.truncate(self.neighbours);
        similarities
    }
}
