//! Normalisation and low-rank projection of the interaction matrix.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound on the latent rank.
pub const DEFAULT_MAX_RANK: usize = 50;

/// Per-column standardisation parameters fitted on the training matrix.
///
/// Uses population statistics. The fitted values travel with the artifact
/// for reproducibility; serving reads only the latent features and never
/// re-applies the scaler to raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl ColumnScaler {
    /// Fits the mean and standard deviation of every column.
    ///
    /// Zero-variance columns keep a unit scale so standardisation maps
    /// them to zero instead of dividing by zero.
    #[must_use]
    pub fn fit(matrix: &DMatrix<f64>) -> Self {
        let rows = matrix.nrows();
        let count = if rows == 0 { 1.0 } else { rows as f64 };
        let mut means = Vec::with_capacity(matrix.ncols());
        let mut scales = Vec::with_capacity(matrix.ncols());
        for column in matrix.column_iter() {
            let mean = column.sum() / count;
            let variance = column.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
            let std = variance.sqrt();
            means.push(mean);
            scales.push(if std > 0.0 { std } else { 1.0 });
        }
        Self { means, scales }
    }

    /// Standardises a copy of `matrix` with the fitted statistics.
    #[must_use]
    pub fn transform(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |row, column| {
            (matrix[(row, column)] - self.means[column]) / self.scales[column]
        })
    }

    /// Fitted per-column means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted per-column scales.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Errors raised while fitting the projection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrainingError {
    /// The matrix is too small for a well-posed truncated decomposition.
    ///
    /// This is a configuration error and aborts the training run; a
    /// degenerate model must never be produced silently.
    #[error("usable rank is zero for a {rows}x{cols} matrix; need at least two users and two items")]
    RankUnderflow {
        /// Rows of the offending matrix.
        rows: usize,
        /// Columns of the offending matrix.
        cols: usize,
    },
    /// The singular value decomposition did not converge.
    #[error("singular value decomposition did not converge")]
    Convergence,
}

/// Everything the projector fitted: scaler, row basis, and user features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectorFit {
    /// Column standardisation statistics.
    pub scaler: ColumnScaler,
    /// Rank-r row basis of the standardised matrix (r × items).
    pub components: DMatrix<f64>,
    /// Latent user vectors (users × r).
    pub features: DMatrix<f64>,
    /// Mean squared reconstruction error; observability only.
    pub reconstruction_mse: f64,
}

impl ProjectorFit {
    /// The fitted latent rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.features.ncols()
    }
}

/// Truncated SVD over the standardised interaction matrix.
///
/// The effective rank is `min(max_rank, min(users, items) − 1)`, always
/// strictly below both matrix dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureProjector {
    max_rank: usize,
}

impl Default for FeatureProjector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RANK)
    }
}

impl FeatureProjector {
    /// Creates a projector bounded by `max_rank`.
    #[must_use]
    pub const fn new(max_rank: usize) -> Self {
        Self { max_rank }
    }

    /// Standardises `matrix` and fits the truncated decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::RankUnderflow`] when the usable rank is
    /// zero and [`TrainingError::Convergence`] when the decomposition
    /// fails.
    pub fn fit(&self, matrix: &DMatrix<f64>) -> Result<ProjectorFit, TrainingError> {
        let rank = self.usable_rank(matrix)?;
        let scaler = ColumnScaler::fit(matrix);
        let scaled = scaler.transform(matrix);

        let svd = scaled
            .clone()
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or(TrainingError::Convergence)?;
        let u = svd.u.ok_or(TrainingError::Convergence)?;
        let v_t = svd.v_t.ok_or(TrainingError::Convergence)?;

        let mut features = DMatrix::zeros(scaled.nrows(), rank);
        for row in 0..scaled.nrows() {
            for latent in 0..rank {
                features[(row, latent)] = u[(row, latent)] * svd.singular_values[latent];
            }
        }
        let components = v_t.rows(0, rank).into_owned();

        let residual = &scaled - &features * &components;
        let reconstruction_mse = residual.norm_squared() / scaled.len() as f64;
        log::info!(
            "projected {}x{} matrix to rank {rank} (reconstruction mse {reconstruction_mse:.4})",
            matrix.nrows(),
            matrix.ncols()
        );

        Ok(ProjectorFit {
            scaler,
            components,
            features,
            reconstruction_mse,
        })
    }

    fn usable_rank(&self, matrix: &DMatrix<f64>) -> Result<usize, TrainingError> {
        let smallest = matrix.nrows().min(matrix.ncols());
        let rank = self.max_rank.min(smallest.saturating_sub(1));
        if rank == 0 {
            return Err(TrainingError::RankUnderflow {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        Ok(rank)
    }
}
