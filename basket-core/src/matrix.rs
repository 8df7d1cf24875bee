//! Construction of the dense user–item score matrix.

use nalgebra::DMatrix;

use crate::{IdIndex, InteractionRecord, sample};

/// Output of one matrix build: the score matrix plus its index mappings.
///
/// Rows cover every user with at least one interaction, columns every item;
/// absent cells hold exactly `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingMatrix {
    /// Dense users×items score matrix.
    pub matrix: DMatrix<f64>,
    /// User identifier mapping, in first-seen order.
    pub users: IdIndex,
    /// Item identifier mapping, in first-seen order.
    pub items: IdIndex,
}

/// Assembles interaction records into a [`TrainingMatrix`].
///
/// # Examples
///
/// ```
/// use basket_core::{InteractionMatrixBuilder, InteractionRecord};
///
/// # fn main() -> Result<(), basket_core::InteractionRecordError> {
/// let records = vec![
///     InteractionRecord::new(1001, 2001, 1.0, 100.0, 1)?,
///     InteractionRecord::new(1002, 2002, 2.0, 200.0, 2)?,
/// ];
/// let training = InteractionMatrixBuilder::build(&records);
/// assert_eq!(training.matrix.shape(), (2, 2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionMatrixBuilder;

impl InteractionMatrixBuilder {
    /// Builds the score matrix from `records`.
    ///
    /// Scores of repeated (user, item) pairs sum. An empty input never
    /// fails: the builder substitutes the deterministic synthetic sample
    /// set so a training run always has data to work with.
    #[must_use]
    pub fn build(records: &[InteractionRecord]) -> TrainingMatrix {
        if records.is_empty() {
            log::warn!("interaction source is empty; training on the synthetic sample set");
            return Self::assemble(&sample::synthetic_interactions());
        }
        Self::assemble(records)
    }

    fn assemble(records: &[InteractionRecord]) -> TrainingMatrix {
        let mut users = IdIndex::new();
        let mut items = IdIndex::new();
        let mut cells = Vec::with_capacity(records.len());
        for record in records {
            let row = users.insert(record.user_id);
            let column = items.insert(record.item_id);
            cells.push((row, column, record.score()));
        }

        let mut matrix = DMatrix::zeros(users.len(), items.len());
        for (row, column, score) in cells {
            matrix[(row, column)] += score;
        }

        log::info!(
            "built {}x{} interaction matrix from {} records",
            users.len(),
            items.len(),
            records.len()
        );
        TrainingMatrix {
            matrix,
            users,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(user_id: i64, item_id: i64, price: f64, count: u32) -> InteractionRecord {
        InteractionRecord::new(user_id, item_id, 1.0, price, count).unwrap()
    }

    #[rstest]
    fn dimensions_match_unique_identifiers() {
        let records = vec![
            record(1, 10, 50.0, 1),
            record(1, 20, 50.0, 1),
            record(2, 10, 50.0, 1),
            record(3, 30, 50.0, 1),
        ];
        let training = InteractionMatrixBuilder::build(&records);
        assert_eq!(training.matrix.shape(), (3, 3));
        assert_eq!(training.users.len(), 3);
        assert_eq!(training.items.len(), 3);
    }

    #[rstest]
    fn repeated_pairs_sum_their_scores() {
        let records = vec![record(1, 10, 100.0, 1), record(1, 10, 100.0, 2)];
        let training = InteractionMatrixBuilder::build(&records);
        let expected = records[0].score() + records[1].score();
        assert!((training.matrix[(0, 0)] - expected).abs() < 1e-12);
    }

    #[rstest]
    fn absent_cells_are_exactly_zero() {
        let records = vec![record(1, 10, 100.0, 1), record(2, 20, 100.0, 1)];
        let training = InteractionMatrixBuilder::build(&records);
        assert_eq!(training.matrix[(0, 1)], 0.0);
        assert_eq!(training.matrix[(1, 0)], 0.0);
    }

    #[rstest]
    fn scores_are_never_negative() {
        let training = InteractionMatrixBuilder::build(&sample::synthetic_interactions());
        assert!(training.matrix.iter().all(|&score| score >= 0.0));
    }

    #[rstest]
    fn empty_input_trains_on_the_synthetic_sample() {
        let training = InteractionMatrixBuilder::build(&[]);
        assert!(!training.users.is_empty());
        assert!(!training.items.is_empty());
        assert!(training.users.len() <= 100);
        assert!(training.items.len() <= 50);
    }

    #[rstest]
    fn mapping_order_follows_the_input_sequence() {
        let records = vec![
            record(42, 300, 10.0, 1),
            record(7, 100, 10.0, 1),
            record(42, 200, 10.0, 1),
        ];
        let training = InteractionMatrixBuilder::build(&records);
        assert_eq!(training.users.ids(), &[42, 7]);
        assert_eq!(training.items.ids(), &[300, 100, 200]);
    }
}
