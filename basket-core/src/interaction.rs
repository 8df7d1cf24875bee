//! Aggregated purchase interactions, the raw input to training.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One aggregated (user, item) row from the interaction source.
///
/// Each record summarises every purchase of `item_id` by `user_id` inside
/// the source's trailing window: summed quantity, mean unit price, and the
/// number of distinct purchases. Deserialisation runs the same validation
/// as [`InteractionRecord::new`], so decoded records always satisfy the
/// invariants.
///
/// # Examples
///
/// ```
/// use basket_core::InteractionRecord;
///
/// # fn main() -> Result<(), basket_core::InteractionRecordError> {
/// let record = InteractionRecord::new(1001, 2001, 2.0, 1500.0, 3)?;
/// assert!(record.score() > 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInteractionRecord")]
pub struct InteractionRecord {
    /// External user identifier.
    pub user_id: i64,
    /// External item identifier.
    pub item_id: i64,
    /// Total units purchased across the window.
    pub total_quantity: f64,
    /// Mean unit price across the window.
    pub avg_price: f64,
    /// Number of distinct purchases.
    pub purchase_count: u32,
}

/// Errors returned by [`InteractionRecord::new`].
#[derive(Debug, Error, PartialEq)]
pub enum InteractionRecordError {
    /// The average price was negative.
    #[error("average price must be non-negative, got {price}")]
    NegativePrice {
        /// The rejected price.
        price: f64,
    },
    /// The purchase count was zero.
    #[error("purchase count must be at least 1")]
    ZeroPurchaseCount,
}

impl InteractionRecord {
    /// Validates and constructs an [`InteractionRecord`].
    pub fn new(
        user_id: i64,
        item_id: i64,
        total_quantity: f64,
        avg_price: f64,
        purchase_count: u32,
    ) -> Result<Self, InteractionRecordError> {
        if purchase_count == 0 {
            return Err(InteractionRecordError::ZeroPurchaseCount);
        }
        if avg_price < 0.0 {
            return Err(InteractionRecordError::NegativePrice { price: avg_price });
        }
        Ok(Self {
            user_id,
            item_id,
            total_quantity,
            avg_price,
            purchase_count,
        })
    }

    /// Interaction strength: `purchase_count × ln(1 + avg_price)`.
    ///
    /// The logarithm damps the price factor so expensive one-off purchases
    /// do not dominate frequent cheap ones. Undefined price or quantity
    /// contributes nothing, and the result is never negative.
    #[must_use]
    pub fn score(&self) -> f64 {
        if self.avg_price.is_nan() || self.total_quantity.is_nan() {
            return 0.0;
        }
        f64::from(self.purchase_count) * self.avg_price.ln_1p()
    }
}

/// Wire shape of a record before validation.
#[derive(Deserialize)]
struct RawInteractionRecord {
    user_id: i64,
    item_id: i64,
    total_quantity: f64,
    avg_price: f64,
    purchase_count: u32,
}

impl TryFrom<RawInteractionRecord> for InteractionRecord {
    type Error = InteractionRecordError;

    fn try_from(raw: RawInteractionRecord) -> Result<Self, Self::Error> {
        Self::new(
            raw.user_id,
            raw.item_id,
            raw.total_quantity,
            raw.avg_price,
            raw.purchase_count,
        )
    }
}
