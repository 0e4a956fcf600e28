//! Result Set

use thiserror::Error;

use crate::records::{PredictionRecord, ProductInfo};

/// Errors that can occur when building a [`ResultSet`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResultSetError {
    /// No records were provided.
    #[error("result set has no predictions")]
    Empty,

    /// Ranks are not a permutation of `1..=N`.
    #[error("ranks must run from 1 to {expected} without gaps or repeats, found {found:?}")]
    InvalidRanks {
        /// Number of records, and so the highest expected rank
        expected: usize,
        /// Ranks as delivered
        found: Vec<u32>,
    },
}

/// A ranked prediction response plus the product description that produced it.
///
/// Records are always held in rank order, so the first record is the best
/// recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<PredictionRecord>,
    product_info: Option<ProductInfo>,
}

impl ResultSet {
    /// Build a result set, re-ordering records by rank.
    ///
    /// # Errors
    ///
    /// - [`ResultSetError::Empty`]: there are no records.
    /// - [`ResultSetError::InvalidRanks`]: the ranks are not exactly `1..=N`.
    pub fn new(
        mut records: Vec<PredictionRecord>,
        product_info: Option<ProductInfo>,
    ) -> Result<Self, ResultSetError> {
        if records.is_empty() {
            return Err(ResultSetError::Empty);
        }

        let found: Vec<u32> = records.iter().map(|record| record.rank).collect();

        records.sort_by_key(|record| record.rank);

        let contiguous = records
            .iter()
            .zip(1_u32..)
            .all(|(record, expected)| record.rank == expected);

        if !contiguous {
            return Err(ResultSetError::InvalidRanks {
                expected: records.len(),
                found,
            });
        }

        Ok(Self {
            records,
            product_info,
        })
    }

    /// Records in rank order.
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// The best recommendation (rank 1).
    pub fn best(&self) -> Option<&PredictionRecord> {
        self.records.first()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set has no records. A constructed set always has at least one.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Product description, if the payload carried one.
    pub fn product_info(&self) -> Option<&ProductInfo> {
        self.product_info.as_ref()
    }

    /// Product description, or an all-absent one.
    pub fn product_info_or_default(&self) -> ProductInfo {
        self.product_info.clone().unwrap_or_default()
    }

    /// Total number of metric values that were substituted with zero.
    pub fn coerced_fields(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.coerced_fields().count())
            .sum()
    }
}
