//! Dense ratings tensor, one per rating name.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use super::RatingStore;

/// Votes for one rating name as a dense (algorithms, workers, files)
/// array. Cells never rated hold `f64::NAN`; the statistics engine
/// treats NaN as "missing" everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTensor {
    rating_name: String,
    data: Array3<f64>,
}

impl RatingTensor {
    /// Materialize the tensor for one rating name.
    /// Returns `None` when the store has no such rating name.
    pub fn from_store(store: &RatingStore, rating_name: &str) -> Option<Self> {
        let name_index = store.rating_name_index(rating_name)?;
        let mut data = Array3::from_elem(store.tensor_shape(), f64::NAN);
        for record in store.ratings() {
            if record.rating_name == name_index {
                data[[
                    record.algorithm.index(),
                    record.worker.index(),
                    record.file.index(),
                ]] = record.vote;
            }
        }
        Some(Self {
            rating_name: rating_name.to_string(),
            data,
        })
    }

    /// Wrap an existing array (used by the masking step).
    pub fn from_parts(rating_name: String, data: Array3<f64>) -> Self {
        Self { rating_name, data }
    }

    /// The rating name this tensor was built for.
    pub fn rating_name(&self) -> &str {
        &self.rating_name
    }

    /// (algorithms, workers, files).
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// The underlying array.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Borrowed view of the underlying array.
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// The (workers, files) slice of one algorithm.
    pub fn algorithm_slice(&self, algorithm: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), algorithm)
    }

    /// Count of non-NaN cells.
    pub fn rated_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }
}
