//! Mean opinion scores per algorithm.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::stats::variance::confidence_interval_95;
use crate::store::RatingTensor;

/// A mean opinion score with its 95% confidence half-width. Either field
/// is NaN when the underlying slice was empty or too sparse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MosEstimate {
    pub mos: f64,
    pub ci95: f64,
}

/// Arithmetic mean of the rated cells of a (workers, files) matrix.
/// NaN when no cell is rated.
pub fn mean_score(matrix: &ArrayView2<'_, f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in matrix.iter() {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// MOS and CI95 for every algorithm slice of the tensor, indexed by
/// algorithm position.
pub fn mos_per_algorithm(tensor: &RatingTensor) -> Vec<MosEstimate> {
    let (n_algorithms, _, _) = tensor.shape();
    (0..n_algorithms)
        .map(|a| {
            let slice = tensor.algorithm_slice(a);
            MosEstimate {
                mos: mean_score(&slice),
                ci95: confidence_interval_95(&slice),
            }
        })
        .collect()
}
