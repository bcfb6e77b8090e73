//! Combined quality score per worker.

use serde::{Deserialize, Serialize};

use super::correlation::{algorithm_correlation, sentence_correlation};
use crate::store::RatingTensor;

/// Agreement components for one worker. Either correlation is NaN when
/// the worker has too little paired data; `combined` averages whichever
/// components are present and is NaN only when both are missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub sentence: f64,
    pub algorithm: f64,
    pub combined: f64,
}

fn combine(sentence: f64, algorithm: f64) -> f64 {
    match (sentence.is_nan(), algorithm.is_nan()) {
        (false, false) => (sentence + algorithm) / 2.0,
        (false, true) => sentence,
        (true, false) => algorithm,
        (true, true) => f64::NAN,
    }
}

/// Score every worker of the tensor, indexed by worker position.
pub fn quality_scores(tensor: &RatingTensor) -> Vec<QualityScore> {
    let (_, n_workers, _) = tensor.shape();
    (0..n_workers)
        .map(|w| {
            let sentence = sentence_correlation(tensor, w);
            let algorithm = algorithm_correlation(tensor, w);
            QualityScore {
                sentence,
                algorithm,
                combined: combine(sentence, algorithm),
            }
        })
        .collect()
}
