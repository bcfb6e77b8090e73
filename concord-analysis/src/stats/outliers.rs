//! Z-score outlier flagging over a ratings tensor.
//!
//! Flags cells whose rating deviates from the scope mean by more than
//! `threshold` standard deviations. Scanning a masked tensor keeps
//! already-excluded cells out of both the moments and the flags.

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use concord_core::errors::StatsError;

use crate::masks::Mask;
use crate::store::RatingTensor;

/// Which population the mean and standard deviation are taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierScope {
    /// Separate moments per algorithm slice.
    PerAlgorithm,
    /// One set of moments over the whole tensor.
    Global,
}

/// Population mean and standard deviation of the rated cells in a scope.
fn moments(values: &[f64], scope: &str) -> Result<(f64, f64), StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyScope {
            scope: scope.to_owned(),
        });
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev <= 0.0 || !stddev.is_finite() {
        return Err(StatsError::ZeroVariance {
            scope: scope.to_owned(),
        });
    }
    Ok((mean, stddev))
}

/// Flag every rated cell with `|z| > threshold` into a rating mask.
///
/// Fails on the first degenerate scope (no rated cells, or constant
/// values) so a partial scan never masquerades as a clean one.
pub fn detect_outliers(
    tensor: &RatingTensor,
    threshold: f64,
    scope: OutlierScope,
) -> Result<Mask, StatsError> {
    let mut flags = Array3::from_elem(tensor.data().raw_dim(), false);

    match scope {
        OutlierScope::Global => {
            let rated: Vec<f64> = tensor
                .data()
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            let (mean, stddev) = moments(&rated, "global")?;
            for ((a, w, f), &v) in tensor.data().indexed_iter() {
                if !v.is_nan() && ((v - mean) / stddev).abs() > threshold {
                    flags[[a, w, f]] = true;
                }
            }
        }
        OutlierScope::PerAlgorithm => {
            let (n_algorithms, _, _) = tensor.shape();
            for a in 0..n_algorithms {
                let slice = tensor.algorithm_slice(a);
                let rated: Vec<f64> = slice.iter().copied().filter(|v| !v.is_nan()).collect();
                let (mean, stddev) = moments(&rated, &format!("algorithm {a}"))?;
                for ((w, f), &v) in slice.indexed_iter() {
                    if !v.is_nan() && ((v - mean) / stddev).abs() > threshold {
                        flags[[a, w, f]] = true;
                    }
                }
            }
        }
    }

    Ok(Mask::Rating(flags))
}
