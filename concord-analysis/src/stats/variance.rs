//! Three-component variance decomposition for the MOS confidence interval.
//!
//! Models a (workers, files) rating matrix as `Z[i,j] = mu + x_i + y_j + e_ij`
//! with worker effect `x_i ~ N(0, v_w)`, file effect `y_j ~ N(0, v_s)` and
//! residual `e_ij ~ N(0, v_u)`. The pooled variances observable from the
//! matrix are:
//!
//! - within a file column, workers vary: `v_wu = v_w + v_u`
//! - within a worker row, files vary:    `v_su = v_s + v_u`
//! - over all cells flattened:           `v_swu = v_s + v_w + v_u`
//!
//! Solving that system (clamping negative estimates to zero) gives the
//! variance of the mean for an unbalanced design, and from it the 95%
//! Student-t half-width. Based on the additive crowd model of Ribeiro et
//! al. (2011).

use ndarray::{ArrayView1, ArrayView2, Axis};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Decomposed variance estimates, each clamped to be non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceComponents {
    /// Sentence (file) effect variance.
    pub v_s: f64,
    /// Worker effect variance.
    pub v_w: f64,
    /// Residual variance.
    pub v_u: f64,
}

/// Sample variance (ddof = 1). `None` for fewer than two values.
fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(ss / (n - 1.0))
}

fn present(lane: ArrayView1<'_, f64>) -> Vec<f64> {
    lane.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Mean of the per-lane sample variances along `axis`. A lane qualifies
/// with at least two rated cells; the pooled estimate itself needs at
/// least two qualifying lanes, otherwise `None`.
fn mean_lane_variance(matrix: &ArrayView2<'_, f64>, axis: Axis) -> Option<f64> {
    let mut variances = Vec::new();
    for lane in matrix.axis_iter(axis) {
        if let Some(v) = sample_variance(&present(lane)) {
            variances.push(v);
        }
    }
    if variances.len() < 2 {
        return None;
    }
    Some(variances.iter().sum::<f64>() / variances.len() as f64)
}

/// Estimate (v_s, v_w, v_u) for a (workers, files) matrix with NaN holes.
///
/// Falls back to a reduced system when one of the pooled variances is
/// unavailable (too few rated rows or columns): the share that can no
/// longer be separated stays in the residual. `None` when fewer than two
/// cells are rated in the whole matrix.
pub fn variance_components(matrix: &ArrayView2<'_, f64>) -> Option<VarianceComponents> {
    let flat: Vec<f64> = matrix.iter().copied().filter(|v| !v.is_nan()).collect();
    let v_swu = sample_variance(&flat)?;

    // Axis(1) iterates file columns (variation between workers), Axis(0)
    // iterates worker rows (variation between files).
    let v_wu = mean_lane_variance(matrix, Axis(1));
    let v_su = mean_lane_variance(matrix, Axis(0));

    let (v_s, v_w, v_u) = match (v_wu, v_su) {
        (Some(v_wu), Some(v_su)) => (v_swu - v_wu, v_swu - v_su, v_su + v_wu - v_swu),
        (Some(v_wu), None) => (v_swu - v_wu, 0.0, v_wu),
        (None, Some(v_su)) => (0.0, v_swu - v_su, v_su),
        (None, None) => (0.0, 0.0, v_swu),
    };

    Some(VarianceComponents {
        v_s: v_s.max(0.0),
        v_w: v_w.max(0.0),
        v_u: v_u.max(0.0),
    })
}

/// 95% confidence half-width of the mean rating of a (workers, files)
/// matrix, NaN marking unrated cells.
///
/// With `M_j` rated cells in file column j, `N_i` in worker row i and `T`
/// in total, the variance of the mean under the additive model is
///
/// ```text
/// Var[mu] = v_s * sum(M_j^2) / T^2 + v_w * sum(N_i^2) / T^2 + v_u / T
/// ```
///
/// and the half-width is `t(0.975, df) * sqrt(Var[mu])` with
/// `df = min(workers, files) - 1`. Returns NaN when the matrix is too
/// small or too sparse for the interval to be defined.
pub fn confidence_interval_95(matrix: &ArrayView2<'_, f64>) -> f64 {
    let (n_workers, n_files) = matrix.dim();

    let components = match variance_components(matrix) {
        Some(c) => c,
        None => return f64::NAN,
    };

    let mut total = 0usize;
    let mut sum_sq_files = 0.0;
    for column in matrix.axis_iter(Axis(1)) {
        let m = column.iter().filter(|v| !v.is_nan()).count();
        sum_sq_files += (m * m) as f64;
        total += m;
    }
    let mut sum_sq_workers = 0.0;
    for row in matrix.axis_iter(Axis(0)) {
        let n = row.iter().filter(|v| !v.is_nan()).count();
        sum_sq_workers += (n * n) as f64;
    }

    let t = total as f64;
    let var_mean = components.v_s * sum_sq_files / (t * t)
        + components.v_w * sum_sq_workers / (t * t)
        + components.v_u / t;

    let df = n_workers.min(n_files) as f64 - 1.0;
    if df < 1.0 {
        return f64::NAN;
    }

    t_critical_975(df) * var_mean.sqrt()
}

/// Two-sided 95% critical value of the Student-t distribution.
fn t_critical_975(df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => {
            let t = t_dist.inverse_cdf(0.975);
            if t.is_finite() {
                t
            } else {
                f64::NAN
            }
        }
        Err(_) => f64::NAN,
    }
}
