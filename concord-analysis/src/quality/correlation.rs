//! Leave-one-out agreement between one worker and the crowd.

use crate::store::RatingTensor;

/// Pearson correlation of two paired series, skipping pairs where either
/// side is NaN. NaN with fewer than two usable pairs or when either side
/// has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Correlation between one worker's ratings and the mean rating of all
/// other workers, paired per (algorithm, file) cell.
///
/// A cell contributes a pair only when the worker rated it and at least
/// one other worker did too.
pub fn sentence_correlation(tensor: &RatingTensor, worker: usize) -> f64 {
    let (n_algorithms, n_workers, n_files) = tensor.shape();
    let data = tensor.data();

    let mut own = Vec::new();
    let mut crowd = Vec::new();
    for a in 0..n_algorithms {
        for f in 0..n_files {
            let mine = data[[a, worker, f]];
            if mine.is_nan() {
                continue;
            }
            let mut sum = 0.0;
            let mut count = 0usize;
            for w in 0..n_workers {
                let v = data[[a, w, f]];
                if w != worker && !v.is_nan() {
                    sum += v;
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            own.push(mine);
            crowd.push(sum / count as f64);
        }
    }

    pearson(&own, &crowd)
}

/// Correlation between one worker's per-algorithm mean rating and the
/// leave-one-out crowd mean, paired per algorithm.
pub fn algorithm_correlation(tensor: &RatingTensor, worker: usize) -> f64 {
    let (n_algorithms, n_workers, n_files) = tensor.shape();
    let data = tensor.data();

    let mut own = Vec::new();
    let mut crowd = Vec::new();
    for a in 0..n_algorithms {
        let mut own_sum = 0.0;
        let mut own_count = 0usize;
        let mut crowd_sum = 0.0;
        let mut crowd_count = 0usize;
        for w in 0..n_workers {
            for f in 0..n_files {
                let v = data[[a, w, f]];
                if v.is_nan() {
                    continue;
                }
                if w == worker {
                    own_sum += v;
                    own_count += 1;
                } else {
                    crowd_sum += v;
                    crowd_count += 1;
                }
            }
        }
        if own_count == 0 || crowd_count == 0 {
            continue;
        }
        own.push(own_sum / own_count as f64);
        crowd.push(crowd_sum / crowd_count as f64);
    }

    pearson(&own, &crowd)
}
