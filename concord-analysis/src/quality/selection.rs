//! Worker selection by score band.
//!
//! Both selectors return a worker mask with `true` for every worker that
//! did NOT land in the band, ready to register as an exclusion.

use std::cmp::Ordering;

use ndarray::Array1;

use concord_core::errors::MaskError;
use concord_core::types::MaskKind;

use crate::masks::Mask;

/// Select workers whose score falls in `[from, to)`. Unscored (NaN)
/// workers are selected only when `include_missing` is set.
pub fn select_by_threshold(scores: &[f64], from: f64, to: f64, include_missing: bool) -> Mask {
    let flags = scores
        .iter()
        .map(|&s| {
            let selected = if s.is_nan() {
                include_missing
            } else {
                from <= s && s < to
            };
            !selected
        })
        .collect::<Array1<bool>>();
    Mask::Worker(flags)
}

/// Select the percentile band `[from, to)` of the score ranking.
///
/// Workers flagged in `already_masked` and workers without a score stay
/// out of the ranking pool (and out of the selection). The remaining
/// pool is sorted ascending by score and the band maps to sorted
/// positions `[ceil(n*from) - 1, floor(n*to))`, except that `to == 1.0`
/// always reaches the top of the pool. Adjacent bands cut at the same
/// integral boundary therefore share one worker; callers slicing a
/// ranking into brackets rely on exactly these boundaries.
///
/// Percent arguments outside `[0, 1]` or an inverted band are programmer
/// errors and panic.
pub fn select_by_percentile(
    scores: &[f64],
    from: f64,
    to: f64,
    already_masked: &Mask,
) -> Result<Mask, MaskError> {
    assert!(
        (0.0..=1.0).contains(&from) && (0.0..=1.0).contains(&to),
        "percentile bounds must lie in [0, 1]"
    );
    assert!(from <= to, "percentile band must not be inverted");

    let masked = match already_masked {
        Mask::Worker(flags) => flags,
        other => {
            return Err(MaskError::KindMismatch {
                left: MaskKind::Worker,
                right: other.kind(),
            })
        }
    };
    if masked.len() != scores.len() {
        return Err(MaskError::ShapeMismatch {
            expected: vec![scores.len()],
            actual: vec![masked.len()],
        });
    }

    let mut pool: Vec<(f64, usize)> = scores
        .iter()
        .enumerate()
        .filter(|(w, s)| !masked[*w] && !s.is_nan())
        .map(|(w, &s)| (s, w))
        .collect();
    pool.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut flags = Array1::from_elem(scores.len(), true);
    let n = pool.len();
    if n == 0 {
        return Ok(Mask::Worker(flags));
    }

    let n_f = n as f64;
    let start = ((n_f * from).ceil() as isize - 1).max(0) as usize;
    let end = if to == 1.0 {
        n
    } else {
        (n_f * to).floor() as usize
    };
    let end = end.max(start);

    for &(_, w) in &pool[start..end] {
        flags[w] = false;
    }
    Ok(Mask::Worker(flags))
}
