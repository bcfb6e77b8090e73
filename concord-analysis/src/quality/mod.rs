//! Worker quality scoring and selection.
//!
//! Ranks workers by how well their ratings agree with the leave-one-out
//! crowd consensus, then selects workers for exclusion by absolute score
//! band or percentile band. Correlations over sparse crowd data are
//! routinely undefined, so every score in this module uses NaN as the
//! missing value rather than an error.

pub mod correlation;
pub mod scorer;
pub mod selection;

pub use correlation::{algorithm_correlation, pearson, sentence_correlation};
pub use scorer::{quality_scores, QualityScore};
pub use selection::{select_by_percentile, select_by_threshold};
