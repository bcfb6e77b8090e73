//! Structured span field definitions for Concord metrics.
//!
//! These constants define the standard field names used in tracing spans
//! across all Concord subsystems. Using consistent field names enables
//! structured log queries over evaluation runs.

/// Masks: rating cells excluded after a merge/apply step.
pub const MASKED_RATINGS: &str = "masked_ratings";

/// Masks: assignments excluded after a merge/apply step.
pub const MASKED_ASSIGNMENTS: &str = "masked_assignments";

/// Masks: workers excluded after a merge/apply step.
pub const MASKED_WORKERS: &str = "masked_workers";

/// Masks: named masks skipped by a merge because they were finer than
/// the merge target.
pub const MERGE_SKIPPED: &str = "merge_skipped";

/// Store: tensor materialization time in milliseconds.
pub const TENSOR_BUILD_TIME: &str = "tensor_build_time";

/// Statistics: confidence interval computation time in milliseconds.
pub const CI_COMPUTE_TIME: &str = "ci_compute_time";

/// Statistics: outlier scan time in milliseconds.
pub const OUTLIER_SCAN_TIME: &str = "outlier_scan_time";

/// Quality: worker score computation time in milliseconds.
pub const SCORE_COMPUTE_TIME: &str = "score_compute_time";

/// Storage: session snapshot write time in milliseconds.
pub const SNAPSHOT_WRITE_TIME: &str = "snapshot_write_time";

/// Storage: session snapshot load time in milliseconds.
pub const SNAPSHOT_LOAD_TIME: &str = "snapshot_load_time";
