//! Serializable reports for external loggers, CSV exporters and the
//! crowd-platform client. NaN statistics serialize as JSON null.

use serde::{Deserialize, Serialize};

use concord_core::types::MaskKind;

/// Masked/unmasked totals at one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityCounts {
    pub masked: usize,
    pub unmasked: usize,
}

/// Exclusion totals across all registered masks, at all three
/// granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskCounts {
    pub workers: GranularityCounts,
    pub assignments: GranularityCounts,
    pub ratings: GranularityCounts,
}

/// What one mask registration changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskReport {
    /// Registry name the mask landed under.
    pub name: String,
    pub kind: MaskKind,
    pub before: MaskCounts,
    pub after: MaskCounts,
    /// Identifiers excluded by this registration that no earlier mask
    /// covered. Worker and assignment masks list entity names, rating
    /// masks list `algorithm/worker/file` cell labels.
    pub newly_masked: Vec<String>,
    /// Read-filter masks that could not participate in the operation's
    /// merge because they are finer-grained than its target.
    pub merge_skipped: Vec<String>,
}

/// One assignment with its owning worker, for platform-side actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub assignment: String,
    pub worker: String,
}

/// Assignments split into approval and rejection candidates under a
/// given mask set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDecisions {
    pub approve: Vec<AssignmentDecision>,
    pub reject: Vec<AssignmentDecision>,
    pub merge_skipped: Vec<String>,
}

/// MOS and CI95 for one algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmMos {
    pub algorithm: String,
    pub mos: f64,
    pub ci95: f64,
}

/// Per-algorithm mean opinion scores for one rating name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosReport {
    pub rating_name: String,
    pub algorithms: Vec<AlgorithmMos>,
}

/// Quality components for one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerScore {
    pub worker: String,
    pub sentence: f64,
    pub algorithm: f64,
    pub combined: f64,
}

/// Worker quality ranking input for one rating name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerScoreReport {
    pub rating_name: String,
    pub scores: Vec<WorkerScore>,
}
