//! Immutable rating store: frozen identifier pools, parsed ratings, and
//! per-assignment metadata.
//!
//! A store is produced once per evaluation by [`StoreBuilder`] and never
//! mutated afterwards. All entity identifiers are interned; their dense
//! pool indices double as tensor axis positions.

pub mod builder;
pub mod index;
pub mod snapshot;
pub mod tensor;

use concord_core::types::{AlgorithmId, AssignmentId, FrozenNames, StimulusId, WorkerId};
use serde::{Deserialize, Serialize};

pub use builder::StoreBuilder;
pub use index::StoreIndex;
pub use snapshot::{SnapshotRating, StoreSnapshot};
pub use tensor::RatingTensor;

/// Review state of an assignment on the crowd platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionState {
    /// Stable lowercase name, used in reports and persisted rows.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a persisted name back into a state.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Metadata of one submitted assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentMeta {
    /// Listening device reported by the worker (e.g. "headphone").
    pub device: String,
    /// Platform review state at ingestion time.
    pub state: SubmissionState,
    /// Submission time, unix seconds.
    pub submitted_at: i64,
    /// Wall-clock seconds the worker spent on the assignment.
    pub work_duration_secs: u64,
}

/// One parsed rating: a single vote by a worker on one tensor cell
/// under one rating name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRecord {
    pub worker: WorkerId,
    pub assignment: AssignmentId,
    pub algorithm: AlgorithmId,
    pub file: StimulusId,
    /// Index into [`RatingStore::rating_names`].
    pub rating_name: usize,
    pub vote: f64,
}

/// Immutable parsed submissions for one evaluation.
#[derive(Debug)]
pub struct RatingStore {
    algorithms: FrozenNames,
    files: FrozenNames,
    workers: FrozenNames,
    assignments: FrozenNames,
    rating_names: Vec<String>,
    ratings: Vec<RatingRecord>,
    /// Indexed by dense assignment index.
    meta: Vec<AssignmentMeta>,
    /// Indexed by dense assignment index.
    assignment_worker: Vec<WorkerId>,
}

impl RatingStore {
    /// Number of distinct algorithms (systems under test).
    pub fn n_algorithms(&self) -> usize {
        self.algorithms.len()
    }

    /// Number of distinct stimulus files.
    pub fn n_files(&self) -> usize {
        self.files.len()
    }

    /// Number of distinct workers.
    pub fn n_workers(&self) -> usize {
        self.workers.len()
    }

    /// Number of submitted assignments.
    pub fn n_assignments(&self) -> usize {
        self.assignments.len()
    }

    /// Shape of every rating tensor: (algorithms, workers, files).
    pub fn tensor_shape(&self) -> (usize, usize, usize) {
        (self.n_algorithms(), self.n_workers(), self.n_files())
    }

    /// Ordered list of distinct rating names seen at ingestion.
    pub fn rating_names(&self) -> &[String] {
        &self.rating_names
    }

    /// Position of a rating name in [`Self::rating_names`].
    pub fn rating_name_index(&self, name: &str) -> Option<usize> {
        self.rating_names.iter().position(|n| n == name)
    }

    /// All live ratings, in store order.
    pub fn ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    /// Metadata of an assignment.
    pub fn meta(&self, assignment: AssignmentId) -> &AssignmentMeta {
        &self.meta[assignment.index()]
    }

    /// Per-assignment metadata, indexed by dense assignment index.
    pub fn metas(&self) -> &[AssignmentMeta] {
        &self.meta
    }

    /// The worker who submitted an assignment.
    pub fn worker_of(&self, assignment: AssignmentId) -> WorkerId {
        self.assignment_worker[assignment.index()]
    }

    /// Submitting worker per assignment, indexed by dense assignment index.
    pub fn assignment_workers(&self) -> &[WorkerId] {
        &self.assignment_worker
    }

    /// Algorithm pool.
    pub fn algorithms(&self) -> &FrozenNames {
        &self.algorithms
    }

    /// Stimulus file pool.
    pub fn files(&self) -> &FrozenNames {
        &self.files
    }

    /// Worker pool.
    pub fn workers(&self) -> &FrozenNames {
        &self.workers
    }

    /// Assignment pool.
    pub fn assignments(&self) -> &FrozenNames {
        &self.assignments
    }

    /// Look up an algorithm by name.
    pub fn algorithm_id(&self, name: &str) -> Option<AlgorithmId> {
        self.algorithms.get(name).map(AlgorithmId::new)
    }

    /// Look up a stimulus file by name.
    pub fn file_id(&self, name: &str) -> Option<StimulusId> {
        self.files.get(name).map(StimulusId::new)
    }

    /// Look up a worker by name.
    pub fn worker_id(&self, name: &str) -> Option<WorkerId> {
        self.workers.get(name).map(WorkerId::new)
    }

    /// Look up an assignment by its external id.
    pub fn assignment_id(&self, name: &str) -> Option<AssignmentId> {
        self.assignments.get(name).map(AssignmentId::new)
    }

    /// Resolve an algorithm id to its name.
    pub fn algorithm_name(&self, id: AlgorithmId) -> &str {
        self.algorithms.resolve(&id.inner())
    }

    /// Resolve a stimulus file id to its name.
    pub fn file_name(&self, id: StimulusId) -> &str {
        self.files.resolve(&id.inner())
    }

    /// Resolve a worker id to its name.
    pub fn worker_name(&self, id: WorkerId) -> &str {
        self.workers.resolve(&id.inner())
    }

    /// Resolve an assignment id to its external id string.
    pub fn assignment_name(&self, id: AssignmentId) -> &str {
        self.assignments.resolve(&id.inner())
    }
}
