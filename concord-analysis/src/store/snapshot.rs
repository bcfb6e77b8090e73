//! Plain-data image of a built store, for the persistence layer.
//!
//! A snapshot flattens a [`RatingStore`] into name lists in dense index
//! order plus the live (post duplicate-resolution) ratings. Reassembly
//! validates structural consistency only; it does not repeat ingestion
//! checks. In particular an assignment whose votes were all superseded
//! by a later resubmission carries no live ratings, which is a valid
//! saved state even though the builder refuses an assignment submitted
//! without ratings.

use concord_core::errors::StoreError;
use concord_core::types::{
    AlgorithmId, AssignmentId, FrozenNames, FxHashSet, NamePool, StimulusId, WorkerId,
};

use super::{AssignmentMeta, RatingRecord, RatingStore};

/// Flattened store contents. Every `Vec` is in dense index order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub algorithms: Vec<String>,
    pub files: Vec<String>,
    pub workers: Vec<String>,
    pub assignments: Vec<String>,
    pub rating_names: Vec<String>,
    /// Dense worker index per assignment.
    pub assignment_workers: Vec<usize>,
    /// Metadata per assignment.
    pub metas: Vec<AssignmentMeta>,
    pub ratings: Vec<SnapshotRating>,
}

/// One live rating, with every identifier as a dense pool index. The
/// voting worker is implied by the owning assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRating {
    pub assignment: usize,
    pub algorithm: usize,
    pub file: usize,
    pub rating_name: usize,
    pub vote: f64,
}

impl RatingStore {
    /// Flatten the store for saving.
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            algorithms: pool_names(self.algorithms()),
            files: pool_names(self.files()),
            workers: pool_names(self.workers()),
            assignments: pool_names(self.assignments()),
            rating_names: self.rating_names.clone(),
            assignment_workers: self.assignment_worker.iter().map(|w| w.index()).collect(),
            metas: self.meta.clone(),
            ratings: self
                .ratings
                .iter()
                .map(|r| SnapshotRating {
                    assignment: r.assignment.index(),
                    algorithm: r.algorithm.index(),
                    file: r.file.index(),
                    rating_name: r.rating_name,
                    vote: r.vote,
                })
                .collect(),
        }
    }

    /// Reassemble a store from a saved snapshot.
    ///
    /// Pools are re-interned in the given order, so every dense index
    /// (and with it every mask array) means the same thing it did in
    /// the saved store. Inconsistent contents are refused with
    /// [`StoreError::CorruptSnapshot`].
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<RatingStore, StoreError> {
        let algorithms = freeze_pool(&snapshot.algorithms, "algorithm")?;
        let files = freeze_pool(&snapshot.files, "file")?;
        let workers = freeze_pool(&snapshot.workers, "worker")?;
        let assignments = freeze_pool(&snapshot.assignments, "assignment")?;

        let mut seen_names: FxHashSet<&str> = FxHashSet::default();
        for name in &snapshot.rating_names {
            if !seen_names.insert(name.as_str()) {
                return Err(StoreError::CorruptSnapshot {
                    message: format!("rating name {name:?} listed twice"),
                });
            }
        }

        let n_assignments = assignments.len();
        if snapshot.metas.len() != n_assignments
            || snapshot.assignment_workers.len() != n_assignments
        {
            return Err(StoreError::CorruptSnapshot {
                message: format!(
                    "{} assignments but {} metadata rows and {} worker links",
                    n_assignments,
                    snapshot.metas.len(),
                    snapshot.assignment_workers.len()
                ),
            });
        }

        let mut assignment_worker = Vec::with_capacity(n_assignments);
        for (a, &w) in snapshot.assignment_workers.iter().enumerate() {
            let worker = workers
                .key_of_index(w)
                .map(WorkerId::new)
                .ok_or_else(|| StoreError::CorruptSnapshot {
                    message: format!("assignment {a} links worker index {w} outside the pool"),
                })?;
            assignment_worker.push(worker);
        }

        let mut seen_cells: FxHashSet<(usize, usize, usize, usize)> = FxHashSet::default();
        let mut ratings: Vec<RatingRecord> = Vec::with_capacity(snapshot.ratings.len());
        for r in &snapshot.ratings {
            let assignment = assignments
                .key_of_index(r.assignment)
                .map(AssignmentId::new)
                .ok_or_else(|| corrupt_index("assignment", r.assignment, n_assignments))?;
            let algorithm = algorithms
                .key_of_index(r.algorithm)
                .map(AlgorithmId::new)
                .ok_or_else(|| corrupt_index("algorithm", r.algorithm, algorithms.len()))?;
            let file = files
                .key_of_index(r.file)
                .map(StimulusId::new)
                .ok_or_else(|| corrupt_index("file", r.file, files.len()))?;
            if r.rating_name >= snapshot.rating_names.len() {
                return Err(corrupt_index(
                    "rating name",
                    r.rating_name,
                    snapshot.rating_names.len(),
                ));
            }
            if !r.vote.is_finite() {
                return Err(StoreError::NonFiniteVote {
                    assignment: snapshot.assignments[r.assignment].clone(),
                    algorithm: snapshot.algorithms[r.algorithm].clone(),
                    file: snapshot.files[r.file].clone(),
                    rating_name: snapshot.rating_names[r.rating_name].clone(),
                    vote: r.vote,
                });
            }

            let worker = assignment_worker[r.assignment];
            if !seen_cells.insert((worker.index(), r.algorithm, r.file, r.rating_name)) {
                return Err(StoreError::CorruptSnapshot {
                    message: format!(
                        "two live votes by {} for ({}, {}, {})",
                        snapshot.workers[worker.index()],
                        snapshot.algorithms[r.algorithm],
                        snapshot.files[r.file],
                        snapshot.rating_names[r.rating_name]
                    ),
                });
            }

            ratings.push(RatingRecord {
                worker,
                assignment,
                algorithm,
                file,
                rating_name: r.rating_name,
                vote: r.vote,
            });
        }

        if ratings.is_empty() {
            return Err(StoreError::Empty);
        }

        Ok(RatingStore {
            algorithms,
            files,
            workers,
            assignments,
            rating_names: snapshot.rating_names,
            ratings,
            meta: snapshot.metas,
            assignment_worker,
        })
    }
}

fn pool_names(pool: &FrozenNames) -> Vec<String> {
    pool.iter().map(|(_, name)| name.to_string()).collect()
}

fn freeze_pool(names: &[String], what: &str) -> Result<FrozenNames, StoreError> {
    let mut pool = NamePool::new();
    for name in names {
        pool.intern(name);
    }
    if pool.len() != names.len() {
        return Err(StoreError::CorruptSnapshot {
            message: format!("duplicate {what} name in snapshot"),
        });
    }
    Ok(pool.into_frozen())
}

fn corrupt_index(what: &str, index: usize, len: usize) -> StoreError {
    StoreError::CorruptSnapshot {
        message: format!("rating references {what} index {index} outside pool of {len}"),
    }
}
