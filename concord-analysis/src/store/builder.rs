//! Ingestion interface for the rating store.
//!
//! Callers declare the identifier pools and stream in assignments and
//! ratings from whatever tabular export the crowd platform produced;
//! `build()` freezes the pools and enforces the store invariants. The
//! builder never parses raw input itself.

use concord_core::errors::StoreError;
use concord_core::types::{
    AlgorithmId, AssignmentId, FxHashMap, NamePool, StimulusId, WorkerId,
};

use super::{AssignmentMeta, RatingRecord, RatingStore};

/// Accumulates submissions, then freezes them into a [`RatingStore`].
pub struct StoreBuilder {
    algorithms: NamePool,
    files: NamePool,
    workers: NamePool,
    assignments: NamePool,
    rating_names: Vec<String>,
    pending: Vec<RatingRecord>,
    meta: Vec<AssignmentMeta>,
    assignment_worker: Vec<WorkerId>,
    /// Ratings seen per assignment, before duplicate resolution.
    ratings_per_assignment: Vec<usize>,
}

impl StoreBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            algorithms: NamePool::new(),
            files: NamePool::new(),
            workers: NamePool::new(),
            assignments: NamePool::new(),
            rating_names: Vec::new(),
            pending: Vec::new(),
            meta: Vec::new(),
            assignment_worker: Vec::new(),
            ratings_per_assignment: Vec::new(),
        }
    }

    /// Declare an algorithm under evaluation. Pool order follows
    /// declaration order; re-declaring a name returns the existing id.
    /// Ratings declare algorithms implicitly, so this is only needed for
    /// algorithms that must appear in the tensor without any votes yet.
    pub fn add_algorithm(&mut self, name: &str) -> AlgorithmId {
        AlgorithmId::new(self.algorithms.intern(name))
    }

    /// Declare a stimulus file. Same ordering rules as [`Self::add_algorithm`].
    pub fn add_file(&mut self, name: &str) -> StimulusId {
        StimulusId::new(self.files.intern(name))
    }

    /// Declare a worker. Same ordering rules as [`Self::add_algorithm`].
    pub fn add_worker(&mut self, name: &str) -> WorkerId {
        WorkerId::new(self.workers.intern(name))
    }

    /// Declare a submitted assignment. Each external assignment id may
    /// be declared once; it binds the assignment to one worker.
    pub fn add_assignment(
        &mut self,
        assignment: &str,
        worker: &str,
        meta: AssignmentMeta,
    ) -> Result<AssignmentId, StoreError> {
        if self.assignments.get(assignment).is_some() {
            return Err(StoreError::DuplicateAssignment {
                assignment: assignment.to_string(),
            });
        }

        let worker_id = WorkerId::new(self.workers.intern(worker));
        let assignment_id = AssignmentId::new(self.assignments.intern(assignment));
        self.meta.push(meta);
        self.assignment_worker.push(worker_id);
        self.ratings_per_assignment.push(0);
        Ok(assignment_id)
    }

    /// Add one vote belonging to a previously declared assignment.
    pub fn add_rating(
        &mut self,
        assignment: &str,
        algorithm: &str,
        file: &str,
        rating_name: &str,
        vote: f64,
    ) -> Result<(), StoreError> {
        let assignment_id = match self.assignments.get(assignment) {
            Some(spur) => AssignmentId::new(spur),
            None => {
                return Err(StoreError::UnknownAssignment {
                    assignment: assignment.to_string(),
                })
            }
        };

        if !vote.is_finite() {
            return Err(StoreError::NonFiniteVote {
                assignment: assignment.to_string(),
                algorithm: algorithm.to_string(),
                file: file.to_string(),
                rating_name: rating_name.to_string(),
                vote,
            });
        }

        let algorithm_id = AlgorithmId::new(self.algorithms.intern(algorithm));
        let file_id = StimulusId::new(self.files.intern(file));
        let name_index = self.rating_name_index(rating_name);
        let worker_id = self.assignment_worker[assignment_id.index()];

        self.pending.push(RatingRecord {
            worker: worker_id,
            assignment: assignment_id,
            algorithm: algorithm_id,
            file: file_id,
            rating_name: name_index,
            vote,
        });
        self.ratings_per_assignment[assignment_id.index()] += 1;
        Ok(())
    }

    /// Freeze the pools and resolve duplicates.
    ///
    /// A resubmitted (worker, algorithm, file, rating-name) cell keeps
    /// the vote from the assignment with the later submission time.
    /// Conflicting votes submitted at the same instant are rejected.
    pub fn build(self) -> Result<RatingStore, StoreError> {
        if self.pending.is_empty() {
            return Err(StoreError::Empty);
        }

        for (index, count) in self.ratings_per_assignment.iter().enumerate() {
            if *count == 0 {
                let id = AssignmentId::from_index(index)
                    .map(|id| self.assignments.resolve(&id.inner()).to_string())
                    .unwrap_or_else(|| index.to_string());
                return Err(StoreError::EmptyAssignment { assignment: id });
            }
        }

        let mut winners: Vec<RatingRecord> = Vec::with_capacity(self.pending.len());
        let mut by_cell: FxHashMap<(usize, usize, usize, usize), usize> =
            FxHashMap::default();

        for record in &self.pending {
            let key = (
                record.worker.index(),
                record.algorithm.index(),
                record.file.index(),
                record.rating_name,
            );
            match by_cell.get(&key) {
                None => {
                    by_cell.insert(key, winners.len());
                    winners.push(*record);
                }
                Some(&slot) => {
                    let held = winners[slot];
                    let held_at = self.meta[held.assignment.index()].submitted_at;
                    let new_at = self.meta[record.assignment.index()].submitted_at;
                    if new_at > held_at {
                        winners[slot] = *record;
                    } else if new_at == held_at && record.vote != held.vote {
                        return Err(StoreError::AmbiguousDuplicate {
                            worker: self.workers.resolve(&record.worker.inner()).to_string(),
                            algorithm: self
                                .algorithms
                                .resolve(&record.algorithm.inner())
                                .to_string(),
                            file: self.files.resolve(&record.file.inner()).to_string(),
                            rating_name: self.rating_names[record.rating_name].clone(),
                        });
                    }
                    // Same instant, same vote: a harmless duplicate row.
                }
            }
        }

        Ok(RatingStore {
            algorithms: self.algorithms.into_frozen(),
            files: self.files.into_frozen(),
            workers: self.workers.into_frozen(),
            assignments: self.assignments.into_frozen(),
            rating_names: self.rating_names,
            ratings: winners,
            meta: self.meta,
            assignment_worker: self.assignment_worker,
        })
    }

    fn rating_name_index(&mut self, name: &str) -> usize {
        match self.rating_names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.rating_names.push(name.to_string());
                self.rating_names.len() - 1
            }
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
