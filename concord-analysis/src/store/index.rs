//! Cached lookup arrays over a frozen store.
//!
//! Built once per session. Mask conversion and decision listing walk
//! these arrays instead of re-scanning the rating rows.

use ndarray::Array3;

use concord_core::types::SmallVec4;

use super::RatingStore;

/// Dense worker/assignment/cell lookups.
#[derive(Debug)]
pub struct StoreIndex {
    /// Assignment index -> worker index.
    worker_of_assignment: Vec<usize>,
    /// Worker index -> assignment indices, ascending.
    assignments_of_worker: Vec<SmallVec4<usize>>,
    /// (algorithm, worker, file) -> owning assignment index.
    /// `None` where the cell was never rated.
    cell_owner: Array3<Option<u32>>,
}

impl StoreIndex {
    /// Build all lookup arrays from a frozen store.
    ///
    /// When ratings of one cell span several assignments (a partial
    /// resubmission under a different rating name), the owner is the
    /// assignment with the latest submission time, matching the store's
    /// duplicate resolution.
    pub fn build(store: &RatingStore) -> Self {
        let n_assignments = store.n_assignments();
        let n_workers = store.n_workers();

        let mut worker_of_assignment = vec![0usize; n_assignments];
        let mut assignments_of_worker: Vec<SmallVec4<usize>> =
            vec![SmallVec4::new(); n_workers];
        for (a, worker) in store.assignment_workers().iter().enumerate() {
            let w = worker.index();
            worker_of_assignment[a] = w;
            assignments_of_worker[w].push(a);
        }

        let metas = store.metas();
        let mut cell_owner: Array3<Option<u32>> =
            Array3::from_elem(store.tensor_shape(), None);
        for record in store.ratings() {
            let cell = [
                record.algorithm.index(),
                record.worker.index(),
                record.file.index(),
            ];
            let candidate = record.assignment.index();
            match cell_owner[cell] {
                None => cell_owner[cell] = Some(candidate as u32),
                Some(held) => {
                    let held_at = metas[held as usize].submitted_at;
                    let new_at = metas[candidate].submitted_at;
                    if new_at > held_at {
                        cell_owner[cell] = Some(candidate as u32);
                    }
                }
            }
        }

        Self {
            worker_of_assignment,
            assignments_of_worker,
            cell_owner,
        }
    }

    /// Worker index that submitted the assignment.
    pub fn worker_of(&self, assignment_index: usize) -> usize {
        self.worker_of_assignment[assignment_index]
    }

    /// Assignment indices submitted by a worker, ascending.
    pub fn assignments_of(&self, worker_index: usize) -> &[usize] {
        &self.assignments_of_worker[worker_index]
    }

    /// Owning assignment index of a tensor cell, if the cell was rated.
    pub fn cell_owner(&self, algorithm: usize, worker: usize, file: usize) -> Option<usize> {
        self.cell_owner[[algorithm, worker, file]].map(|a| a as usize)
    }

    /// The full cell-owner array.
    pub fn cell_owners(&self) -> &Array3<Option<u32>> {
        &self.cell_owner
    }

    /// Tensor shape covered by the cell-owner array.
    pub fn tensor_shape(&self) -> (usize, usize, usize) {
        self.cell_owner.dim()
    }

    /// Number of assignments covered.
    pub fn n_assignments(&self) -> usize {
        self.worker_of_assignment.len()
    }

    /// Number of workers covered.
    pub fn n_workers(&self) -> usize {
        self.assignments_of_worker.len()
    }
}
