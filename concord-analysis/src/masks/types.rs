//! Mask representation, construction, combination, and introspection.

use concord_core::errors::MaskError;
use concord_core::types::MaskKind;
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};

use crate::store::{AssignmentMeta, RatingStore};

/// An exclusion mask at one of the three granularities.
/// `true` = excluded, everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mask {
    /// One flag per (algorithm, worker, file) tensor cell.
    Rating(Array3<bool>),
    /// One flag per assignment, dense assignment order.
    Assignment(Array1<bool>),
    /// One flag per worker, dense worker order.
    Worker(Array1<bool>),
}

/// Position of a single mask flag, granularity-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskIndex {
    /// (algorithm, worker, file) tensor cell.
    Cell(usize, usize, usize),
    /// Dense pool index of an assignment or worker.
    Entity(usize),
}

impl Mask {
    /// All-false (nothing excluded) mask of the kind's shape in `store`.
    pub fn empty(kind: MaskKind, store: &RatingStore) -> Self {
        match kind {
            MaskKind::Rating => Self::Rating(Array3::from_elem(store.tensor_shape(), false)),
            MaskKind::Assignment => {
                Self::Assignment(Array1::from_elem(store.n_assignments(), false))
            }
            MaskKind::Worker => Self::Worker(Array1::from_elem(store.n_workers(), false)),
        }
    }

    /// Worker mask from the set of excluded worker indices.
    pub fn from_worker_indices<I>(n_workers: usize, excluded: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut flags = Array1::from_elem(n_workers, false);
        for index in excluded {
            flags[index] = true;
        }
        Self::Worker(flags)
    }

    /// Assignment mask from the set of excluded assignment indices.
    pub fn from_assignment_indices<I>(n_assignments: usize, excluded: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut flags = Array1::from_elem(n_assignments, false);
        for index in excluded {
            flags[index] = true;
        }
        Self::Assignment(flags)
    }

    /// Assignment mask from a metadata predicate: an assignment is
    /// excluded when the predicate holds for its metadata.
    pub fn from_meta<F>(store: &RatingStore, predicate: F) -> Self
    where
        F: Fn(&AssignmentMeta) -> bool,
    {
        let flags: Array1<bool> = store.metas().iter().map(predicate).collect();
        Self::Assignment(flags)
    }

    /// The granularity of this mask.
    pub fn kind(&self) -> MaskKind {
        match self {
            Self::Rating(_) => MaskKind::Rating,
            Self::Assignment(_) => MaskKind::Assignment,
            Self::Worker(_) => MaskKind::Worker,
        }
    }

    /// The mask's dimensions (three entries for rating masks, one
    /// otherwise).
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Rating(flags) => flags.shape().to_vec(),
            Self::Assignment(flags) | Self::Worker(flags) => flags.shape().to_vec(),
        }
    }

    /// Total number of flags.
    pub fn len(&self) -> usize {
        match self {
            Self::Rating(flags) => flags.len(),
            Self::Assignment(flags) | Self::Worker(flags) => flags.len(),
        }
    }

    /// Returns true when the mask holds no flags at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element-wise OR of two masks of the same kind.
    ///
    /// Commutative, associative, idempotent; the empty mask is the
    /// identity. Kind or shape disagreement is an error.
    pub fn combine(&self, other: &Mask) -> Result<Mask, MaskError> {
        match (self, other) {
            (Self::Rating(a), Self::Rating(b)) => {
                Self::check_shape(a.shape(), b.shape())?;
                Ok(Self::Rating(a | b))
            }
            (Self::Assignment(a), Self::Assignment(b)) => {
                Self::check_shape(a.shape(), b.shape())?;
                Ok(Self::Assignment(a | b))
            }
            (Self::Worker(a), Self::Worker(b)) => {
                Self::check_shape(a.shape(), b.shape())?;
                Ok(Self::Worker(a | b))
            }
            (left, right) => Err(MaskError::KindMismatch {
                left: left.kind(),
                right: right.kind(),
            }),
        }
    }

    /// Number of excluded positions.
    pub fn masked_count(&self) -> usize {
        match self {
            Self::Rating(flags) => flags.iter().filter(|&&f| f).count(),
            Self::Assignment(flags) | Self::Worker(flags) => {
                flags.iter().filter(|&&f| f).count()
            }
        }
    }

    /// Number of positions left in.
    pub fn unmasked_count(&self) -> usize {
        self.len() - self.masked_count()
    }

    /// Positions of all excluded flags.
    pub fn masked_indices(&self) -> Vec<MaskIndex> {
        self.indices_where(true)
    }

    /// Positions of all non-excluded flags.
    pub fn unmasked_indices(&self) -> Vec<MaskIndex> {
        self.indices_where(false)
    }

    fn indices_where(&self, wanted: bool) -> Vec<MaskIndex> {
        match self {
            Self::Rating(flags) => flags
                .indexed_iter()
                .filter(|(_, &f)| f == wanted)
                .map(|((a, w, s), _)| MaskIndex::Cell(a, w, s))
                .collect(),
            Self::Assignment(flags) | Self::Worker(flags) => flags
                .indexed_iter()
                .filter(|(_, &f)| f == wanted)
                .map(|(i, _)| MaskIndex::Entity(i))
                .collect(),
        }
    }

    fn check_shape(expected: &[usize], actual: &[usize]) -> Result<(), MaskError> {
        if expected == actual {
            Ok(())
        } else {
            Err(MaskError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            })
        }
    }
}
