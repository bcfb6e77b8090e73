//! Coarse-to-fine mask conversion.
//!
//! Every legal (source, target) pair is written out in one exhaustive
//! match so that adding a granularity forces every direction to be
//! reconsidered. Converting fine to coarse is refused: a coarse mask
//! cannot represent which of its children were excluded.

use concord_core::errors::MaskError;
use concord_core::types::MaskKind;
use ndarray::{Array1, Array3};

use crate::store::StoreIndex;

use super::types::Mask;

impl Mask {
    /// Convert this mask to `target` granularity using the cached store
    /// index. Same-kind conversion is a clone. Coarsening is refused
    /// with [`MaskError::IllegalConversion`].
    ///
    /// Conversion to rating granularity only ever sets cells that have
    /// an owning assignment: a cell nobody rated stays unmasked, so
    /// masked counts keep meaning "ratings excluded".
    pub fn convert(&self, target: MaskKind, index: &StoreIndex) -> Result<Mask, MaskError> {
        match (self, target) {
            (Self::Rating(_), MaskKind::Rating)
            | (Self::Assignment(_), MaskKind::Assignment)
            | (Self::Worker(_), MaskKind::Worker) => Ok(self.clone()),

            (Self::Worker(flags), MaskKind::Assignment) => {
                check_len(flags, index.n_workers())?;
                let converted: Array1<bool> = (0..index.n_assignments())
                    .map(|a| flags[index.worker_of(a)])
                    .collect();
                Ok(Self::Assignment(converted))
            }

            (Self::Worker(flags), MaskKind::Rating) => {
                check_len(flags, index.n_workers())?;
                let converted = cells_where(index, |owner| flags[index.worker_of(owner)]);
                Ok(Self::Rating(converted))
            }

            (Self::Assignment(flags), MaskKind::Rating) => {
                check_len(flags, index.n_assignments())?;
                let converted = cells_where(index, |owner| flags[owner]);
                Ok(Self::Rating(converted))
            }

            (source, target) => Err(MaskError::IllegalConversion {
                from: source.kind(),
                to: target,
            }),
        }
    }
}

/// Rating-shaped flags: true where the cell has an owner and the
/// predicate holds for that owning assignment.
fn cells_where<F>(index: &StoreIndex, excluded: F) -> Array3<bool>
where
    F: Fn(usize) -> bool,
{
    index
        .cell_owners()
        .map(|owner| owner.map(|a| excluded(a as usize)).unwrap_or(false))
}

fn check_len(flags: &Array1<bool>, expected: usize) -> Result<(), MaskError> {
    if flags.len() == expected {
        Ok(())
    } else {
        Err(MaskError::ShapeMismatch {
            expected: vec![expected],
            actual: vec![flags.len()],
        })
    }
}
