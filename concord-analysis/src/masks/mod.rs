//! Layered exclusion masks.
//!
//! Three granularities (rating cell, assignment, worker) with a shared
//! rule everywhere: `true` means excluded. Masks combine by element-wise
//! OR within one kind and convert losslessly from coarse to fine; the
//! reverse direction is refused. Named masks live in an ordered
//! registry so every filtering step of an evaluation stays replayable.

pub mod convert;
pub mod registry;
pub mod types;

pub use registry::{MaskRegistry, MergedMask};
pub use types::{Mask, MaskIndex};
