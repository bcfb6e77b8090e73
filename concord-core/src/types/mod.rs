//! Data structures and string interning for Concord.
//! FxHashMap, SmallVec, lasso-based pools, Spur-based ID types.

pub mod collections;
pub mod granularity;
pub mod identifiers;
pub mod interning;

pub use collections::{FxHashMap, FxHashSet, SmallVec4};
pub use granularity::MaskKind;
pub use identifiers::{AlgorithmId, AssignmentId, StimulusId, WorkerId};
pub use interning::{FrozenNames, NamePool};
