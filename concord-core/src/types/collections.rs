//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec optimized for per-assignment rating lists (usually <8).
pub type SmallVec8<T> = SmallVec<[T; 8]>;

/// SmallVec optimized for per-worker assignment lists (usually <4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// SmallVec optimized for rating-name lists (usually 1 or 2).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
