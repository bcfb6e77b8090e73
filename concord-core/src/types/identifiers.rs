//! Spur-based ID types for type-safe interned identifiers.
//!
//! Each ID type wraps a `lasso::Spur` to prevent cross-type confusion.
//! A `WorkerId` cannot be accidentally used where an `AlgorithmId` is
//! expected. Pool keys are dense and insertion-ordered, so `index()`
//! doubles as the position along the matching tensor axis.

use lasso::{Key, Spur};
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Spur);

        impl $name {
            /// Create a new ID from a `Spur`.
            pub fn new(spur: Spur) -> Self {
                Self(spur)
            }

            /// Get the inner `Spur`.
            pub fn inner(self) -> Spur {
                self.0
            }

            /// Dense pool index: position along the matching tensor axis.
            pub fn index(self) -> usize {
                self.0.into_usize()
            }

            /// Reconstruct an ID from a dense pool index.
            ///
            /// Returns `None` when the index cannot be represented as a key.
            /// Callers are responsible for bounds-checking against the pool.
            pub fn from_index(index: usize) -> Option<Self> {
                Spur::try_from_usize(index).map(Self)
            }
        }

        impl From<Spur> for $name {
            fn from(spur: Spur) -> Self {
                Self(spur)
            }
        }

        impl From<$name> for Spur {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Interned algorithm (system under test) identifier.
    AlgorithmId
);

define_id!(
    /// Interned stimulus (sentence/file) identifier.
    StimulusId
);

define_id!(
    /// Interned worker (rater) identifier.
    WorkerId
);

define_id!(
    /// Interned assignment (submitted work unit) identifier.
    AssignmentId
);
