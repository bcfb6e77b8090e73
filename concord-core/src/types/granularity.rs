//! Mask granularity kinds.

use serde::{Deserialize, Serialize};

/// Granularity of an exclusion mask.
///
/// The kinds form a hierarchy: `Worker` is coarser than `Assignment`,
/// which is coarser than `Rating`. Coarse masks convert losslessly to
/// finer kinds; the reverse direction is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// One flag per (algorithm, worker, file) tensor cell.
    Rating,
    /// One flag per submitted assignment.
    Assignment,
    /// One flag per worker.
    Worker,
}

impl MaskKind {
    /// Stable lowercase name, used in reports and persisted rows.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Assignment => "assignment",
            Self::Worker => "worker",
        }
    }

    /// Parse a persisted name back into a kind.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rating" => Some(Self::Rating),
            "assignment" => Some(Self::Assignment),
            "worker" => Some(Self::Worker),
            _ => None,
        }
    }

    /// Returns true when `self` converts losslessly into `target`.
    /// Every kind converts to itself.
    pub fn converts_to(&self, target: MaskKind) -> bool {
        self.rank() >= target.rank()
    }

    /// Coarseness rank: higher is coarser.
    fn rank(&self) -> u8 {
        match self {
            Self::Rating => 0,
            Self::Assignment => 1,
            Self::Worker => 2,
        }
    }
}

impl std::fmt::Display for MaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
