//! Mask algebra errors.

use crate::types::MaskKind;

use super::error_code::{self, ConcordErrorCode};

/// Errors that can occur when combining, converting, or resolving masks.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("mask shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("cannot combine a {left} mask with a {right} mask")]
    KindMismatch { left: MaskKind, right: MaskKind },

    #[error("illegal mask conversion from {from} to {to}: only coarse-to-fine is defined")]
    IllegalConversion { from: MaskKind, to: MaskKind },

    #[error("unknown mask: {name}")]
    UnknownMask { name: String },
}

impl ConcordErrorCode for MaskError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } | Self::KindMismatch { .. } => error_code::SHAPE_MISMATCH,
            Self::IllegalConversion { .. } => error_code::ILLEGAL_CONVERSION,
            Self::UnknownMask { .. } => error_code::UNKNOWN_MASK,
        }
    }
}
