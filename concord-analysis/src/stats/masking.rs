//! The masking step: NaN-out excluded cells.

use concord_core::errors::MaskError;
use concord_core::types::MaskKind;
use ndarray::Zip;

use crate::masks::Mask;
use crate::store::RatingTensor;

/// Apply a rating-granularity mask to a tensor, producing a new tensor
/// with every excluded cell set to NaN.
///
/// Pure: the input tensor is untouched. The mask must already be at
/// rating granularity (callers convert coarser masks first) and must
/// match the tensor's shape.
pub fn apply_mask(tensor: &RatingTensor, mask: &Mask) -> Result<RatingTensor, MaskError> {
    let flags = match mask {
        Mask::Rating(flags) => flags,
        other => {
            return Err(MaskError::KindMismatch {
                left: MaskKind::Rating,
                right: other.kind(),
            })
        }
    };

    let shape = tensor.shape();
    if flags.dim() != shape {
        return Err(MaskError::ShapeMismatch {
            expected: vec![shape.0, shape.1, shape.2],
            actual: flags.shape().to_vec(),
        });
    }

    let mut data = tensor.data().clone();
    Zip::from(&mut data).and(flags).for_each(|value, &excluded| {
        if excluded {
            *value = f64::NAN;
        }
    });

    Ok(RatingTensor::from_parts(
        tensor.rating_name().to_string(),
        data,
    ))
}
