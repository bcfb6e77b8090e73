//! Crowd statistics over partially-masked rating tensors.
//!
//! The statistics layer is pure: it reads a tensor (and a rating mask)
//! and produces values. Statistics that can be legitimately undefined
//! come back as NaN; only outlier detection over degenerate data is an
//! error, because it means the operator scoped the scan wrongly.

pub mod masking;
pub mod mos;
pub mod outliers;
pub mod variance;

pub use masking::apply_mask;
pub use mos::{mean_score, mos_per_algorithm, MosEstimate};
pub use outliers::{detect_outliers, OutlierScope};
pub use variance::{confidence_interval_95, variance_components, VarianceComponents};
