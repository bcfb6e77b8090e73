//! Evaluation engine for crowd-sourced subjective rating tests.
//!
//! The pipeline: build a [`store::RatingStore`] from parsed submissions,
//! open a [`Session`], register named exclusion masks (metadata filters,
//! outlier scans, worker-quality selections), and read per-algorithm
//! mean-opinion scores with confidence intervals plus assignment-level
//! approve/reject decision lists.

pub mod masks;
pub mod quality;
pub mod report;
pub mod session;
pub mod stats;
pub mod store;

pub use session::Session;
