//! Core types, errors, configuration, and tracing for the Concord
//! rating evaluation engine.
//!
//! Concord scores crowd-sourced subjective listening tests. This crate
//! holds everything the analysis and storage crates share: interned
//! identifier pools, the error taxonomy, configuration resolution, and
//! tracing setup.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;
