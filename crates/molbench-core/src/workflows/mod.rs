//! # Workflows Module
//!
//! High-level entry points for users of molbench.
//!
//! - **Benchmark Workflow** ([`benchmark`]) - Loads the evaluation datasets, waits for the
//!   inference service, sweeps every enabled metric over its variations and persists the
//!   accumulated results after each one.

pub mod benchmark;
