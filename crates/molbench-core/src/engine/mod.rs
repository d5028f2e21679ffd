//! # Engine Module
//!
//! Orchestration state and contracts for a benchmark run.
//!
//! - **Configuration** ([`config`]) - Sampling parameters, metric sweeps and output location
//! - **Inference** ([`inference`]) - The contract a generative-model service client must honor
//! - **Readiness** ([`readiness`]) - Bounded, fixed-interval wait for the service to come up
//! - **Metrics** ([`metrics`]) - Validity, uniqueness, novelty, nearest-neighbor correlation
//!   and modelability
//! - **Variations** ([`variation`]) - Typed sweep parameters
//! - **Progress Monitoring** ([`progress`]) - Progress reporting hooks
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod progress;
pub mod readiness;
pub mod variation;
