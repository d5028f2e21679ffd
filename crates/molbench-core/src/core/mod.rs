//! # Core Module
//!
//! Fundamental building blocks for molecular benchmarking.
//!
//! - **Datasets** ([`models`]) - Index-aligned SMILES, property and fingerprint tables
//! - **File I/O** ([`io`]) - CSV dataset loaders and the per-metric result writer
//! - **Chemistry** ([`chem`]) - SMILES validation and fingerprint similarity
//! - **Statistics** ([`stats`]) - Rank correlation and pairwise distances
//! - **Regression** ([`regression`]) - Classical regressors, grid search and the model registry

pub mod chem;
pub mod io;
pub mod models;
pub mod regression;
pub mod stats;
