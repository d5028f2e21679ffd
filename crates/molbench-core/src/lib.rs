//! # molbench Core Library
//!
//! Benchmarking toolkit for generative molecular models served behind an inference service.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`SmilesDataset`, `FingerprintDataset`),
//!   chemistry primitives (SMILES validation, Tanimoto similarity), statistics, regressors, result records and
//!   dataset/result I/O.
//!
//! - **[`engine`]: The Logic Core.** Configuration, the inference client contract, the
//!   readiness wait, sweep variations and the metric implementations.
//!
//! - **[`workflows`]: The Public API.** The benchmark sweep that ties datasets, the inference
//!   service and the metrics together and persists results after every variation.

pub mod core;
pub mod engine;
pub mod workflows;
