//! Reading evaluation datasets and writing metric results.
//!
//! Datasets are read through the [`traits::SmilesLoader`] and [`traits::FingerprintLoader`]
//! interfaces so the benchmark workflow does not depend on any particular storage format.
//! The CSV implementations live in [`dataset`]; [`results`] persists accumulated metric
//! records as one CSV file per metric and checkpoint iteration.

pub mod dataset;
pub mod results;
pub mod traits;
