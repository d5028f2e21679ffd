//! # Core Models Module
//!
//! In-memory tables used by a benchmark run.
//!
//! ## Key Components
//!
//! - [`ids`] - Molecule identifiers shared by every table
//! - [`molecules`] - SMILES strings with their property table
//! - [`properties`] - Named numeric property columns
//! - [`fingerprints`] - Fixed-width fingerprint vectors
//! - [`record`] - Typed result rows produced by metrics
//!
//! Tables loaded for the same run must stay index-aligned: row `i` of every table describes
//! the same molecule. [`molecules::SmilesDataset::ensure_aligned_with`] checks this after
//! independent truncation.

pub mod fingerprints;
pub mod ids;
pub mod molecules;
pub mod properties;
pub mod record;
