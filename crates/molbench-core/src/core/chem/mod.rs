//! Chemistry primitives used by the benchmark metrics.
//!
//! [`smiles`] validates generated molecules and provides the normalized form used for
//! uniqueness and novelty; [`fingerprint`] computes Tanimoto similarity between
//! precomputed fingerprint vectors.

pub mod fingerprint;
pub mod smiles;
