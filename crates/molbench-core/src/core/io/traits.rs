use crate::core::models::fingerprints::FingerprintDataset;
use crate::core::models::ids::MoleculeId;
use crate::core::models::molecules::SmilesDataset;
use std::error::Error;

/// Source of the molecules under evaluation.
pub trait SmilesLoader {
    type Error: Error + Send + Sync + 'static;

    /// Loads every molecule whose SMILES string is at most `max_len` characters long,
    /// preserving file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or a row is malformed.
    fn load(&self, max_len: usize) -> Result<SmilesDataset, Self::Error>;
}

/// Source of precomputed fingerprints keyed by molecule id.
pub trait FingerprintLoader {
    type Error: Error + Send + Sync + 'static;

    /// Loads the fingerprints for `ids`, returning rows in the same order as `ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or any id has no fingerprint.
    fn load(&self, ids: &[MoleculeId]) -> Result<FingerprintDataset, Self::Error>;
}
