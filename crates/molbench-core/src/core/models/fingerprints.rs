use super::ids::MoleculeId;
use super::molecules::DatasetError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Fingerprint for '{id}' has {found} bits, expected {expected}")]
pub struct WidthMismatch {
    pub id: MoleculeId,
    pub expected: usize,
    pub found: usize,
}

/// Precomputed fixed-width fingerprints, one row per molecule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintDataset {
    ids: Vec<MoleculeId>,
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl FingerprintDataset {
    pub fn new(ids: Vec<MoleculeId>, rows: Vec<Vec<f32>>) -> Result<Self, DatasetError> {
        if ids.len() != rows.len() {
            return Err(DatasetError::LengthMismatch {
                ids: ids.len(),
                values: rows.len(),
                what: "fingerprint rows",
            });
        }
        let width = rows.first().map_or(0, Vec::len);
        Ok(Self { ids, rows, width })
    }

    pub fn check_width(&self) -> Result<(), WidthMismatch> {
        match self
            .ids
            .iter()
            .zip(&self.rows)
            .find(|(_, row)| row.len() != self.width)
        {
            Some((id, row)) => Err(WidthMismatch {
                id: id.clone(),
                expected: self.width,
                found: row.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ids(&self) -> &[MoleculeId] {
        &self.ids
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn truncate(&mut self, n: usize) {
        self.ids.truncate(n);
        self.rows.truncate(n);
    }
}
