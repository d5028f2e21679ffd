use super::fingerprints::FingerprintDataset;
use super::ids::MoleculeId;
use super::properties::PropertyTable;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Dataset has {ids} ids but {values} {what}")]
    LengthMismatch {
        ids: usize,
        values: usize,
        what: &'static str,
    },
    #[error("Datasets are not index-aligned: {left} rows vs {right} rows")]
    RowCountMismatch { left: usize, right: usize },
    #[error("Datasets are not index-aligned at row {row}: '{left}' vs '{right}'")]
    IdMismatch {
        row: usize,
        left: MoleculeId,
        right: MoleculeId,
    },
}

/// Molecules under evaluation together with their measured properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmilesDataset {
    ids: Vec<MoleculeId>,
    smiles: Vec<String>,
    properties: PropertyTable,
}

impl SmilesDataset {
    pub fn new(
        ids: Vec<MoleculeId>,
        smiles: Vec<String>,
        properties: PropertyTable,
    ) -> Result<Self, DatasetError> {
        if ids.len() != smiles.len() {
            return Err(DatasetError::LengthMismatch {
                ids: ids.len(),
                values: smiles.len(),
                what: "SMILES strings",
            });
        }
        if ids.len() != properties.len() {
            return Err(DatasetError::LengthMismatch {
                ids: ids.len(),
                values: properties.len(),
                what: "property rows",
            });
        }
        Ok(Self {
            ids,
            smiles,
            properties,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[MoleculeId] {
        &self.ids
    }

    pub fn smiles(&self) -> &[String] {
        &self.smiles
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MoleculeId, &str)> {
        self.ids.iter().zip(self.smiles.iter().map(String::as_str))
    }

    /// Keeps the first `n` rows of the SMILES and property tables.
    pub fn truncate(&mut self, n: usize) {
        self.ids.truncate(n);
        self.smiles.truncate(n);
        self.properties.truncate(n);
    }

    pub(crate) fn retain_rows(&mut self, keep: impl Fn(&str) -> bool) {
        let rows: Vec<usize> = self
            .smiles
            .iter()
            .enumerate()
            .filter(|(_, s)| keep(s))
            .map(|(i, _)| i)
            .collect();
        if rows.len() == self.len() {
            return;
        }
        self.ids = rows.iter().map(|&r| self.ids[r].clone()).collect();
        self.smiles = rows.iter().map(|&r| self.smiles[r].clone()).collect();
        self.properties = self.properties.select_rows(&rows);
    }

    pub fn ensure_aligned_with(&self, fingerprints: &FingerprintDataset) -> Result<(), DatasetError> {
        if self.len() != fingerprints.len() {
            return Err(DatasetError::RowCountMismatch {
                left: self.len(),
                right: fingerprints.len(),
            });
        }
        match self
            .ids
            .iter()
            .zip(fingerprints.ids())
            .enumerate()
            .find(|(_, (l, r))| l != r)
        {
            Some((row, (left, right))) => Err(DatasetError::IdMismatch {
                row,
                left: left.clone(),
                right: right.clone(),
            }),
            None => Ok(()),
        }
    }
}
