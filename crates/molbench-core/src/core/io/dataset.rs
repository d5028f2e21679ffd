use super::traits::{FingerprintLoader, SmilesLoader};
use crate::core::models::fingerprints::{FingerprintDataset, WidthMismatch};
use crate::core::models::ids::MoleculeId;
use crate::core::models::molecules::{DatasetError, SmilesDataset};
use crate::core::models::properties::{PropertyTable, PropertyTableError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const ID_COLUMN: &str = "id";
pub const DEFAULT_SMILES_COLUMN: &str = "canonical_smiles";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("'{path}' has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
    #[error("'{path}' line {line}: column '{column}' holds non-numeric value '{value}'")]
    InvalidNumber {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
    #[error("No fingerprint found for molecule '{0}'")]
    MissingFingerprint(MoleculeId),
    #[error(transparent)]
    Width(#[from] WidthMismatch),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Property(#[from] PropertyTableError),
}

fn open(path: &Path) -> Result<(csv::Reader<std::fs::File>, csv::StringRecord), LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    Ok((reader, headers))
}

fn column_index(path: &Path, headers: &csv::StringRecord, column: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Reads molecules from a CSV file with an `id` column, a SMILES column and any number of
/// numeric property columns. Empty property cells become `NaN`.
#[derive(Debug, Clone)]
pub struct CsvSmilesLoader {
    path: PathBuf,
    smiles_column: String,
}

impl CsvSmilesLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            smiles_column: DEFAULT_SMILES_COLUMN.to_string(),
        }
    }

    pub fn with_smiles_column(mut self, column: impl Into<String>) -> Self {
        self.smiles_column = column.into();
        self
    }

    fn parse_property(&self, record: &csv::StringRecord, column: &str, raw: &str) -> Result<f64, LoadError> {
        if raw.is_empty() {
            return Ok(f64::NAN);
        }
        raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
            path: self.path.clone(),
            line: line_of(record),
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}

impl SmilesLoader for CsvSmilesLoader {
    type Error = LoadError;

    fn load(&self, max_len: usize) -> Result<SmilesDataset, LoadError> {
        let (mut reader, headers) = open(&self.path)?;
        let id_index = column_index(&self.path, &headers, ID_COLUMN)?;
        let smiles_index = column_index(&self.path, &headers, &self.smiles_column)?;
        let property_columns: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_index && *i != smiles_index)
            .collect();

        let mut ids = Vec::new();
        let mut smiles = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); property_columns.len()];

        for result in reader.records() {
            let record = result.map_err(|source| LoadError::Csv {
                path: self.path.clone(),
                source,
            })?;
            ids.push(MoleculeId::new(record.get(id_index).unwrap_or_default()));
            smiles.push(record.get(smiles_index).unwrap_or_default().to_string());
            for (slot, (index, name)) in values.iter_mut().zip(&property_columns) {
                let raw = record.get(*index).unwrap_or_default();
                slot.push(self.parse_property(&record, name, raw)?);
            }
        }

        let mut properties = PropertyTable::new(ids.len());
        for ((_, name), column) in property_columns.iter().zip(values) {
            properties.push_column(*name, column)?;
        }

        let loaded = ids.len();
        let mut dataset = SmilesDataset::new(ids, smiles, properties)?;
        dataset.retain_rows(|s| s.chars().count() <= max_len);
        if dataset.len() < loaded {
            debug!(
                "Dropped {} molecules longer than {} characters",
                loaded - dataset.len(),
                max_len
            );
        }
        info!(
            "Loaded {} molecules with {} properties from '{}'",
            dataset.len(),
            dataset.properties().num_columns(),
            self.path.display()
        );
        Ok(dataset)
    }
}

/// Reads fingerprints from a CSV file whose first column is `id` and whose remaining
/// columns are the fingerprint bits.
#[derive(Debug, Clone)]
pub struct CsvFingerprintLoader {
    path: PathBuf,
}

impl CsvFingerprintLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FingerprintLoader for CsvFingerprintLoader {
    type Error = LoadError;

    fn load(&self, ids: &[MoleculeId]) -> Result<FingerprintDataset, LoadError> {
        let (mut reader, headers) = open(&self.path)?;
        let id_index = column_index(&self.path, &headers, ID_COLUMN)?;
        let wanted: HashSet<&str> = ids.iter().map(MoleculeId::as_str).collect();
        let mut found: HashMap<String, Vec<f32>> = HashMap::with_capacity(ids.len());

        for result in reader.records() {
            let record = result.map_err(|source| LoadError::Csv {
                path: self.path.clone(),
                source,
            })?;
            let id = record.get(id_index).unwrap_or_default();
            if !wanted.contains(id) || found.contains_key(id) {
                continue;
            }
            let bits = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_index)
                .map(|(i, raw)| {
                    raw.parse::<f32>().map_err(|_| LoadError::InvalidNumber {
                        path: self.path.clone(),
                        line: line_of(&record),
                        column: headers.get(i).unwrap_or_default().to_string(),
                        value: raw.to_string(),
                    })
                })
                .collect::<Result<Vec<f32>, LoadError>>()?;
            found.insert(id.to_string(), bits);
        }

        let rows = ids
            .iter()
            .map(|id| {
                found
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| LoadError::MissingFingerprint(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let dataset = FingerprintDataset::new(ids.to_vec(), rows)?;
        dataset.check_width()?;
        info!(
            "Loaded {} fingerprints of width {} from '{}'",
            dataset.len(),
            dataset.width(),
            self.path.display()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn smiles_loader_reads_properties_and_filters_long_rows() {
        let file = write_csv(
            "id,canonical_smiles,logp,mw\n\
             m1,CCO,0.5,46.07\n\
             m2,CCCCCCCCCCCC,6.1,170.3\n\
             m3,c1ccccc1,,78.1\n",
        );
        let dataset = CsvSmilesLoader::new(file.path()).load(10).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.smiles(), &["CCO".to_string(), "c1ccccc1".to_string()]);
        assert_eq!(dataset.ids()[1], MoleculeId::from("m3"));
        assert_eq!(dataset.properties().names(), &["logp".to_string(), "mw".to_string()]);
        let logp = dataset.properties().column("logp").unwrap();
        assert_eq!(logp[0], 0.5);
        assert!(logp[1].is_nan());
    }

    #[test]
    fn smiles_column_is_configurable() {
        let file = write_csv("smiles,id\nCC,a\n");
        let dataset = CsvSmilesLoader::new(file.path())
            .with_smiles_column("smiles")
            .load(100)
            .unwrap();
        assert_eq!(dataset.smiles(), &["CC".to_string()]);
        assert_eq!(dataset.properties().num_columns(), 0);
    }

    #[test]
    fn missing_smiles_column_is_reported() {
        let file = write_csv("id,smiles\na,CC\n");
        let err = CsvSmilesLoader::new(file.path()).load(100).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column, .. } if column == "canonical_smiles"));
    }

    #[test]
    fn non_numeric_property_is_an_error() {
        let file = write_csv("id,canonical_smiles,logp\na,CC,high\n");
        let err = CsvSmilesLoader::new(file.path()).load(100).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn fingerprints_follow_requested_id_order() {
        let file = write_csv("id,b0,b1,b2\na,1,0,1\nb,0,0,1\nc,1,1,1\n");
        let ids = vec![MoleculeId::from("c"), MoleculeId::from("a")];
        let dataset = CsvFingerprintLoader::new(file.path()).load(&ids).unwrap();
        assert_eq!(dataset.ids(), ids.as_slice());
        assert_eq!(dataset.width(), 3);
        assert_eq!(dataset.row(0).unwrap(), &[1.0, 1.0, 1.0]);
        assert_eq!(dataset.row(1).unwrap(), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_fingerprint_is_an_error() {
        let file = write_csv("id,b0\na,1\n");
        let err = CsvFingerprintLoader::new(file.path())
            .load(&[MoleculeId::from("zz")])
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingFingerprint(id) if id.as_str() == "zz"));
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let err = CsvSmilesLoader::new("/nonexistent/molecules.csv")
            .load(10)
            .unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }
}
