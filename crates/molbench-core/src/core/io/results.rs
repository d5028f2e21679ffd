use crate::core::models::record::{FieldValue, MetricRecord};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write results to '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to flush results to '{path}': {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Union of the records' field names, in the order each name is first seen.
pub fn column_union(records: &[MetricRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for name in records.iter().flat_map(MetricRecord::names) {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

/// `<metric name with spaces replaced by '_'>_<iteration>.csv`
pub fn result_file_name(metric_name: &str, iteration: impl fmt::Display) -> String {
    format!("{}_{}.csv", metric_name.replace(' ', "_"), iteration)
}

fn render_table(columns: &[String], records: &[MetricRecord]) -> String {
    let mut out = columns.join("\t");
    for record in records {
        out.push('\n');
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).unwrap_or(&FieldValue::Missing).to_string())
            .collect();
        out.push_str(&cells.join("\t"));
    }
    out
}

/// Persists a metric's accumulated records, overwriting the previous file for the same
/// metric and iteration.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    directory: PathBuf,
}

impl ResultWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the output directory and any missing parents. Succeeds if it already exists.
    pub fn ensure_directory(&self) -> Result<(), WriteError> {
        fs::create_dir_all(&self.directory).map_err(|source| WriteError::CreateDir {
            path: self.directory.clone(),
            source,
        })
    }

    pub fn path_for(&self, metric_name: &str, iteration: impl fmt::Display) -> PathBuf {
        self.directory.join(result_file_name(metric_name, iteration))
    }

    pub fn write(
        &self,
        metric_name: &str,
        iteration: impl fmt::Display,
        records: &[MetricRecord],
    ) -> Result<PathBuf, WriteError> {
        let path = self.path_for(metric_name, iteration);
        let columns = column_union(records);
        info!(
            "Results for {} ({} rows):\n{}",
            metric_name,
            records.len(),
            render_table(&columns, records)
        );

        let csv_err = |source: csv::Error| WriteError::Csv {
            path: path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        writer.write_record(&columns).map_err(csv_err)?;
        for record in records {
            writer
                .write_record(
                    columns
                        .iter()
                        .map(|c| record.get(c).unwrap_or(&FieldValue::Missing).to_string()),
                )
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| WriteError::Flush {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(
            result_file_name("nearest neighbor correlation", 5),
            "nearest_neighbor_correlation_5.csv"
        );
    }

    #[test]
    fn columns_are_unioned_in_first_seen_order() {
        let records = vec![
            MetricRecord::new().with("name", "m").with("model", "a").with("value", 1.0),
            MetricRecord::new().with("name", "m").with("logp_ratio", 2.0).with("value", 1.5),
        ];
        assert_eq!(column_union(&records), vec!["name", "model", "value", "logp_ratio"]);
    }

    #[test]
    fn write_fills_missing_cells_and_overwrites() {
        let dir = tempdir().unwrap();
        let writer = ResultWriter::new(dir.path().join("nested/out"));
        writer.ensure_directory().unwrap();
        writer.ensure_directory().unwrap();

        let mut records = vec![MetricRecord::new().with("name", "validity").with("radius", 1_i64)];
        let path = writer.write("validity", 7, &records).unwrap();
        assert_eq!(path.file_name().unwrap(), "validity_7.csv");

        records.push(MetricRecord::new().with("name", "validity").with("value", 0.5));
        writer.write("validity", 7, &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "name,radius,value\nvalidity,1,\nvalidity,,0.5\n");
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn accumulated_table_is_logged_at_info() {
        let dir = tempdir().unwrap();
        let writer = ResultWriter::new(dir.path());
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let records = vec![MetricRecord::new().with("name", "novelty").with("value", 0.25)];
        tracing::subscriber::with_default(subscriber, || {
            writer.write("novelty", 2, &records).unwrap();
        });

        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("INFO"));
        assert!(logged.contains("Results for novelty (1 rows)"));
        assert!(logged.contains("0.25"));
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let writer = ResultWriter::new(dir.path().join("absent"));
        let err = writer.write("unique", 1, &[]).unwrap_err();
        assert!(matches!(err, WriteError::Csv { .. }));
    }
}
