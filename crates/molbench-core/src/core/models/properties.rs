use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyTableError {
    #[error("Property column '{name}' has {found} rows, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Duplicate property column '{0}'")]
    DuplicateColumn(String),
}

/// Named numeric columns sharing the row order of the owning dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl PropertyTable {
    pub fn new(rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows,
        }
    }

    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, PropertyTableError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), PropertyTableError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(PropertyTableError::DuplicateColumn(name));
        }
        if values.len() != self.rows {
            return Err(PropertyTableError::ColumnLength {
                name,
                expected: self.rows,
                found: values.len(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn truncate(&mut self, n: usize) {
        let n = n.min(self.rows);
        for column in &mut self.columns {
            column.truncate(n);
        }
        self.rows = n;
    }

    pub(crate) fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| rows.iter().map(|&r| column[r]).collect())
                .collect(),
            rows: rows.len(),
        }
    }
}
