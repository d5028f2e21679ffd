use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeId(String);

impl MoleculeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoleculeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<usize> for MoleculeId {
    fn from(value: usize) -> Self {
        Self::new(value.to_string())
    }
}
