use std::fmt;

/// One point of a metric's parameter sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Variation {
    /// A numeric sweep value such as a sampling radius or neighbour count.
    Int(i64),
    /// A named choice, such as a regressor from the registry.
    Name(String),
}

impl Variation {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variation::Int(v) => Some(*v),
            Variation::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Variation::Name(name) => Some(name),
            Variation::Int(_) => None,
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Int(v) => write!(f, "{}", v),
            Variation::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Variation {
    fn from(value: i64) -> Self {
        Variation::Int(value)
    }
}

impl From<&str> for Variation {
    fn from(value: &str) -> Self {
        Variation::Name(value.to_string())
    }
}
