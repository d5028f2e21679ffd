use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(v) => Some(v as f64),
            ParamValue::Float(v) => Some(v),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match *self {
            ParamValue::Int(v) => usize::try_from(v).ok(),
            ParamValue::Float(v) if v >= 0.0 && v.fract() == 0.0 => Some(v as usize),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// One concrete assignment of hyperparameters.
pub type ParamSet = Vec<(&'static str, ParamValue)>;

pub fn format_params(params: &ParamSet) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Candidate values per hyperparameter, searched exhaustively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    axes: Vec<(&'static str, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, values: Vec<ParamValue>) -> Self {
        self.axes.push((name, values));
        self
    }

    pub fn axes(&self) -> &[(&'static str, Vec<ParamValue>)] {
        &self.axes
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Cartesian product of all axes; the last axis varies fastest.
    pub fn combinations(&self) -> Vec<ParamSet> {
        self.axes.iter().fold(vec![Vec::new()], |acc, (name, values)| {
            acc.into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut set = prefix.clone();
                        set.push((*name, *value));
                        set
                    })
                })
                .collect()
        })
    }
}
