// src/api.rs
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const MIN_QUBITS: usize = 1;
pub const MAX_QUBITS: usize = 5;

/// Errors that stop a request before any core component runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Enter a valid number of qubits (between 1 and 5), got '{0}'")]
    InvalidQubitCount(String),
}

/// A register width that has already been checked against `[1, 5]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QubitCount(usize);

impl QubitCount {
    pub fn new(n: usize) -> Result<Self, StateError> {
        if (MIN_QUBITS..=MAX_QUBITS).contains(&n) {
            Ok(Self(n))
        } else {
            Err(StateError::InvalidQubitCount(n.to_string()))
        }
    }

    /// Reads a count typed by a user. Anything that is not a plain integer is rejected.
    pub fn parse(text: &str) -> Result<Self, StateError> {
        let trimmed = text.trim();
        let n = trimmed
            .parse::<usize>()
            .map_err(|_| StateError::InvalidQubitCount(trimmed.to_string()))?;
        Self::new(n)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Number of basis states, `2^n`.
    pub fn dimension(self) -> usize {
        1 << self.0
    }

    /// Fixed-width, MSB-first bit string of `index`.
    pub fn bits(self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.0)
    }
}

impl TryFrom<usize> for QubitCount {
    type Error = StateError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl FromStr for QubitCount {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QubitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Problems found while converting a wavefunction. These never abort a
/// conversion; they travel next to the (possibly zeroed) vector.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    #[error("No valid terms found. Example for {qubits} qubit(s): {example}")]
    NoValidTerms { qubits: usize, example: String },

    #[error("Invalid basis states: {} (expected {qubits}-qubit states)", .terms.join(", "))]
    InvalidBasis { qubits: usize, terms: Vec<String> },

    #[error("Invalid normalization. Sum of squares = {sum:.4}. Should be ≈1.")]
    Normalization { sum: f64 },
}

impl Diagnostic {
    pub fn no_valid_terms(qubits: QubitCount) -> Self {
        let n = qubits.get();
        Diagnostic::NoValidTerms {
            qubits: n,
            example: format!("(0.7)|{}> + (0.7)|{}>", "0".repeat(n), "1".repeat(n)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::NoValidTerms { .. } => "noValidTerms",
            Diagnostic::InvalidBasis { .. } => "invalidBasis",
            Diagnostic::Normalization { .. } => "normalization",
        }
    }
}
