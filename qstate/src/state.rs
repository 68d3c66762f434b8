use crate::api::{Diagnostic, QubitCount};
use crate::parser::Term;
use num_complex::Complex64;
use qstate_types::{SynthesisRequest, WireAmplitude};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Accepted range for the sum of squared magnitudes.
pub const NORMALIZATION_MIN: f64 = 0.99;
pub const NORMALIZATION_MAX: f64 = 1.01;

/// The weight attached to one basis state.
///
/// Text that cannot be read as a number is kept as a `Literal` and carries
/// no probability mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireAmplitude", into = "WireAmplitude")]
pub enum Coefficient {
    Real(f64),
    Complex(Complex64),
    Literal(String),
}

impl Coefficient {
    pub const ZERO: Coefficient = Coefficient::Real(0.0);

    /// Interprets the coefficient text written in front of a ket.
    ///
    /// An empty coefficient or a lone `+` means `1`, a lone `-` means `-1`.
    /// Parentheses, whitespace and a leading `+` are dropped before reading
    /// the number.
    pub fn parse(raw: &str) -> Self {
        let text = match raw.trim() {
            "" | "+" => "1",
            "-" => "-1",
            other => other,
        };
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '(' && *c != ')' && !c.is_whitespace())
            .collect();
        let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        if let Ok(value) = cleaned.parse::<f64>() {
            if value.is_finite() {
                return Coefficient::Real(value);
            }
        }
        if cleaned.ends_with(['i', 'j']) {
            if let Ok(value) = cleaned.parse::<Complex64>() {
                if value.is_finite() {
                    return Coefficient::Complex(value);
                }
            }
        }
        Coefficient::Literal(cleaned.to_string())
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Coefficient::Literal(_))
    }

    /// `|c|^2`, zero for literals.
    pub fn norm_sqr(&self) -> f64 {
        match self {
            Coefficient::Real(v) => v * v,
            Coefficient::Complex(c) => c.norm_sqr(),
            Coefficient::Literal(_) => 0.0,
        }
    }

    /// Complex form used by the sphere embedding; literals become `0`.
    pub fn to_complex(&self) -> Complex64 {
        match self {
            Coefficient::Real(v) => Complex64::new(*v, 0.0),
            Coefficient::Complex(c) => *c,
            Coefficient::Literal(_) => Complex64::new(0.0, 0.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Coefficient::Real(v) => *v == 0.0,
            Coefficient::Complex(c) => c.re == 0.0 && c.im == 0.0,
            Coefficient::Literal(_) => false,
        }
    }
}

impl Default for Coefficient {
    fn default() -> Self {
        Coefficient::ZERO
    }
}

impl From<WireAmplitude> for Coefficient {
    fn from(wire: WireAmplitude) -> Self {
        match wire {
            WireAmplitude::Real(v) => Coefficient::Real(v),
            WireAmplitude::Complex { re, im } => Coefficient::Complex(Complex64::new(re, im)),
            WireAmplitude::Literal(s) => Coefficient::Literal(s),
        }
    }
}

impl From<Coefficient> for WireAmplitude {
    fn from(c: Coefficient) -> Self {
        match c {
            Coefficient::Real(v) => WireAmplitude::Real(v),
            Coefficient::Complex(c) => WireAmplitude::Complex { re: c.re, im: c.im },
            Coefficient::Literal(s) => WireAmplitude::Literal(s),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Real(v) => write!(f, "{}", v),
            Coefficient::Complex(c) => write!(f, "{}", c),
            Coefficient::Literal(s) => f.write_str(s),
        }
    }
}

/// Dense, index-addressed amplitudes of an n-qubit register.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateVector {
    pub num_qubits: usize,
    pub amplitudes: Vec<Coefficient>,
}

impl StateVector {
    /// All `2^n` positions set to the real zero.
    pub fn zeros(qubits: QubitCount) -> Self {
        Self {
            num_qubits: qubits.get(),
            amplitudes: vec![Coefficient::ZERO; qubits.dimension()],
        }
    }

    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Sum of `re^2 + im^2` over the numeric positions only.
    pub fn normalization_sum(&self) -> f64 {
        self.amplitudes.iter().map(Coefficient::norm_sqr).sum()
    }

    pub fn is_normalized(&self) -> bool {
        let sum = self.normalization_sum();
        (NORMALIZATION_MIN..=NORMALIZATION_MAX).contains(&sum)
    }

    pub fn is_zero(&self) -> bool {
        self.amplitudes.iter().all(Coefficient::is_zero)
    }

    pub fn to_complex(&self) -> Vec<Complex64> {
        self.amplitudes.iter().map(Coefficient::to_complex).collect()
    }

    pub fn to_wire(&self) -> Vec<WireAmplitude> {
        self.amplitudes.iter().cloned().map(WireAmplitude::from).collect()
    }

    /// Request body for the state-preparation service.
    pub fn synthesis_request(&self) -> SynthesisRequest {
        SynthesisRequest::new(self.num_qubits, self.to_wire())
    }

    fn bits(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits)
    }

    /// Renders the non-zero positions back into wavefunction notation,
    /// e.g. `(0.707)|00> + (0.707)|11>`.
    pub fn to_expression(&self) -> String {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| format!("({})|{}>", c, self.bits(i)))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl fmt::Display for StateVector {
    /// `[0.707, 0, 0, 0.707]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", amp)?;
        }
        f.write_str("]")
    }
}

/// Outcome of assembling parsed terms into a vector.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltVector {
    pub vector: StateVector,
    /// The sum computed before any zeroing took place.
    pub normalization_sum: f64,
    pub failure: Option<Diagnostic>,
}

/// Writes every term to its index (later terms win) and validates the
/// normalization. A vector outside `[0.99, 1.01]` is replaced by zeros as a whole.
pub fn build_state_vector(qubits: QubitCount, terms: &[Term]) -> BuiltVector {
    let mut vector = StateVector::zeros(qubits);
    for term in terms {
        match vector.amplitudes.get_mut(term.index) {
            Some(slot) => *slot = term.coefficient.clone(),
            None => warn!(index = term.index, "term index outside the register, skipping"),
        }
    }

    let sum = vector.normalization_sum();
    debug!(sum, "normalization sum");
    if (NORMALIZATION_MIN..=NORMALIZATION_MAX).contains(&sum) {
        BuiltVector {
            vector,
            normalization_sum: sum,
            failure: None,
        }
    } else {
        warn!(sum, "vector is not normalized, discarding it");
        BuiltVector {
            vector: StateVector::zeros(qubits),
            normalization_sum: sum,
            failure: Some(Diagnostic::Normalization { sum }),
        }
    }
}
