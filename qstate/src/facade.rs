use crate::api::{Diagnostic, QubitCount, StateError};
use crate::parser::parse_wavefunction;
use crate::sphere::{SphereScene, embed_state};
use crate::state::{StateVector, build_state_vector};
use qstate_types::SynthesisRequest;
use serde::Serialize;
use tracing::info;

/// Result of turning one wavefunction expression into a vector.
///
/// Conversion never fails once the qubit count is valid. Problems are listed
/// in `diagnostics` and the vector is all zeros whenever normalization failed.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub qubits: QubitCount,
    pub vector: StateVector,
    pub normalization_sum: f64,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `[0.707, 0, 0, 0.707]`
    pub fn vector_text(&self) -> String {
        self.vector.to_string()
    }

    /// The user-facing lines, one per diagnostic, prefixed with `⚠`.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| format!("⚠ {}", d)).collect()
    }

    pub fn sphere(&self) -> SphereScene {
        embed_state(&self.vector)
    }

    pub fn synthesis_request(&self) -> SynthesisRequest {
        self.vector.synthesis_request()
    }
}

pub fn convert(qubits: QubitCount, text: &str) -> Conversion {
    let parsed = parse_wavefunction(text, qubits);

    if !parsed.matched_any() {
        return Conversion {
            qubits,
            vector: StateVector::zeros(qubits),
            normalization_sum: 0.0,
            diagnostics: vec![Diagnostic::no_valid_terms(qubits)],
        };
    }

    let mut diagnostics = Vec::new();
    if !parsed.invalid.is_empty() {
        diagnostics.push(Diagnostic::InvalidBasis {
            qubits: qubits.get(),
            terms: parsed.invalid.clone(),
        });
    }

    let built = build_state_vector(qubits, &parsed.terms);
    diagnostics.extend(built.failure);

    info!(
        qubits = qubits.get(),
        terms = parsed.terms.len(),
        sum = built.normalization_sum,
        diagnostics = diagnostics.len(),
        "converted wavefunction"
    );

    Conversion {
        qubits,
        vector: built.vector,
        normalization_sum: built.normalization_sum,
        diagnostics,
    }
}

/// Same as [`convert`], with the qubit count still in its textual form.
pub fn convert_str(qubits: &str, text: &str) -> Result<Conversion, StateError> {
    let qubits = QubitCount::parse(qubits)?;
    Ok(convert(qubits, text))
}
