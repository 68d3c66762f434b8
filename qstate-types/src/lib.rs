use std::collections::BTreeMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry of the amplitude sequence sent to the state-preparation service.
///
/// Reals travel as bare numbers, complex values as `{ "re": .., "im": .. }`.
/// Text that could not be read as a number is passed through unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum WireAmplitude {
    Real(f64),
    Complex { re: f64, im: f64 },
    Literal(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SynthesisRequest {
    pub num_qubits: usize,
    pub amplitudes: Vec<WireAmplitude>,
    pub initial_basis: String,
    pub optimized: bool,
}

impl SynthesisRequest {
    /// Builds a request starting from `|0...0>` with optimization enabled.
    pub fn new(num_qubits: usize, amplitudes: Vec<WireAmplitude>) -> Self {
        Self {
            num_qubits,
            amplitudes,
            initial_basis: "0".repeat(num_qubits),
            optimized: true,
        }
    }
}

/// A gate as reported by the service. Which fields are populated depends on `gate`:
/// single-qubit and rotation kinds use `qubits` (and `angle`), `CNOT`/`CZ` use
/// `control`/`target`, `CCNOT` uses `control1`/`control2`/`target`, `SWAP` uses
/// `q1`/`q2` and `MEASURE` uses `qubit`/`clbit`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct BackendGate {
    #[serde(default)]
    pub step: usize,
    pub gate: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qubits: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control1: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q1: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clbit: Option<usize>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct SynthesisResponse {
    pub num_qubits: usize,
    #[serde(default)]
    pub gate_sequence: Vec<BackendGate>,
    /// Measurement outcome bitstring -> shot count.
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

/// JSON schema of the service request and response, for clients that validate payloads.
pub fn contract_schema() -> serde_json::Value {
    serde_json::json!({
        "request": schemars::schema_for!(SynthesisRequest),
        "response": schemars::schema_for!(SynthesisResponse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_mixed_amplitudes() {
        let req = SynthesisRequest::new(
            1,
            vec![
                WireAmplitude::Real(0.6),
                WireAmplitude::Complex { re: 0.0, im: 0.8 },
            ],
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "num_qubits": 1,
                "amplitudes": [0.6, { "re": 0.0, "im": 0.8 }],
                "initial_basis": "0",
                "optimized": true
            })
        );
    }

    #[test]
    fn amplitudes_deserialize_by_shape() {
        let amps: Vec<WireAmplitude> =
            serde_json::from_str(r#"[1.0, {"re": 0.5, "im": -0.5}, "x"]"#).unwrap();
        assert_eq!(amps[0], WireAmplitude::Real(1.0));
        assert_eq!(amps[1], WireAmplitude::Complex { re: 0.5, im: -0.5 });
        assert_eq!(amps[2], WireAmplitude::Literal("x".to_string()));
    }

    #[test]
    fn response_with_sparse_gate_fields() {
        let body = r#"{
            "num_qubits": 2,
            "gate_sequence": [
                {"step": 1, "gate": "RY", "qubits": [0], "angle": 1.5708},
                {"step": 2, "gate": "CNOT", "control": 0, "target": 1}
            ],
            "counts": {"00": 510, "11": 514}
        }"#;
        let resp: SynthesisResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.num_qubits, 2);
        assert_eq!(resp.gate_sequence.len(), 2);
        assert_eq!(resp.gate_sequence[0].angle, Some(1.5708));
        assert_eq!(resp.gate_sequence[1].control, Some(0));
        assert_eq!(resp.gate_sequence[1].target, Some(1));
        assert!(resp.gate_sequence[1].qubits.is_empty());
        assert_eq!(resp.counts["11"], 514);
    }

    #[test]
    fn response_without_counts_defaults_empty() {
        let resp: SynthesisResponse =
            serde_json::from_str(r#"{"num_qubits": 1, "gate_sequence": []}"#).unwrap();
        assert!(resp.counts.is_empty());
    }

    #[test]
    fn schema_names_the_gate_fields() {
        let schema = contract_schema();
        let text = schema.to_string();
        assert!(text.contains("gate_sequence"));
        assert!(text.contains("initial_basis"));
        assert!(text.contains("control1"));
    }
}
