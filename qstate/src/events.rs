use crate::api::Diagnostic;
use crate::facade::Conversion;
use crate::samples::Sample;
use crate::state::StateVector;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize, Debug)]
#[serde(tag = "eventType")]
pub enum Event {
    Conversion(ConversionInfo),
    Samples(SamplesInfo),
    CircuitRendered(CircuitInfo),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConversionInfo {
    pub num_qubits: usize,
    pub vector: StateVector,
    pub vector_text: String,
    pub normalization_sum: f64,
    pub diagnostics: Vec<Diagnostic>,
    pub messages: Vec<String>,
}

impl From<&Conversion> for ConversionInfo {
    fn from(c: &Conversion) -> Self {
        Self {
            num_qubits: c.qubits.get(),
            vector: c.vector.clone(),
            vector_text: c.vector_text(),
            normalization_sum: c.normalization_sum,
            diagnostics: c.diagnostics.clone(),
            messages: c.messages(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SamplesInfo {
    pub num_qubits: usize,
    pub samples: Vec<Sample>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInfo {
    pub num_qubits: usize,
    pub num_gates: usize,
    pub width: f64,
    pub height: f64,
    pub steps: String,
}

/// Writes `event` as one line of JSON.
pub fn emit_event(event: &Event, writer: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, event)?;
    writeln!(writer)
}
