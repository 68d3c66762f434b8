use qstate::histogram::Histogram;
use qstate::state::{Coefficient, StateVector};
use qstate::{Circuit, QubitCount, Theme, embed_state, render_circuit_svg};
use qstate_types::{BackendGate, WireAmplitude};
use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

// This allows Rust to log to the browser's developer console.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn error(s: &str);
}

fn error_json(message: String) -> String {
    error(&message);
    serde_json::json!({ "error": message }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| error_json(format!("Failed to serialize result: {}", e)))
}

fn parse_gates(gates_json: &str) -> Result<Vec<BackendGate>, String> {
    serde_json::from_str(gates_json).map_err(|e| format!("Failed to parse gates: {}", e))
}

fn parse_circuit(num_qubits: usize, gates_json: &str) -> Result<Circuit, String> {
    let qubits = QubitCount::new(num_qubits).map_err(|e| format!("⚠ {}", e))?;
    let gates = parse_gates(gates_json)?;
    Ok(Circuit::from_backend_gates(qubits, &gates))
}

fn parse_counts(counts_json: &str) -> Result<BTreeMap<String, u64>, JsValue> {
    serde_json::from_str(counts_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse counts: {}", e)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionResult {
    num_qubits: usize,
    vector: StateVector,
    vector_text: String,
    normalization_sum: f64,
    messages: Vec<String>,
    request: qstate_types::SynthesisRequest,
}

// --- WASM Exports ---

/// Parses `wavefunction` for a register of `num_qubits` (as typed by the
/// user) and returns the vector, its text form, the diagnostics and the
/// body to send to the synthesis service.
#[wasm_bindgen]
pub fn convert(num_qubits: &str, wavefunction: &str) -> String {
    let conversion = match qstate::convert_str(num_qubits, wavefunction) {
        Ok(c) => c,
        Err(e) => return error_json(format!("⚠ {}", e)),
    };
    log(&format!("converted {} qubit wavefunction", conversion.qubits));

    to_json(&ConversionResult {
        num_qubits: conversion.qubits.get(),
        vector_text: conversion.vector_text(),
        normalization_sum: conversion.normalization_sum,
        messages: conversion.messages(),
        request: conversion.synthesis_request(),
        vector: conversion.vector,
    })
}

/// Q-sphere scene for an amplitude array (numbers, `{re, im}` objects or strings).
#[wasm_bindgen]
pub fn sphere_scene(amplitudes_json: &str) -> String {
    let wire: Vec<WireAmplitude> = match serde_json::from_str(amplitudes_json) {
        Ok(w) => w,
        Err(e) => return error_json(format!("Failed to parse amplitudes: {}", e)),
    };
    if !wire.len().is_power_of_two() {
        return error_json(format!("{} amplitudes is not a power of two", wire.len()));
    }
    let vector = StateVector {
        num_qubits: wire.len().trailing_zeros() as usize,
        amplitudes: wire.into_iter().map(Coefficient::from).collect(),
    };
    to_json(&embed_state(&vector))
}

#[wasm_bindgen]
pub fn circuit_layout(num_qubits: usize, gates_json: &str) -> String {
    match parse_circuit(num_qubits, gates_json) {
        Ok(circuit) => to_json(&circuit.layout()),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn circuit_svg(num_qubits: usize, gates_json: &str, dark: bool) -> String {
    match parse_circuit(num_qubits, gates_json) {
        Ok(circuit) => render_circuit_svg(&circuit.layout(), Theme::from_dark(dark)),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn describe_steps(gates_json: &str) -> String {
    match parse_gates(gates_json) {
        Ok(gates) => qstate::describe_steps(&gates),
        Err(e) => error_json(e),
    }
}

/// Canned samples followed by a freshly drawn random normalized state.
#[wasm_bindgen]
pub fn sample_wavefunctions(num_qubits: &str) -> String {
    let qubits = match QubitCount::parse(num_qubits) {
        Ok(q) => q,
        Err(e) => return error_json(format!("⚠ {}", e)),
    };
    let mut list = qstate::samples(qubits);
    list.push(qstate::random_sample(qubits, &mut rand::thread_rng()));
    to_json(&list)
}

#[wasm_bindgen]
pub fn basis_states(num_qubits: &str) -> String {
    match QubitCount::parse(num_qubits) {
        Ok(q) => to_json(&qstate::basis_states(q)),
        Err(e) => error_json(format!("⚠ {}", e)),
    }
}

#[wasm_bindgen]
pub fn append_term(expression: &str, basis: &str, amplitude: &str) -> String {
    qstate::samples::append_term(expression, basis, amplitude)
}

/// A chart owned by the page script. `model` returns what the chart library
/// should draw after each call.
#[wasm_bindgen]
pub struct HistogramHandle {
    inner: Histogram,
}

#[wasm_bindgen]
impl HistogramHandle {
    #[wasm_bindgen(constructor)]
    pub fn init(counts_json: &str, dark: bool) -> Result<HistogramHandle, JsValue> {
        let counts = parse_counts(counts_json)?;
        Ok(Self {
            inner: Histogram::init(&counts, Theme::from_dark(dark)),
        })
    }

    pub fn update(&mut self, counts_json: &str) -> Result<(), JsValue> {
        let counts = parse_counts(counts_json)?;
        self.inner.update(&counts);
        Ok(())
    }

    pub fn set_theme(&mut self, dark: bool) {
        self.inner.set_theme(Theme::from_dark(dark));
    }

    pub fn model(&self) -> String {
        to_json(self.inner.model())
    }

    pub fn revision(&self) -> u64 {
        self.inner.revision()
    }
}
