use crate::api::QubitCount;
use rand::Rng;
use serde::Serialize;

pub const RANDOM_SAMPLE_NAME: &str = "Random Normalized State";

/// A named example wavefunction, ready to paste into the input.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub wavefunction: String,
}

impl Sample {
    fn new(name: impl Into<String>, wavefunction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wavefunction: wavefunction.into(),
        }
    }
}

fn amplitude(count: usize) -> String {
    format!("{:.3}", 1.0 / (count as f64).sqrt())
}

fn superposition<'a>(amp: &str, bits: impl IntoIterator<Item = &'a String>) -> String {
    bits.into_iter()
        .map(|b| format!("({})|{}>", amp, b))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Every basis state of the register, in index order (`00`, `01`, ...).
pub fn basis_states(qubits: QubitCount) -> Vec<String> {
    (0..qubits.dimension()).map(|i| qubits.bits(i)).collect()
}

/// The canned examples for a register width. Every one of them passes the
/// normalization check once parsed.
pub fn samples(qubits: QubitCount) -> Vec<Sample> {
    let n = qubits.get();
    let zeros = "0".repeat(n);
    let ones = "1".repeat(n);
    let excited = format!("{}1", "0".repeat(n - 1));
    let states = basis_states(qubits);

    let mut out = Vec::new();

    if n >= 2 {
        out.push(Sample::new(
            "Bell State (|00⟩ + |11⟩)",
            format!("(0.707)|{}> + (0.707)|{}>", zeros, ones),
        ));
    }

    out.push(Sample::new(
        format!("Single Excited |{}⟩", excited),
        format!("(1.0)|{}>", excited),
    ));

    if n >= 2 {
        let even: Vec<_> = states.iter().step_by(2).collect();
        out.push(Sample::new(
            "Even States Only",
            superposition(&amplitude(even.len()), even),
        ));
    }

    if n >= 3 {
        let single: Vec<_> = states
            .iter()
            .filter(|b| b.chars().filter(|&c| c == '1').count() == 1)
            .collect();
        out.push(Sample::new(
            "Single Excitation States",
            superposition(&amplitude(n), single),
        ));
    }

    if n >= 2 {
        let amp = amplitude(2);
        out.push(Sample::new(
            "Custom Pattern with Zeros",
            format!(
                "({amp})|{zeros}> + (0.0)|{excited}> + ({amp})|{}0>",
                "1".repeat(n - 1)
            ),
        ));
    }

    out
}

/// Draws one uniform value per basis state and normalizes them. Falls back
/// to the equal superposition if every draw came out zero.
pub fn random_sample<R: Rng + ?Sized>(qubits: QubitCount, rng: &mut R) -> Sample {
    let dimension = qubits.dimension();
    let mut amps: Vec<f64> = (0..dimension).map(|_| rng.r#gen::<f64>()).collect();
    let norm = amps.iter().map(|a| a * a).sum::<f64>().sqrt();
    if norm > 0.0 {
        amps.iter_mut().for_each(|a| *a /= norm);
    } else {
        amps.fill(1.0 / (dimension as f64).sqrt());
    }

    let wavefunction = amps
        .iter()
        .enumerate()
        .map(|(i, a)| format!("({:.3})|{}>", a, qubits.bits(i)))
        .collect::<Vec<_>>()
        .join(" + ");
    Sample::new(RANDOM_SAMPLE_NAME, wavefunction)
}

/// Appends `(amplitude)|basis>` to an expression being composed term by term.
/// A blank basis or amplitude leaves the expression as it was.
pub fn append_term(expression: &str, basis: &str, amplitude: &str) -> String {
    let (basis, amplitude) = (basis.trim(), amplitude.trim());
    if basis.is_empty() || amplitude.is_empty() {
        return expression.to_string();
    }
    let term = format!("({})|{}>", amplitude, basis);
    let current = expression.trim();
    if current.is_empty() {
        term
    } else {
        format!("{} + {}", current, term)
    }
}
