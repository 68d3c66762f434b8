use crate::api::{QubitCount, StateError};
use qstate_types::{BackendGate, SynthesisResponse};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

pub const COLUMN_PITCH: f64 = 120.0;
pub const FIRST_COLUMN_X: f64 = 100.0;
pub const QUANTUM_PITCH: f64 = 60.0;
pub const CLASSICAL_PITCH: f64 = 40.0;
pub const GATE_SIZE: f64 = 50.0;
pub const FILLER_SIZE: f64 = 30.0;
pub const DOT_RADIUS: f64 = 6.0;
pub const RING_RADIUS: f64 = 12.0;

const WIRE_TOP: f64 = 30.0;
const WIRE_MARGIN: f64 = 20.0;
const CROSS_HALF: f64 = 10.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SingleKind {
    X,
    Y,
    Z,
    H,
    S,
    T,
    Sdg,
    Tdg,
}

impl SingleKind {
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Some(match name {
            "X" => SingleKind::X,
            "Y" => SingleKind::Y,
            "Z" => SingleKind::Z,
            "H" => SingleKind::H,
            "S" => SingleKind::S,
            "T" => SingleKind::T,
            "SDG" => SingleKind::Sdg,
            "TDG" => SingleKind::Tdg,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            SingleKind::X => "X",
            SingleKind::Y => "Y",
            SingleKind::Z => "Z",
            SingleKind::H => "H",
            SingleKind::S => "S",
            SingleKind::T => "T",
            SingleKind::Sdg => "SDG",
            SingleKind::Tdg => "TDG",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationKind {
    Rx,
    Ry,
    Rz,
    Phase,
}

impl RotationKind {
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Some(match name {
            "RX" => RotationKind::Rx,
            "RY" => RotationKind::Ry,
            "RZ" => RotationKind::Rz,
            "PHASE" => RotationKind::Phase,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RotationKind::Rx => "RX",
            RotationKind::Ry => "RY",
            RotationKind::Rz => "RZ",
            RotationKind::Phase => "PHASE",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairKind {
    Cnot,
    Cz,
}

impl PairKind {
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        match name {
            "CNOT" => Some(PairKind::Cnot),
            "CZ" => Some(PairKind::Cz),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            PairKind::Cnot => "CNOT",
            PairKind::Cz => "CZ",
        }
    }
}

/// An abstract gate operation. Wire lists are role-ordered: controls before target.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum GateOp {
    Single {
        kind: SingleKind,
        target: usize,
    },
    Rotation {
        kind: RotationKind,
        target: usize,
        /// Radians.
        angle: Option<f64>,
    },
    Controlled {
        kind: PairKind,
        control: usize,
        target: usize,
    },
    Swap {
        a: usize,
        b: usize,
    },
    Toffoli {
        controls: [usize; 2],
        target: usize,
    },
    Measure {
        qubit: usize,
        clbit: usize,
    },
    /// A gate kind this crate does not draw.
    Unknown {
        name: String,
    },
}

fn pair(a: Option<usize>, b: Option<usize>, qubits: &[usize]) -> Option<(usize, usize)> {
    a.zip(b).or(match qubits {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    })
}

impl GateOp {
    /// Reads one entry of the service's gate sequence. Entries with an
    /// unrecognised mnemonic, or missing the wires their kind needs, become
    /// [`GateOp::Unknown`].
    pub fn from_backend(gate: &BackendGate) -> Self {
        let name = gate.gate.trim().to_ascii_uppercase();
        let first = gate.qubits.first().copied();

        let op = if let Some(kind) = SingleKind::from_mnemonic(&name) {
            first.map(|target| GateOp::Single { kind, target })
        } else if let Some(kind) = RotationKind::from_mnemonic(&name) {
            first.map(|target| GateOp::Rotation {
                kind,
                target,
                angle: gate.angle,
            })
        } else if let Some(kind) = PairKind::from_mnemonic(&name) {
            pair(gate.control, gate.target, &gate.qubits)
                .map(|(control, target)| GateOp::Controlled { kind, control, target })
        } else {
            match name.as_str() {
                "SWAP" => pair(gate.q1, gate.q2, &gate.qubits).map(|(a, b)| GateOp::Swap { a, b }),
                "CCNOT" | "TOFFOLI" => match (gate.control1, gate.control2, gate.target) {
                    (Some(c1), Some(c2), Some(target)) => Some(GateOp::Toffoli {
                        controls: [c1, c2],
                        target,
                    }),
                    _ => match gate.qubits.as_slice() {
                        [c1, c2, target, ..] => Some(GateOp::Toffoli {
                            controls: [*c1, *c2],
                            target: *target,
                        }),
                        _ => None,
                    },
                },
                "MEASURE" => gate.qubit.or(first).map(|qubit| GateOp::Measure {
                    qubit,
                    clbit: gate.clbit.unwrap_or(qubit),
                }),
                _ => None,
            }
        };

        op.unwrap_or_else(|| {
            warn!(gate = %gate.gate, step = gate.step, "unrecognised or incomplete gate entry");
            GateOp::Unknown {
                name: gate.gate.clone(),
            }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            GateOp::Single { kind, .. } => kind.mnemonic(),
            GateOp::Rotation { kind, .. } => kind.mnemonic(),
            GateOp::Controlled { kind, .. } => kind.mnemonic(),
            GateOp::Swap { .. } => "SWAP",
            GateOp::Toffoli { .. } => "CCNOT",
            GateOp::Measure { .. } => "MEASURE",
            GateOp::Unknown { name } => name,
        }
    }

    /// Quantum wires touched by this operation.
    pub fn wires(&self) -> Vec<usize> {
        match self {
            GateOp::Single { target, .. } | GateOp::Rotation { target, .. } => vec![*target],
            GateOp::Controlled { control, target, .. } => vec![*control, *target],
            GateOp::Swap { a, b } => vec![*a, *b],
            GateOp::Toffoli { controls, target } => vec![controls[0], controls[1], *target],
            GateOp::Measure { qubit, .. } => vec![*qubit],
            GateOp::Unknown { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub qubits: QubitCount,
    pub gates: Vec<GateOp>,
}

impl Circuit {
    pub fn new(qubits: QubitCount) -> Self {
        Self {
            qubits,
            gates: Vec::new(),
        }
    }

    pub fn add_gate(&mut self, gate: GateOp) {
        self.gates.push(gate);
    }

    /// Converts the service's gate sequence. Entries that cannot be drawn are
    /// dropped here, so they take no column.
    pub fn from_backend_gates(qubits: QubitCount, gates: &[BackendGate]) -> Self {
        Self {
            qubits,
            gates: gates
                .iter()
                .map(GateOp::from_backend)
                .filter(|op| !matches!(op, GateOp::Unknown { .. }))
                .collect(),
        }
    }

    /// The circuit the service reports, on the qubit count it achieved.
    pub fn from_response(response: &SynthesisResponse) -> Result<Self, StateError> {
        let qubits = QubitCount::new(response.num_qubits)?;
        Ok(Self::from_backend_gates(qubits, &response.gate_sequence))
    }

    pub fn layout(&self) -> CircuitDiagram {
        layout(self.qubits, &self.gates)
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WireKind {
    Quantum,
    Classical,
}

/// A horizontal register line spanning the canvas, with its left-margin label.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub kind: WireKind,
    pub index: usize,
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
}

/// Visual building blocks of a column. Boxes carry their top-left corner.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Primitive {
    GateBox {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: String,
        tooltip: Option<String>,
    },
    ControlDot {
        cx: f64,
        cy: f64,
        r: f64,
        tooltip: Option<String>,
    },
    TargetRing {
        cx: f64,
        cy: f64,
        r: f64,
        tooltip: Option<String>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    IdentityBox {
        wire: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CircuitColumn {
    pub slot: usize,
    pub x: f64,
    pub gate: String,
    pub primitives: Vec<Primitive>,
}

impl CircuitColumn {
    /// Wires that received an identity filler in this column.
    pub fn filler_wires(&self) -> Vec<usize> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::IdentityBox { wire, .. } => Some(*wire),
                _ => None,
            })
            .collect()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CircuitDiagram {
    pub num_qubits: usize,
    pub width: f64,
    pub height: f64,
    pub wires: Vec<Wire>,
    pub columns: Vec<CircuitColumn>,
}

fn quantum_y(wire: usize) -> f64 {
    WIRE_TOP + wire as f64 * QUANTUM_PITCH
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Primitive {
    Primitive::Line { x1, y1, x2, y2 }
}

fn gate_box(x: f64, wire: usize, label: String, tooltip: &str) -> Primitive {
    let y = quantum_y(wire);
    Primitive::GateBox {
        x: x - GATE_SIZE / 2.0,
        y: y - GATE_SIZE / 2.0,
        width: GATE_SIZE,
        height: GATE_SIZE,
        label,
        tooltip: Some(tooltip.to_string()),
    }
}

fn control_dot(x: f64, wire: usize, tooltip: &str) -> Primitive {
    Primitive::ControlDot {
        cx: x,
        cy: quantum_y(wire),
        r: DOT_RADIUS,
        tooltip: Some(tooltip.to_string()),
    }
}

/// Ring plus the cross drawn inside it.
fn target_marker(x: f64, wire: usize, tooltip: &str) -> [Primitive; 3] {
    let y = quantum_y(wire);
    [
        Primitive::TargetRing {
            cx: x,
            cy: y,
            r: RING_RADIUS,
            tooltip: Some(tooltip.to_string()),
        },
        line(x - CROSS_HALF, y, x + CROSS_HALF, y),
        line(x, y - CROSS_HALF, x, y + CROSS_HALF),
    ]
}

fn swap_cross(x: f64, wire: usize) -> [Primitive; 2] {
    let y = quantum_y(wire);
    [
        line(x - CROSS_HALF, y - CROSS_HALF, x + CROSS_HALF, y + CROSS_HALF),
        line(x - CROSS_HALF, y + CROSS_HALF, x + CROSS_HALF, y - CROSS_HALF),
    ]
}

fn rotation_label(kind: RotationKind, angle: Option<f64>) -> String {
    match angle {
        Some(theta) => format!("{}({:.1}°)", kind.mnemonic(), theta * 180.0 / PI),
        None => kind.mnemonic().to_string(),
    }
}

fn gate_primitives(x: f64, gate: &GateOp) -> Vec<Primitive> {
    let mut out = Vec::new();
    match gate {
        GateOp::Single { kind, target } => {
            out.push(gate_box(x, *target, kind.mnemonic().to_string(), kind.mnemonic()));
        }
        GateOp::Rotation {
            kind,
            target,
            angle,
        } => {
            out.push(gate_box(x, *target, rotation_label(*kind, *angle), kind.mnemonic()));
        }
        GateOp::Controlled {
            kind: PairKind::Cnot,
            control,
            target,
        } => {
            out.push(control_dot(x, *control, "CNOT control"));
            let [ring, cross_h, cross_v] = target_marker(x, *target, "CNOT gate");
            out.push(ring);
            out.push(line(x, quantum_y(*control), x, quantum_y(*target)));
            out.push(cross_h);
            out.push(cross_v);
        }
        GateOp::Controlled {
            kind: PairKind::Cz,
            control,
            target,
        } => {
            out.push(control_dot(x, *control, "CZ control"));
            out.push(control_dot(x, *target, "CZ target"));
            out.push(line(x, quantum_y(*control), x, quantum_y(*target)));
        }
        GateOp::Swap { a, b } => {
            out.extend(swap_cross(x, *a));
            out.extend(swap_cross(x, *b));
            out.push(line(x, quantum_y(*a), x, quantum_y(*b)));
        }
        GateOp::Toffoli { controls, target } => {
            out.push(control_dot(x, controls[0], "CCNOT control"));
            out.push(control_dot(x, controls[1], "CCNOT control"));
            let top = quantum_y(controls[0]).min(quantum_y(controls[1]));
            out.push(line(x, top, x, quantum_y(*target)));
            out.extend(target_marker(x, *target, "CCNOT gate"));
        }
        GateOp::Measure { .. } => {}
        GateOp::Unknown { name } => {
            warn!(gate = %name, "skipping gate kind without a drawing");
        }
    }
    out
}

/// Lays `gates` out one column each, left to right, over `qubits`
/// quantum wires and as many classical wires.
///
/// Idle wires of every column get a small `I` box, except in measurement
/// columns. An unknown gate placed here directly draws nothing.
pub fn layout(qubits: QubitCount, gates: &[GateOp]) -> CircuitDiagram {
    let num_qubits = qubits.get();
    let num_classical = num_qubits;
    let width = COLUMN_PITCH * (gates.len() + 1) as f64;
    let height =
        num_qubits as f64 * QUANTUM_PITCH + num_classical as f64 * CLASSICAL_PITCH + 60.0;

    let mut wires = Vec::with_capacity(num_qubits + num_classical);
    for q in 0..num_qubits {
        let y = quantum_y(q);
        wires.push(Wire {
            kind: WireKind::Quantum,
            index: q,
            y,
            x1: WIRE_MARGIN,
            x2: width - WIRE_MARGIN,
            label: format!("q{}", q),
            label_x: 0.0,
            label_y: y + 5.0,
        });
    }
    let classical_top = num_qubits as f64 * QUANTUM_PITCH + 50.0;
    for c in 0..num_classical {
        let y = classical_top + c as f64 * CLASSICAL_PITCH;
        wires.push(Wire {
            kind: WireKind::Classical,
            index: c,
            y,
            x1: WIRE_MARGIN,
            x2: width - WIRE_MARGIN,
            label: format!("cr[{}]", c),
            label_x: 0.0,
            label_y: y + 5.0,
        });
    }

    let columns = gates
        .iter()
        .enumerate()
        .map(|(slot, gate)| {
            let x = FIRST_COLUMN_X + slot as f64 * COLUMN_PITCH;
            let mut primitives = gate_primitives(x, gate);

            if !matches!(gate, GateOp::Measure { .. } | GateOp::Unknown { .. }) {
                let involved = gate.wires();
                for q in (0..num_qubits).filter(|q| !involved.contains(q)) {
                    let y = quantum_y(q);
                    primitives.push(Primitive::IdentityBox {
                        wire: q,
                        x: x - FILLER_SIZE / 2.0,
                        y: y - FILLER_SIZE / 2.0,
                        width: FILLER_SIZE,
                        height: FILLER_SIZE,
                    });
                }
            }

            CircuitColumn {
                slot,
                x,
                gate: gate.name().to_string(),
                primitives,
            }
        })
        .collect();

    CircuitDiagram {
        num_qubits,
        width,
        height,
        wires,
        columns,
    }
}

/// Human-readable listing of the service's gate sequence, one step per line.
pub fn describe_steps(gates: &[BackendGate]) -> String {
    if gates.is_empty() {
        return "⚠ No gates returned by backend.".to_string();
    }

    fn wire(q: Option<usize>) -> String {
        q.map_or_else(|| "?".to_string(), |q| q.to_string())
    }

    let mut out = String::new();
    for step in gates {
        let qubits = step
            .qubits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let line = match step.gate.as_str() {
            "CNOT" => format!(
                "{}. Apply CNOT (control q{} → target q{})",
                step.step,
                wire(step.control),
                wire(step.target)
            ),
            "RX" | "RY" | "RZ" => {
                let angle = step
                    .angle
                    .map_or_else(|| "?".to_string(), |a| format!("{:.6}", a));
                format!("{}. Apply {}({}) on qubits {}", step.step, step.gate, angle, qubits)
            }
            other => format!("{}. Apply {} on qubits {}", step.step, other, qubits),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: usize) -> QubitCount {
        QubitCount::new(n).unwrap()
    }

    fn backend(gate: &str) -> BackendGate {
        BackendGate {
            gate: gate.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn canvas_geometry() {
        let d = layout(q(3), &[GateOp::Single { kind: SingleKind::H, target: 0 }]);
        assert_eq!(d.width, 240.0);
        assert_eq!(d.height, 3.0 * 60.0 + 3.0 * 40.0 + 60.0);
        assert_eq!(d.wires.len(), 6);
        assert_eq!(d.wires[1].y, 90.0);
        assert_eq!(d.wires[3].label, "cr[0]");
        assert_eq!(d.wires[3].y, 230.0);
        assert_eq!(d.wires[0].x2, 220.0);
    }

    #[test]
    fn single_gate_box_is_centred_on_its_wire() {
        let d = layout(q(2), &[GateOp::Single { kind: SingleKind::X, target: 1 }]);
        let col = &d.columns[0];
        assert_eq!(col.x, 100.0);
        assert_eq!(
            col.primitives[0],
            Primitive::GateBox {
                x: 75.0,
                y: 65.0,
                width: 50.0,
                height: 50.0,
                label: "X".to_string(),
                tooltip: Some("X".to_string()),
            }
        );
        assert_eq!(col.filler_wires(), vec![0]);
    }

    #[test]
    fn rotation_label_shows_degrees() {
        let gates = [
            GateOp::Rotation { kind: RotationKind::Ry, target: 0, angle: Some(PI / 2.0) },
            GateOp::Rotation { kind: RotationKind::Rz, target: 0, angle: None },
        ];
        let d = layout(q(1), &gates);
        let label = |col: &CircuitColumn| match &col.primitives[0] {
            Primitive::GateBox { label, .. } => label.clone(),
            other => panic!("expected a gate box, got {:?}", other),
        };
        assert_eq!(label(&d.columns[0]), "RY(90.0°)");
        assert_eq!(label(&d.columns[1]), "RZ");
        assert_eq!(d.columns[1].x, 220.0);
    }

    #[test]
    fn cnot_draws_dot_ring_and_cross() {
        let d = layout(
            q(3),
            &[GateOp::Controlled { kind: PairKind::Cnot, control: 0, target: 2 }],
        );
        let prims = &d.columns[0].primitives;
        assert!(prims.iter().any(|p| matches!(
            p,
            Primitive::ControlDot { cy, .. } if *cy == 30.0
        )));
        assert!(prims.iter().any(|p| matches!(
            p,
            Primitive::TargetRing { cy, r, .. } if *cy == 150.0 && *r == RING_RADIUS
        )));
        assert!(prims.contains(&Primitive::Line { x1: 100.0, y1: 30.0, x2: 100.0, y2: 150.0 }));
        assert!(prims.contains(&Primitive::Line { x1: 90.0, y1: 150.0, x2: 110.0, y2: 150.0 }));
        assert_eq!(d.columns[0].filler_wires(), vec![1]);
    }

    #[test]
    fn cz_has_two_dots_and_no_ring() {
        let d = layout(q(2), &[GateOp::Controlled { kind: PairKind::Cz, control: 1, target: 0 }]);
        let prims = &d.columns[0].primitives;
        let dots = prims.iter().filter(|p| matches!(p, Primitive::ControlDot { .. })).count();
        assert_eq!(dots, 2);
        assert!(!prims.iter().any(|p| matches!(p, Primitive::TargetRing { .. })));
    }

    #[test]
    fn swap_draws_two_crosses_and_a_connector() {
        let d = layout(q(3), &[GateOp::Swap { a: 0, b: 2 }]);
        let prims = &d.columns[0].primitives;
        let expected = [
            // X on q0
            Primitive::Line { x1: 90.0, y1: 20.0, x2: 110.0, y2: 40.0 },
            Primitive::Line { x1: 90.0, y1: 40.0, x2: 110.0, y2: 20.0 },
            // X on q2
            Primitive::Line { x1: 90.0, y1: 140.0, x2: 110.0, y2: 160.0 },
            Primitive::Line { x1: 90.0, y1: 160.0, x2: 110.0, y2: 140.0 },
            Primitive::Line { x1: 100.0, y1: 30.0, x2: 100.0, y2: 150.0 },
        ];
        assert_eq!(&prims[..5], &expected);
        assert_eq!(d.columns[0].filler_wires(), vec![1]);
    }

    #[test]
    fn toffoli_connector_runs_from_topmost_control() {
        let d = layout(q(4), &[GateOp::Toffoli { controls: [2, 1], target: 3 }]);
        let prims = &d.columns[0].primitives;
        assert!(prims.contains(&Primitive::Line { x1: 100.0, y1: 90.0, x2: 100.0, y2: 210.0 }));
        assert_eq!(
            prims.iter().filter(|p| matches!(p, Primitive::ControlDot { .. })).count(),
            2
        );
        assert_eq!(d.columns[0].filler_wires(), vec![0]);
    }

    #[test]
    fn measurement_columns_get_no_filler() {
        let d = layout(q(3), &[GateOp::Measure { qubit: 0, clbit: 0 }]);
        assert!(d.columns[0].primitives.is_empty());
    }

    #[test]
    fn unknown_gate_draws_nothing_in_layout() {
        let gates = [
            GateOp::Unknown { name: "U3".to_string() },
            GateOp::Single { kind: SingleKind::H, target: 0 },
        ];
        let d = layout(q(2), &gates);
        assert!(d.columns[0].primitives.is_empty());
    }

    #[test]
    fn unknown_backend_gates_take_no_column() {
        let u3 = backend("U3");
        let mut h = backend("H");
        h.qubits = vec![0];
        let d = Circuit::from_backend_gates(q(2), &[u3, backend("CNOT"), h]).layout();
        assert_eq!(d.width, 240.0);
        assert_eq!(d.columns.len(), 1);
        assert_eq!(d.columns[0].gate, "H");
        assert_eq!(d.columns[0].x, 100.0);
    }

    #[test]
    fn backend_gates_convert_by_kind() {
        let mut h = backend("H");
        h.qubits = vec![1];
        assert_eq!(GateOp::from_backend(&h), GateOp::Single { kind: SingleKind::H, target: 1 });

        let mut rx = backend("RX");
        rx.qubits = vec![0];
        rx.angle = Some(0.5);
        assert_eq!(
            GateOp::from_backend(&rx),
            GateOp::Rotation { kind: RotationKind::Rx, target: 0, angle: Some(0.5) }
        );

        let mut cnot = backend("CNOT");
        cnot.control = Some(0);
        cnot.target = Some(1);
        assert_eq!(
            GateOp::from_backend(&cnot),
            GateOp::Controlled { kind: PairKind::Cnot, control: 0, target: 1 }
        );

        let mut ccnot = backend("CCNOT");
        ccnot.control1 = Some(0);
        ccnot.control2 = Some(1);
        ccnot.target = Some(2);
        assert_eq!(
            GateOp::from_backend(&ccnot),
            GateOp::Toffoli { controls: [0, 1], target: 2 }
        );

        let mut swap = backend("SWAP");
        swap.q1 = Some(1);
        swap.q2 = Some(0);
        assert_eq!(GateOp::from_backend(&swap), GateOp::Swap { a: 1, b: 0 });

        let mut measure = backend("MEASURE");
        measure.qubit = Some(2);
        measure.clbit = Some(2);
        assert_eq!(GateOp::from_backend(&measure), GateOp::Measure { qubit: 2, clbit: 2 });
    }

    #[test]
    fn malformed_or_unknown_backend_gates_become_unknown() {
        assert_eq!(
            GateOp::from_backend(&backend("U3")),
            GateOp::Unknown { name: "U3".to_string() }
        );
        // a CNOT without wires cannot be placed
        assert!(matches!(GateOp::from_backend(&backend("CNOT")), GateOp::Unknown { .. }));
    }

    #[test]
    fn describe_steps_formats_each_kind() {
        let mut ry = backend("RY");
        ry.step = 1;
        ry.qubits = vec![0];
        ry.angle = Some(1.5707963);
        let mut cnot = backend("CNOT");
        cnot.step = 2;
        cnot.control = Some(0);
        cnot.target = Some(1);
        let mut h = backend("H");
        h.step = 3;
        h.qubits = vec![1];

        let text = describe_steps(&[ry, cnot, h]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "1. Apply RY(1.570796) on qubits 0");
        assert_eq!(lines[1], "2. Apply CNOT (control q0 → target q1)");
        assert_eq!(lines[2], "3. Apply H on qubits 1");
        assert_eq!(describe_steps(&[]), "⚠ No gates returned by backend.");
    }

    #[test]
    fn circuit_from_response_uses_achieved_width() {
        let mut x = backend("X");
        x.qubits = vec![0];
        let mut response = SynthesisResponse {
            num_qubits: 2,
            gate_sequence: vec![x],
            counts: Default::default(),
        };
        let circuit = Circuit::from_response(&response).unwrap();
        assert_eq!(circuit.qubits.get(), 2);
        assert_eq!(circuit.layout().columns[0].filler_wires(), vec![1]);

        for bad in [0, 40] {
            response.num_qubits = bad;
            assert_eq!(
                Circuit::from_response(&response),
                Err(StateError::InvalidQubitCount(bad.to_string()))
            );
        }
    }
}
