//! Q-sphere embedding of an n-qubit state.
//!
//! Every basis state `i` sits on the unit sphere at polar angle
//! `θ = (popcount(i) / n)·π` and azimuth `φ = 2π·i / 2^n`, so states with the
//! same Hamming weight share a latitude. The amplitude's probability sets the
//! thickness of the spike and the size of its tip, its phase sets the hue.
//!
//! The embedding only builds geometry; drawing is left to a [`SphereRenderer`].

use crate::state::StateVector;
use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Points per latitude ring (the ring is closed, so `RING_POINTS + 1` are emitted).
pub const RING_POINTS: usize = 60;
/// Angular resolution of the reference sphere mesh along θ and φ.
pub const MESH_STEPS: usize = 30;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpherePoint {
    pub index: usize,
    pub bits: String,
    pub hamming_weight: u32,
    pub theta: f64,
    pub phi: f64,
    pub position: [f64; 3],
    pub probability: f64,
    pub phase: f64,
    /// Phase mapped to `[0, 360)` degrees.
    pub hue: f64,
}

/// Line from the sphere centre to a basis-state point.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spike {
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

/// Marker drawn at the end of a spike.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub position: [f64; 3],
    pub size: f64,
    pub color: String,
    pub hover: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatitudeRing {
    /// Hamming weight this ring belongs to.
    pub band: usize,
    pub theta: f64,
    pub points: Vec<[f64; 3]>,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

/// Faint reference sphere, as row-major grids of coordinates.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceMesh {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
    pub opacity: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub position: [f64; 3],
    pub text: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SphereScene {
    pub num_qubits: usize,
    pub points: Vec<SpherePoint>,
    pub surface: SurfaceMesh,
    pub latitudes: Vec<LatitudeRing>,
    pub spikes: Vec<Spike>,
    pub tips: Vec<Tip>,
    pub labels: Vec<Label>,
}

/// Anything that can display a scene on a named surface. Each call replaces
/// whatever the surface showed before.
pub trait SphereRenderer {
    type Error;

    fn draw(&mut self, target: &str, scene: &SphereScene) -> Result<(), Self::Error>;
}

fn on_sphere(theta: f64, phi: f64) -> [f64; 3] {
    [theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()]
}

/// Phase in radians to a hue in degrees.
pub fn hue(phase: f64) -> f64 {
    (phase * 180.0 / PI + 360.0) % 360.0
}

/// Places basis state `index` of an `num_qubits`-qubit register.
pub fn sphere_point(index: usize, num_qubits: usize, amplitude: Complex64) -> SpherePoint {
    let dimension = 1usize << num_qubits;
    let hamming_weight = index.count_ones();
    let theta = if num_qubits == 0 {
        0.0
    } else {
        (hamming_weight as f64 / num_qubits as f64) * PI
    };
    let phi = 2.0 * PI * index as f64 / dimension as f64;
    let probability = amplitude.re * amplitude.re + amplitude.im * amplitude.im;
    let phase = amplitude.im.atan2(amplitude.re);

    SpherePoint {
        index,
        bits: format!("{:0width$b}", index, width = num_qubits),
        hamming_weight,
        theta,
        phi,
        position: on_sphere(theta, phi),
        probability,
        phase,
        hue: hue(phase),
    }
}

fn latitude_rings(num_qubits: usize) -> Vec<LatitudeRing> {
    (0..=num_qubits)
        .map(|band| {
            let theta = if num_qubits == 0 {
                0.0
            } else {
                (band as f64 / num_qubits as f64) * PI
            };
            let points = (0..=RING_POINTS)
                .map(|p| on_sphere(theta, (p as f64 / RING_POINTS as f64) * 2.0 * PI))
                .collect();
            LatitudeRing {
                band,
                theta,
                points,
                color: "gray".to_string(),
                width: 1.0,
                opacity: 0.2,
            }
        })
        .collect()
}

fn surface_mesh() -> SurfaceMesh {
    let (mut xs, mut ys, mut zs) = (Vec::new(), Vec::new(), Vec::new());
    for i in 0..=MESH_STEPS {
        let theta = PI * i as f64 / MESH_STEPS as f64;
        let (mut row_x, mut row_y, mut row_z) = (Vec::new(), Vec::new(), Vec::new());
        for j in 0..=MESH_STEPS {
            let [x, y, z] = on_sphere(theta, 2.0 * PI * j as f64 / MESH_STEPS as f64);
            row_x.push(x);
            row_y.push(y);
            row_z.push(z);
        }
        xs.push(row_x);
        ys.push(row_y);
        zs.push(row_z);
    }
    SurfaceMesh {
        x: xs,
        y: ys,
        z: zs,
        opacity: 0.2,
    }
}

/// Builds the full scene for a vector of `2^n` amplitudes.
///
/// The length must be a power of two; `n` is taken as `log2(len)`.
pub fn embed(amplitudes: &[Complex64]) -> SphereScene {
    let num_qubits = amplitudes.len().trailing_zeros() as usize;

    let points: Vec<SpherePoint> = amplitudes
        .iter()
        .enumerate()
        .map(|(i, amp)| sphere_point(i, num_qubits, *amp))
        .collect();

    let spikes = points
        .iter()
        .map(|p| Spike {
            from: [0.0, 0.0, 0.0],
            to: p.position,
            color: format!("hsl({}, 80%, 50%)", p.hue),
            width: 1.0 + 8.0 * p.probability,
            opacity: 0.8,
        })
        .collect();

    let tips = points
        .iter()
        .zip(amplitudes)
        .map(|(p, amp)| Tip {
            position: p.position,
            size: 5.0 + 20.0 * p.probability,
            color: format!("hsl({}, 80%, 40%)", p.hue),
            hover: format!(
                "|{}⟩<br>amp={:.2} + {:.2}i<br>P={:.2}<br>phase={:.2}",
                p.bits, amp.re, amp.im, p.probability, p.phase
            ),
        })
        .collect();

    let labels = points
        .iter()
        .map(|p| Label {
            position: p.position,
            text: format!("|{}⟩", p.bits),
        })
        .collect();

    SphereScene {
        num_qubits,
        points,
        surface: surface_mesh(),
        latitudes: latitude_rings(num_qubits),
        spikes,
        tips,
        labels,
    }
}

/// Coerces the vector to complex form (literals count as zero) and embeds it.
pub fn embed_state(state: &StateVector) -> SphereScene {
    embed(&state.to_complex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn point_angles_follow_hamming_weight_and_index() {
        let p = sphere_point(1, 2, Complex64::new(1.0, 0.0));
        assert_eq!(p.bits, "01");
        assert_eq!(p.hamming_weight, 1);
        assert!(approx_eq(p.theta.to_degrees(), 90.0));
        assert!(approx_eq(p.phi.to_degrees(), 90.0));
    }

    #[test]
    fn all_zero_and_all_one_sit_on_the_poles() {
        let north = sphere_point(0, 3, Complex64::new(1.0, 0.0));
        let south = sphere_point(7, 3, Complex64::new(1.0, 0.0));
        assert!(approx_eq(north.position[2], 1.0));
        assert!(approx_eq(south.position[2], -1.0));
    }

    #[test]
    fn negative_real_amplitude_has_hue_180() {
        let p = sphere_point(0, 1, Complex64::new(-1.0, 0.0));
        assert!(approx_eq(p.phase, PI));
        assert!(approx_eq(p.hue, 180.0));
        assert!(approx_eq(p.probability, 1.0));
    }

    #[test]
    fn negative_imaginary_phase_wraps_into_range() {
        assert!(approx_eq(hue(-PI / 2.0), 270.0));
        assert!(approx_eq(hue(0.0), 0.0));
    }

    #[test]
    fn spike_and_tip_scale_with_probability() {
        let amps = [
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, FRAC_1_SQRT_2),
        ];
        let scene = embed(&amps);
        assert_eq!(scene.num_qubits, 1);
        assert!(approx_eq(scene.spikes[0].width, 5.0));
        assert!(approx_eq(scene.tips[0].size, 15.0));
        assert_eq!(scene.spikes[0].color, "hsl(0, 80%, 50%)");
        assert_eq!(scene.tips[0].color, "hsl(0, 80%, 40%)");
        assert_eq!(scene.tips[1].color, "hsl(90, 80%, 40%)");
    }

    #[test]
    fn zero_amplitude_gets_base_geometry() {
        let scene = embed(&[Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]);
        assert!(approx_eq(scene.spikes[1].width, 1.0));
        assert!(approx_eq(scene.tips[1].size, 5.0));
        assert!(scene.tips[1].hover.starts_with("|1⟩<br>amp=0.00 + 0.00i"));
    }

    #[test]
    fn one_ring_per_weight_band() {
        let scene = embed(&vec![Complex64::new(0.0, 0.0); 8]);
        assert_eq!(scene.latitudes.len(), 4);
        for ring in &scene.latitudes {
            assert_eq!(ring.points.len(), RING_POINTS + 1);
        }
        assert!(approx_eq(scene.latitudes[3].theta, PI));
    }

    #[test]
    fn mesh_resolution_is_independent_of_width() {
        let small = embed(&[Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]);
        let large = embed(&vec![Complex64::new(0.0, 0.0); 32]);
        assert_eq!(small.surface.x.len(), MESH_STEPS + 1);
        assert_eq!(small.surface, large.surface);
    }

    #[test]
    fn labels_use_bracket_notation() {
        let scene = embed(&vec![Complex64::new(0.5, 0.0); 4]);
        let texts: Vec<_> = scene.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["|00⟩", "|01⟩", "|10⟩", "|11⟩"]);
    }
}
