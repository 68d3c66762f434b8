pub mod api;
pub mod circuit;
pub mod facade;
pub mod histogram;
pub mod parser;
pub mod samples;
pub mod sphere;
pub mod state;
pub mod svg;
pub mod theme;

pub mod events;

// Re-export key components for easier access from the binary or other libraries.
pub use api::{Diagnostic, QubitCount, StateError};
pub use circuit::{Circuit, CircuitDiagram, GateOp, describe_steps, layout};
pub use facade::{Conversion, convert, convert_str};
pub use histogram::{Histogram, HistogramModel, HistogramRenderer};
pub use parser::parse_wavefunction;
pub use samples::{Sample, basis_states, random_sample, samples};
pub use sphere::{SphereRenderer, SphereScene, embed, embed_state};
pub use state::{Coefficient, StateVector, build_state_vector};
pub use svg::render_circuit_svg;
pub use theme::Theme;
