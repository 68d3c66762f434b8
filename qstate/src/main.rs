use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use qstate::events::{CircuitInfo, ConversionInfo, Event, SamplesInfo, emit_event};
use qstate::histogram::{Histogram, render_text};
use qstate::{
    Circuit, QubitCount, SphereRenderer, SphereScene, Theme, basis_states, convert, describe_steps,
    random_sample, render_circuit_svg, samples,
};
use qstate_types::{BackendGate, SynthesisResponse};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turns wavefunction expressions into state vectors, Q-sphere scenes and circuit diagrams.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a wavefunction and print its state vector.
    Convert {
        #[arg(short, long)]
        qubits: QubitCount,
        /// Read the expression from a file. Without it or EXPR, reads stdin.
        #[arg(short, long, conflicts_with = "expression")]
        input: Option<PathBuf>,
        expression: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Write the Q-sphere scene of the vector to this JSON file.
        #[arg(long)]
        sphere_out: Option<PathBuf>,
    },
    /// Print example wavefunctions for a register width.
    Samples {
        #[arg(short, long)]
        qubits: QubitCount,
        /// Seed for the random normalized sample.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Lay out a gate sequence and write it as SVG.
    Circuit {
        /// Register width for a bare gate array. A service response carries its own.
        #[arg(short, long)]
        qubits: QubitCount,
        /// A service response, or a bare JSON array of gates.
        #[arg(short, long)]
        gates: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        theme: Theme,
        /// Where to write the SVG. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List every basis state of the register.
    Basis {
        #[arg(short, long)]
        qubits: QubitCount,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GatesFile {
    Response(SynthesisResponse),
    Sequence(Vec<BackendGate>),
}

/// Dumps each scene as pretty JSON to the file named by `target`.
struct JsonFileRenderer;

impl SphereRenderer for JsonFileRenderer {
    type Error = io::Error;

    fn draw(&mut self, target: &str, scene: &SphereScene) -> Result<(), Self::Error> {
        let mut writer = BufWriter::new(File::create(target)?);
        serde_json::to_writer_pretty(&mut writer, scene)?;
        writer.flush()
    }
}

fn read_expression(input: Option<PathBuf>, expression: Option<String>) -> anyhow::Result<String> {
    if let Some(expr) = expression {
        return Ok(expr);
    }
    let mut text = String::new();
    match input {
        Some(path) => {
            text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_string(&mut text)?;
        }
    }
    Ok(text)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Convert {
            qubits,
            input,
            expression,
            format,
            sphere_out,
        } => {
            let text = read_expression(input, expression)?;
            let conversion = convert(qubits, &text);

            match format {
                OutputFormat::Text => {
                    writeln!(out, "{}", conversion.vector_text())?;
                    for message in conversion.messages() {
                        eprintln!("{}", message);
                    }
                }
                OutputFormat::Json => {
                    emit_event(&Event::Conversion(ConversionInfo::from(&conversion)), &mut out)?;
                }
            }

            if let Some(path) = sphere_out {
                let target = path.to_string_lossy();
                JsonFileRenderer
                    .draw(&target, &conversion.sphere())
                    .with_context(|| format!("writing sphere scene to {}", target))?;
                info!(path = %target, "wrote sphere scene");
            }
        }
        Command::Samples {
            qubits,
            seed,
            format,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut list = samples(qubits);
            list.push(random_sample(qubits, &mut rng));

            match format {
                OutputFormat::Text => {
                    for sample in &list {
                        writeln!(out, "{}: {}", sample.name, sample.wavefunction)?;
                    }
                }
                OutputFormat::Json => {
                    let event = Event::Samples(SamplesInfo {
                        num_qubits: qubits.get(),
                        samples: list,
                    });
                    emit_event(&event, &mut out)?;
                }
            }
        }
        Command::Circuit {
            qubits,
            gates,
            theme,
            output,
        } => {
            let raw = fs::read_to_string(&gates)
                .with_context(|| format!("reading {}", gates.display()))?;
            let parsed: GatesFile = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a gate sequence", gates.display()))?;

            let (circuit, steps) = match parsed {
                GatesFile::Response(response) => {
                    if !response.counts.is_empty() {
                        let chart = Histogram::init(&response.counts, theme);
                        eprint!("{}", render_text(chart.model(), 40));
                    }
                    let circuit = Circuit::from_response(&response)
                        .with_context(|| format!("{} reports an unusable width", gates.display()))?;
                    (circuit, describe_steps(&response.gate_sequence))
                }
                GatesFile::Sequence(sequence) => (
                    Circuit::from_backend_gates(qubits, &sequence),
                    describe_steps(&sequence),
                ),
            };
            let diagram = circuit.layout();
            let svg = render_circuit_svg(&diagram, theme);

            match output {
                Some(path) => {
                    fs::write(&path, svg)
                        .with_context(|| format!("writing {}", path.display()))?;
                    let event = Event::CircuitRendered(CircuitInfo {
                        num_qubits: diagram.num_qubits,
                        num_gates: diagram.columns.len(),
                        width: diagram.width,
                        height: diagram.height,
                        steps,
                    });
                    emit_event(&event, &mut out)?;
                }
                None => write!(out, "{}", svg)?,
            }
        }
        Command::Basis { qubits } => {
            for bits in basis_states(qubits) {
                writeln!(out, "|{}⟩", bits)?;
            }
        }
    }

    Ok(())
}
