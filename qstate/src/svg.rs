use crate::circuit::{CircuitDiagram, Primitive, WireKind};
use crate::theme::{Paint, Theme};
use std::fmt::{self, Write};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn title(out: &mut String, tooltip: &Option<String>) -> fmt::Result {
    if let Some(tip) = tooltip {
        write!(out, "<title>{}</title>", escape(tip))?;
    }
    Ok(())
}

fn centred_text(out: &mut String, x: f64, y: f64, size: u32, fill: &str, text: &str) -> fmt::Result {
    writeln!(
        out,
        r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="middle" font-size="{size}" fill="{fill}">{}</text>"#,
        escape(text)
    )
}

fn primitive(out: &mut String, p: &Primitive, theme: Theme) -> fmt::Result {
    let stroke = theme.color(Paint::Stroke);
    let text = theme.color(Paint::Text);
    match p {
        Primitive::GateBox {
            x,
            y,
            width,
            height,
            label,
            tooltip,
        } => {
            write!(
                out,
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" stroke="{stroke}">"#,
                theme.color(Paint::GateFill)
            )?;
            title(out, tooltip)?;
            writeln!(out, "</rect>")?;
            centred_text(out, x + width / 2.0, y + height / 2.0, 14, text, label)
        }
        Primitive::ControlDot { cx, cy, r, tooltip } => {
            write!(out, r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{stroke}">"#)?;
            title(out, tooltip)?;
            writeln!(out, "</circle>")
        }
        Primitive::TargetRing { cx, cy, r, tooltip } => {
            write!(
                out,
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" stroke="{stroke}" fill="{}">"#,
                theme.color(Paint::RingFill)
            )?;
            title(out, tooltip)?;
            writeln!(out, "</circle>")
        }
        Primitive::Line { x1, y1, x2, y2 } => writeln!(
            out,
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{stroke}" stroke-width="2"/>"#
        ),
        Primitive::IdentityBox {
            x, y, width, height, ..
        } => {
            writeln!(
                out,
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" stroke="{stroke}"/>"#,
                theme.color(Paint::FillerFill)
            )?;
            centred_text(out, x + width / 2.0, y + height / 2.0, 12, text, "I")
        }
    }
}

fn write_svg(out: &mut String, diagram: &CircuitDiagram, theme: Theme) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = diagram.width,
        h = diagram.height
    )?;

    for wire in &diagram.wires {
        let color = match wire.kind {
            WireKind::Quantum => theme.color(Paint::Stroke),
            WireKind::Classical => theme.color(Paint::ClassicalWire),
        };
        writeln!(
            out,
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{color}" stroke-width="2"/>"#,
            wire.x1,
            wire.x2,
            y = wire.y
        )?;
        writeln!(
            out,
            r#"<text x="{}" y="{}" fill="{}">{}</text>"#,
            wire.label_x,
            wire.label_y,
            theme.color(Paint::Text),
            escape(&wire.label)
        )?;
    }

    for column in &diagram.columns {
        for p in &column.primitives {
            primitive(out, p, theme)?;
        }
    }

    writeln!(out, "</svg>")
}

/// Serializes a laid-out circuit as a standalone SVG document.
pub fn render_circuit_svg(diagram: &CircuitDiagram, theme: Theme) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_svg(&mut out, diagram, theme);
    out
}
