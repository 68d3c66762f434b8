use serde::{Deserialize, Serialize};

/// Light/dark color scheme shared by the circuit diagram and the histogram.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Semantic paint slots used by diagram primitives.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Paint {
    Stroke,
    Text,
    GateFill,
    RingFill,
    FillerFill,
    ClassicalWire,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn color(self, paint: Paint) -> &'static str {
        match (self, paint) {
            (Theme::Light, Paint::Stroke) => "#000000",
            (Theme::Dark, Paint::Stroke) => "#24496dff",
            (Theme::Light, Paint::Text) => "#000000",
            (Theme::Dark, Paint::Text) => "#234363ff",
            (Theme::Light, Paint::GateFill) => "#3c745bff",
            (Theme::Dark, Paint::GateFill) => "#d0d9e9ff",
            (Theme::Light, Paint::RingFill) => "white",
            (Theme::Dark, Paint::RingFill) => "#1e293b",
            (Theme::Light, Paint::FillerFill) => "#f0f0f0",
            (Theme::Dark, Paint::FillerFill) => "#374151",
            (_, Paint::ClassicalWire) => "blue",
        }
    }

    // histogram palette

    pub fn bar_background(self) -> &'static str {
        match self {
            Theme::Light => "rgba(54, 162, 235, 0.7)",
            Theme::Dark => "rgba(59, 130, 246, 0.7)",
        }
    }

    pub fn bar_border(self) -> &'static str {
        match self {
            Theme::Light => "rgba(54, 162, 235, 1)",
            Theme::Dark => "rgba(59, 130, 246, 1)",
        }
    }

    pub fn chart_text(self) -> &'static str {
        match self {
            Theme::Light => "#1e293b",
            Theme::Dark => "#f1f5f9",
        }
    }

    pub fn chart_grid(self) -> &'static str {
        match self {
            Theme::Light => "rgba(0, 0, 0, 0.1)",
            Theme::Dark => "rgba(255, 255, 255, 0.1)",
        }
    }
}
