use crate::theme::Theme;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TITLE: &str = "Measurement Results";
pub const X_TITLE: &str = "Bitstring Outcome";
pub const Y_TITLE: &str = "Counts";
pub const DATASET_LABEL: &str = "Measurement Counts";

/// Everything a chart needs to draw measurement counts, already themed.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistogramModel {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub dataset_label: String,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub bar_background: String,
    pub bar_border: String,
    pub text_color: String,
    pub grid_color: String,
}

impl HistogramModel {
    pub fn new(counts: &BTreeMap<String, u64>, theme: Theme) -> Self {
        let mut model = Self {
            labels: counts.keys().cloned().collect(),
            values: counts.values().copied().collect(),
            dataset_label: DATASET_LABEL.to_string(),
            title: TITLE.to_string(),
            x_title: X_TITLE.to_string(),
            y_title: Y_TITLE.to_string(),
            bar_background: String::new(),
            bar_border: String::new(),
            text_color: String::new(),
            grid_color: String::new(),
        };
        model.apply_theme(theme);
        model
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.bar_background = theme.bar_background().to_string();
        self.bar_border = theme.bar_border().to_string();
        self.text_color = theme.chart_text().to_string();
        self.grid_color = theme.chart_grid().to_string();
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// Something that can put a histogram on screen.
pub trait HistogramRenderer {
    type Error;

    fn draw(&mut self, model: &HistogramModel) -> Result<(), Self::Error>;
}

/// An initialized chart. Owned by whoever drives the views; updates replace
/// the data in place instead of building a new chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    model: HistogramModel,
    theme: Theme,
    revision: u64,
}

impl Histogram {
    pub fn init(counts: &BTreeMap<String, u64>, theme: Theme) -> Self {
        Self {
            model: HistogramModel::new(counts, theme),
            theme,
            revision: 0,
        }
    }

    pub fn update(&mut self, counts: &BTreeMap<String, u64>) {
        self.model.labels = counts.keys().cloned().collect();
        self.model.values = counts.values().copied().collect();
        self.revision += 1;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.model.apply_theme(theme);
            self.revision += 1;
        }
    }

    pub fn model(&self) -> &HistogramModel {
        &self.model
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Number of redraws since `init`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn render<R: HistogramRenderer>(&self, renderer: &mut R) -> Result<(), R::Error> {
        renderer.draw(&self.model)
    }
}

/// Redraws `slot` with `counts`, creating the chart on first use.
pub fn draw_histogram<'a>(
    slot: &'a mut Option<Histogram>,
    counts: &BTreeMap<String, u64>,
    theme: Theme,
) -> &'a Histogram {
    if let Some(chart) = slot.as_mut() {
        chart.update(counts);
        chart.set_theme(theme);
    }
    slot.get_or_insert_with(|| Histogram::init(counts, theme))
}

/// Horizontal bars of `#`, scaled so the largest count spans `width` columns.
pub fn render_text(model: &HistogramModel, width: usize) -> String {
    let max = model.values.iter().copied().max().unwrap_or(0);
    let label_width = model.labels.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut out = format!("{}\n", model.title);
    for (label, &value) in model.labels.iter().zip(&model.values) {
        let bar = if max == 0 {
            0
        } else {
            ((value as f64 / max as f64) * width as f64).round() as usize
        };
        out.push_str(&format!(
            "{:>lw$} | {} {}\n",
            label,
            "#".repeat(bar),
            value,
            lw = label_width
        ));
    }
    out
}
