use log::{debug, warn};

use crate::color::ColorMap;
use crate::payload::{Payload, Reference, XRange};
use crate::trend::TrendPoint;

// ---------------------------------------------------------------------------
// Chart hydration: embedded payload JSON → render-ready chart model
// ---------------------------------------------------------------------------
//
// Everything here consumes the payload exactly as embedded in the page, so
// the serialized JSON stays the single source of truth for the chart. The
// plotting layer (chart::svg) receives only clamped, display-ready values.

/// Lower bound of the log-scaled y axis. Nothing below it is ever plotted.
pub const Y_FLOOR: f64 = 1.0;

/// One dot on the scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub color: String,
    /// Hover text: formatted count, method, authors, DOI.
    pub tooltip: String,
    /// Resolved https link opened on click, when the record has a DOI.
    pub href: Option<String>,
}

/// One fitted curve, clamped to the visible window.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub color: String,
    pub dashed: bool,
    pub samples: Vec<(f64, f64)>,
}

/// A visible horizontal guide line.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub label: String,
    pub y: f64,
}

/// Render-ready chart description handed to the plotting layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub points: Vec<PlotPoint>,
    pub series: Vec<PlotSeries>,
    pub guides: Vec<GuideLine>,
    pub x_range: XRange,
    pub y_max: f64,
    /// Powers of ten from 1 up to `y_max`, inclusive.
    pub y_ticks: Vec<f64>,
    /// (method, color) in legend order.
    pub legend: Vec<(String, String)>,
}

/// Stroke color of the frontier curve; not tied to any method.
const FRONTIER_COLOR: &str = "#1f2430";

/// Deserialize the embedded payload JSON and derive the chart model.
/// Returns None when the payload is missing or unparseable; the caller skips
/// the chart and the rest of the page still renders.
pub fn hydrate(payload_json: &str) -> Option<ChartModel> {
    let payload: Payload = match serde_json::from_str(payload_json) {
        Ok(p) => p,
        Err(err) => {
            warn!("payload JSON unparseable, skipping chart: {err}");
            return None;
        }
    };
    Some(build_model(&payload))
}

/// Derive the chart model from a decoded payload.
pub fn build_model(payload: &Payload) -> ChartModel {
    let colors = ColorMap::new(&payload.methods);

    let largest_reference = payload
        .references
        .iter()
        .map(|r| r.neurons)
        .fold(0.0f64, f64::max);
    let y_max = next_power_of_ten(payload.max_neurons.max(largest_reference));
    let y_ticks = power_of_ten_ticks(y_max);

    let points = payload
        .points
        .iter()
        .map(|rec| PlotPoint {
            x: rec.decimal_year,
            y: clamp_value(rec.neurons, y_max),
            color: colors.color_for(&rec.method).to_string(),
            tooltip: point_tooltip(
                rec.neurons,
                &rec.method,
                &rec.authors,
                rec.doi.as_deref(),
            ),
            href: rec.doi.as_deref().map(doi_url),
        })
        .collect();

    let mut series = Vec::new();
    if let Some(frontier) = &payload.frontier {
        series.push(PlotSeries {
            label: frontier.label.clone(),
            color: FRONTIER_COLOR.to_string(),
            dashed: true,
            samples: clamp_series(&frontier.series, payload.x_range, y_max),
        });
    }
    for reg in &payload.method_regressions {
        series.push(PlotSeries {
            label: reg.method.clone(),
            color: colors.color_for(&reg.method).to_string(),
            dashed: false,
            samples: clamp_series(&reg.series, payload.x_range, y_max),
        });
    }

    let guides = visible_guides(&payload.references, y_max);

    let legend = payload
        .methods
        .iter()
        .map(|m| (m.clone(), colors.color_for(m).to_string()))
        .collect();

    debug!(
        "chart model: {} points, {} series, y_max {y_max}",
        payload.points.len(),
        series.len()
    );

    ChartModel {
        points,
        series,
        guides,
        x_range: payload.x_range,
        y_max,
        y_ticks,
        legend,
    }
}

/// References beyond the axis ceiling stay in the payload but draw no line.
pub fn visible_guides(references: &[Reference], y_max: f64) -> Vec<GuideLine> {
    references
        .iter()
        .filter(|r| r.neurons <= y_max)
        .map(|r| GuideLine {
            label: r.label.clone(),
            y: clamp_value(r.neurons, y_max),
        })
        .collect()
}

/// Clamp a value into the visible log-scale window [Y_FLOOR, y_max].
pub fn clamp_value(value: f64, y_max: f64) -> f64 {
    value.clamp(Y_FLOOR, y_max)
}

/// Keep only samples whose year lies within the axis domain and clamp each
/// retained value. Guards a fitted curve extrapolating outside the window.
pub fn clamp_series(series: &[TrendPoint], x_range: XRange, y_max: f64) -> Vec<(f64, f64)> {
    series
        .iter()
        .filter(|p| p.decimal_year >= x_range.min && p.decimal_year <= x_range.max)
        .map(|p| (p.decimal_year, clamp_value(p.neurons, y_max)))
        .collect()
}

/// Smallest power of ten that is >= `value` (and at least 10).
pub fn next_power_of_ten(value: f64) -> f64 {
    if value <= 10.0 {
        return 10.0;
    }
    10f64.powf(value.log10().ceil())
}

/// Powers of ten from 1 up to `y_max` inclusive.
pub fn power_of_ten_ticks(y_max: f64) -> Vec<f64> {
    let top = y_max.log10().round() as i32;
    (0..=top.max(0)).map(|e| 10f64.powi(e)).collect()
}

/// "1,234,567" style grouping for tooltip and tick labels.
pub fn format_count(value: f64) -> String {
    let digits = format!("{:.0}", value.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn point_tooltip(neurons: f64, method: &str, authors: &str, doi: Option<&str>) -> String {
    let mut text = format!("{} neurons • {method} • {authors}", format_count(neurons));
    if let Some(doi) = doi {
        text.push_str(" • ");
        text.push_str(doi);
    }
    text
}

fn doi_url(doi: &str) -> String {
    if doi.starts_with("http://") || doi.starts_with("https://") {
        doi.to_string()
    } else {
        format!("https://doi.org/{doi}")
    }
}
