use std::fmt::Write as _;

use super::hydrate::{format_count, ChartModel, PlotPoint, PlotSeries, Y_FLOOR};

// ---------------------------------------------------------------------------
// SVG plotting layer
// ---------------------------------------------------------------------------
//
// Fixed plotting contract: consumes only the clamped, display-ready values of
// a ChartModel. The chart scales with its container via viewBox, hover text
// uses native <title> elements, and DOI dots are wrapped in <a> anchors.

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 520.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 44.0;
const POINT_RADIUS: f64 = 4.5;

/// Render the chart model as a responsive inline SVG.
pub fn render(model: &ChartModel) -> String {
    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg class="nt-chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" preserveAspectRatio="xMidYMid meet" aria-label="Neurons recorded simultaneously vs. publication year">"#
    );

    let scale = Scale::new(model);

    axes(&mut svg, model, &scale);
    for guide in &model.guides {
        guide_line(&mut svg, &scale, guide.y, &guide.label);
    }
    for series in &model.series {
        series_path(&mut svg, &scale, series);
    }
    for point in &model.points {
        data_point(&mut svg, &scale, point);
    }

    svg.push_str("</svg>");
    svg
}

/// Maps data coordinates into the SVG viewport: linear x over the axis
/// domain, log10 y over [Y_FLOOR, y_max].
struct Scale {
    x_min: f64,
    x_span: f64,
    log_y_max: f64,
}

impl Scale {
    fn new(model: &ChartModel) -> Self {
        Scale {
            x_min: model.x_range.min,
            x_span: (model.x_range.max - model.x_range.min).max(f64::EPSILON),
            log_y_max: model.y_max.max(10.0).log10(),
        }
    }

    fn x(&self, x: f64) -> f64 {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (x - self.x_min) / self.x_span * plot_w
    }

    fn y(&self, y: f64) -> f64 {
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let frac = y.max(Y_FLOOR).log10() / self.log_y_max;
        HEIGHT - MARGIN_BOTTOM - frac * plot_h
    }
}

fn axes(svg: &mut String, model: &ChartModel, scale: &Scale) {
    let x0 = MARGIN_LEFT;
    let x1 = WIDTH - MARGIN_RIGHT;
    let y0 = HEIGHT - MARGIN_BOTTOM;

    // y ticks: one per power of ten, with a faint grid line.
    for &tick in &model.y_ticks {
        let y = scale.y(tick);
        let _ = write!(
            svg,
            r##"<line class="nt-grid" x1="{x0}" y1="{y:.1}" x2="{x1}" y2="{y:.1}" stroke="#e3e5ea" stroke-width="1"/>"##
        );
        let _ = write!(
            svg,
            r##"<text class="nt-tick" x="{tx}" y="{ty:.1}" text-anchor="end" font-size="12" fill="#5f6672">{label}</text>"##,
            tx = x0 - 8.0,
            ty = y + 4.0,
            label = format_count(tick)
        );
    }

    // x ticks: whole years on a readable step.
    let step = year_step(model.x_range.max - model.x_range.min);
    let mut year = (model.x_range.min / step as f64).ceil() as i64 * step;
    while (year as f64) <= model.x_range.max {
        let x = scale.x(year as f64);
        let _ = write!(
            svg,
            r##"<line class="nt-grid" x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{y0}" stroke="#eef0f3" stroke-width="1"/>"##
        );
        let _ = write!(
            svg,
            r##"<text class="nt-tick" x="{x:.1}" y="{ty}" text-anchor="middle" font-size="12" fill="#5f6672">{year}</text>"##,
            ty = y0 + 20.0,
        );
        year += step;
    }

    let _ = write!(
        svg,
        r##"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="#5f6672" stroke-width="1"/>"##
    );
}

/// Tick spacing in whole years so the axis carries roughly 6–10 labels.
fn year_step(span: f64) -> i64 {
    for step in [1i64, 2, 5, 10, 20, 50] {
        if span / step as f64 <= 10.0 {
            return step;
        }
    }
    100
}

fn guide_line(svg: &mut String, scale: &Scale, y: f64, label: &str) {
    let sy = scale.y(y);
    let x0 = MARGIN_LEFT;
    let x1 = WIDTH - MARGIN_RIGHT;
    let _ = write!(
        svg,
        r##"<line class="nt-reference" x1="{x0}" y1="{sy:.1}" x2="{x1}" y2="{sy:.1}" stroke="#b4602f" stroke-width="1" stroke-dasharray="2 4"/>"##
    );
    let _ = write!(
        svg,
        r##"<text class="nt-reference-label" x="{x1}" y="{ty:.1}" text-anchor="end" font-size="11" fill="#b4602f">{text}</text>"##,
        ty = sy - 5.0,
        text = escape(label),
    );
}

fn series_path(svg: &mut String, scale: &Scale, series: &PlotSeries) {
    if series.samples.len() < 2 {
        return;
    }
    let mut d = String::with_capacity(series.samples.len() * 16);
    for (i, &(x, y)) in series.samples.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{:.1} {:.1}", scale.x(x), scale.y(y));
    }
    let dash = if series.dashed {
        r#" stroke-dasharray="6 4""#
    } else {
        ""
    };
    let _ = write!(
        svg,
        r#"<path class="nt-series" d="{d}" fill="none" stroke="{color}" stroke-width="2"{dash}><title>{title}</title></path>"#,
        color = series.color,
        title = escape(&series.label),
    );
}

fn data_point(svg: &mut String, scale: &Scale, point: &PlotPoint) {
    let cx = scale.x(point.x);
    let cy = scale.y(point.y);
    let circle = format!(
        r##"<circle class="nt-point" cx="{cx:.1}" cy="{cy:.1}" r="{POINT_RADIUS}" fill="{color}" fill-opacity="0.85" stroke="#ffffff" stroke-width="1"><title>{title}</title></circle>"##,
        color = point.color,
        title = escape(&point.tooltip),
    );
    match &point.href {
        Some(href) => {
            let _ = write!(
                svg,
                r#"<a href="{href}" target="_blank" rel="noopener">{circle}</a>"#,
                href = escape(href),
            );
        }
        None => svg.push_str(&circle),
    }
}

/// Minimal XML text/attribute escaping.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::hydrate::build_model;
    use crate::config::BIO_REFERENCES;
    use crate::data::model::{Dataset, Record};
    use crate::payload;

    fn model() -> ChartModel {
        let records = vec![
            Record::new(
                0,
                2001,
                Some(7),
                50.0,
                "Smith & Doe".into(),
                "Tetrode".into(),
                "curated".into(),
                "Nature".into(),
                String::new(),
                Some("10.1000/xyz".into()),
            ),
            Record::new(
                1,
                2015,
                Some(7),
                5000.0,
                "Jones".into(),
                "Imaging".into(),
                "curated".into(),
                "Science".into(),
                String::new(),
                None,
            ),
        ];
        let ds = Dataset::from_records(records);
        build_model(&payload::assemble(&ds, BIO_REFERENCES).unwrap())
    }

    #[test]
    fn test_render_structure() {
        let svg = render(&model());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        // One guide line per visible reference.
        assert_eq!(
            svg.matches(r#"class="nt-reference""#).count(),
            BIO_REFERENCES.len()
        );
    }

    #[test]
    fn test_doi_point_is_a_link() {
        let svg = render(&model());
        assert!(svg.contains(r#"<a href="https://doi.org/10.1000/xyz" target="_blank""#));
        // The DOI-less point is not wrapped.
        assert_eq!(svg.matches("<a href").count(), 1);
    }

    #[test]
    fn test_tooltips_escape_markup() {
        assert_eq!(escape("Smith & Doe <lab>"), "Smith &amp; Doe &lt;lab&gt;");
        let svg = render(&model());
        assert!(svg.contains("Smith &amp; Doe"));
    }

    #[test]
    fn test_scale_orientation() {
        let m = model();
        let scale = Scale::new(&m);
        // Larger counts sit higher on the canvas (smaller SVG y).
        assert!(scale.y(1_000_000.0) < scale.y(100.0));
        // Later years sit further right.
        assert!(scale.x(2015.0) > scale.x(2001.0));
    }

    #[test]
    fn test_year_step_is_readable() {
        assert_eq!(year_step(8.0), 1);
        assert_eq!(year_step(15.0), 2);
        assert_eq!(year_step(40.0), 5);
        assert_eq!(year_step(80.0), 10);
    }
}
