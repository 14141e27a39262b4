use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::chart::hydrate;
use crate::chart::svg::{self, escape};
use crate::config::PAYLOAD_ELEMENT_ID;
use crate::payload::{Payload, Summary};

// ---------------------------------------------------------------------------
// Page renderer: payload + summary → one self-contained HTML document
// ---------------------------------------------------------------------------

/// Build the complete page. The chart is hydrated from the same serialized
/// JSON that gets embedded, so the payload block is the single source of
/// truth; if hydration fails the page still renders without a chart.
pub fn render_page(payload: &Payload, summary: &Summary, csv_name: &str) -> Result<String> {
    // "</" must not appear literally inside the script block: a field
    // containing "</script>" would terminate it early. "\/" is a valid JSON
    // escape, so the embedded text still decodes to the same payload.
    let payload_json = payload.to_json()?.replace("</", "<\\/");

    let chart_markup = match hydrate::hydrate(&payload_json) {
        Some(model) => {
            let mut section = svg::render(&model);
            section.push_str(&legend(&model));
            section
        }
        None => r#"<p class="nt-empty">Chart unavailable.</p>"#.to_string(),
    };

    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head>");
    html.push_str(r#"<meta charset="utf-8">"#);
    html.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
    html.push_str(r#"<meta name="description" content="neurotrends – neurons simultaneously recorded vs. year, with transparent data and citations.">"#);
    html.push_str("<title>neurotrends</title>");
    let _ = write!(html, "<style>{STYLES}</style>");
    html.push_str("</head><body class=\"nt-body\"><main><div class=\"nt-shell\">");

    hero(&mut html, summary);

    html.push_str(r#"<section class="nt-chart-card">"#);
    let _ = write!(html, r#"<div class="nt-plot">{chart_markup}</div>"#);
    frontier_annotation(&mut html, payload);
    method_grid(&mut html, payload);
    html.push_str("</section>");

    let _ = write!(
        html,
        r#"<div class="nt-download-row"><div class="nt-download"><h3>Download &amp; extend</h3><p>Want to audit or extend this view? Grab the CSV and regenerate the site. Columns include neurons captured, method, authors, and DOIs.</p><a class="nt-button" href="./{csv}">Download CSV</a></div></div>"#,
        csv = escape(csv_name),
    );

    html.push_str("</div></main>");
    html.push_str(r#"<footer><p class="nt-footer-text">Static page regenerated from the CSV on every build. Deploy anywhere static files are welcome.</p></footer>"#);

    // The payload block: fixed element id, compact JSON, read-only contract.
    let _ = write!(
        html,
        r#"<script id="{PAYLOAD_ELEMENT_ID}" type="application/json">{payload_json}</script>"#
    );
    html.push_str("</body></html>");
    Ok(html)
}

fn hero(html: &mut String, summary: &Summary) {
    html.push_str(r#"<div class="nt-hero"><h2>neurotrends</h2><div class="nt-metrics">"#);
    let _ = write!(
        html,
        r#"<div><span class="nt-label">Latest datapoint</span><strong class="nt-value">{date}</strong><p class="nt-meta">{neurons} neurons &bull; {publication}</p></div>"#,
        date = escape(&summary.latest.date_label),
        neurons = hydrate::format_count(summary.latest.neurons),
        publication = escape(&summary.latest.publication),
    );
    let _ = write!(
        html,
        r#"<div><span class="nt-label">Frontier max</span><strong class="nt-value">{neurons}</strong><p class="nt-meta">{publication} ({year})</p></div>"#,
        neurons = hydrate::format_count(summary.top.neurons),
        publication = escape(&summary.top.publication),
        year = summary.top.year,
    );
    let _ = write!(
        html,
        r#"<div><span class="nt-label">Dataset size</span><strong class="nt-value">{rows}</strong><p class="nt-meta">papers from curated sources</p></div>"#,
        rows = summary.rows,
    );
    html.push_str("</div></div>");
}

fn legend(model: &hydrate::ChartModel) -> String {
    let mut out = String::from(r#"<div class="nt-legend">"#);
    for (method, color) in &model.legend {
        let _ = write!(
            out,
            r#"<span class="nt-legend-item"><i style="background:{color}"></i>{name}</span>"#,
            name = escape(method),
        );
    }
    out.push_str("</div>");
    out
}

fn frontier_annotation(html: &mut String, payload: &Payload) {
    let Some(frontier) = &payload.frontier else {
        return;
    };
    let _ = write!(
        html,
        r#"<div class="nt-annotations"><div><span class="nt-label">Doubling time (frontier)</span><strong class="nt-value">{doubling}</strong><p class="nt-meta">Running-maximum datapoints</p></div></div>"#,
        doubling = format_doubling(frontier.doubling_time_years),
    );
}

fn method_grid(html: &mut String, payload: &Payload) {
    if payload.method_regressions.is_empty() {
        return;
    }
    html.push_str(r#"<div class="nt-method-wrap"><h4>Doubling by modality</h4><div class="nt-method-grid">"#);
    for reg in &payload.method_regressions {
        let _ = write!(
            html,
            r#"<div><span class="nt-label">{method}</span><strong class="nt-value">{doubling}</strong><p class="nt-meta">{count} papers</p>"#,
            method = escape(&reg.method),
            doubling = format_doubling(reg.doubling_time_years),
            count = reg.count,
        );
        html.push_str(r#"<ul class="nt-milestones">"#);
        for hit in reg.reference_hits.iter().take(3) {
            let _ = write!(
                html,
                "<li>{label} &asymp; {year}</li>",
                label = escape(short_label(&hit.label)),
                year = format_year(hit.year),
            );
        }
        html.push_str("</ul></div>");
    }
    html.push_str("</div></div>");
}

/// "12.3 yr" / "1.85 yr" / "n/a" for a doubling time.
fn format_doubling(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v >= 8.0 => format!("{v:.1} yr"),
        Some(v) if v.is_finite() => format!("{v:.2} yr"),
        _ => "n/a".to_string(),
    }
}

fn format_year(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.0}")
    } else {
        "n/a".to_string()
    }
}

/// Drop the parenthesized suffix of a reference label:
/// "Mouse brain (~7.1e7)" → "Mouse brain".
fn short_label(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Write the assembled page and a copy of the source CSV into `out_dir`.
/// The page is fully built in memory before anything touches disk, so a
/// failed build never leaves a partial artifact.
pub fn write_site(html: &str, csv_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let index = out_dir.join("index.html");
    std::fs::write(&index, html).with_context(|| format!("writing {}", index.display()))?;

    let csv_name = csv_path
        .file_name()
        .context("input CSV has no file name")?;
    std::fs::copy(csv_path, out_dir.join(csv_name))
        .with_context(|| format!("copying {} next to the page", csv_path.display()))?;

    info!("wrote {}", index.display());
    Ok(index)
}

const STYLES: &str = r#"
:root{--bg:#f6f4ef;--card:#ffffff;--ink:#1f2430;--dim:#5f6672;--accent:#b4602f;--border:#e3ddd2}
*{box-sizing:border-box;margin:0;padding:0}
.nt-body{background:var(--bg);color:var(--ink);font-family:Georgia,'Times New Roman',serif;line-height:1.5}
.nt-shell{max-width:1040px;margin:0 auto;padding:32px 20px}
.nt-hero h2{font-size:34px;letter-spacing:-.01em;margin-bottom:16px}
.nt-metrics{display:grid;grid-template-columns:repeat(auto-fit,minmax(200px,1fr));gap:16px;margin-bottom:28px}
.nt-label{display:block;font-size:11px;text-transform:uppercase;letter-spacing:.08em;color:var(--dim)}
.nt-value{display:block;font-size:24px;margin:2px 0}
.nt-meta{font-size:13px;color:var(--dim)}
.nt-chart-card{background:var(--card);border:1px solid var(--border);border-radius:10px;padding:20px;margin-bottom:28px}
.nt-plot svg{width:100%;height:auto;display:block}
.nt-empty{color:var(--dim);padding:40px;text-align:center}
.nt-legend{display:flex;flex-wrap:wrap;gap:14px;margin:12px 4px;font-size:13px}
.nt-legend-item i{display:inline-block;width:10px;height:10px;border-radius:50%;margin-right:6px}
.nt-annotations{margin:16px 4px}
.nt-method-wrap{margin-top:20px;border-top:1px solid var(--border);padding-top:16px}
.nt-method-wrap h4{margin-bottom:12px}
.nt-method-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:16px}
.nt-milestones{list-style:none;font-size:12px;color:var(--dim);margin-top:6px}
.nt-download-row{display:flex;justify-content:center}
.nt-download{background:var(--card);border:1px solid var(--border);border-radius:10px;padding:20px;max-width:560px}
.nt-download h3{margin-bottom:8px}
.nt-button{display:inline-block;margin-top:12px;background:var(--accent);color:#fff;text-decoration:none;padding:8px 18px;border-radius:6px;font-size:14px}
footer{padding:24px;text-align:center}
.nt-footer-text{font-size:12px;color:var(--dim)}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BIO_REFERENCES;
    use crate::data::model::{Dataset, Record};
    use crate::payload;

    fn rec(id: usize, year: i32, neurons: f64, method: &str) -> Record {
        Record::new(
            id,
            year,
            Some(7),
            neurons,
            "Doe et al.".into(),
            method.into(),
            "curated".into(),
            "Nature".into(),
            String::new(),
            Some("10.1000/a".into()),
        )
    }

    fn build() -> (Payload, Summary) {
        let ds = Dataset::from_records(vec![
            rec(0, 2001, 50.0, "Tetrode"),
            rec(1, 2004, 120.0, "Tetrode"),
            rec(2, 2007, 260.0, "Tetrode"),
            rec(3, 2011, 900.0, "Tetrode"),
            rec(4, 2014, 2600.0, "Tetrode"),
            rec(5, 2015, 5000.0, "Imaging"),
        ]);
        let payload = payload::assemble(&ds, BIO_REFERENCES).unwrap();
        let summary = payload::summarize(&ds).unwrap();
        (payload, summary)
    }

    #[test]
    fn test_page_contains_payload_block_and_chart() {
        let (payload, summary) = build();
        let html = render_page(&payload, &summary, "data.csv").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<script id="neuro-data" type="application/json">"#));
        assert!(html.contains("<svg"));
        assert!(html.contains("Doubling time (frontier)"));
        // Five Tetrode papers clear the threshold, so the grid renders.
        assert!(html.contains("Doubling by modality"));
        assert!(html.contains("Download CSV"));
    }

    #[test]
    fn test_embedded_json_round_trips() {
        let (payload, summary) = build();
        let html = render_page(&payload, &summary, "data.csv").unwrap();
        let start = html.find(r#"type="application/json">"#).unwrap()
            + r#"type="application/json">"#.len();
        let end = html[start..].find("</script>").unwrap() + start;
        let embedded: Payload = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(embedded, payload);
    }

    #[test]
    fn test_script_closing_tag_in_data_cannot_truncate_page() {
        let mut closer = rec(0, 2001, 50.0, "Tetrode");
        closer.authors = "Evil</script><b>Pwned".into();
        let ds = Dataset::from_records(vec![closer, rec(1, 2015, 5000.0, "Imaging")]);
        let payload = payload::assemble(&ds, BIO_REFERENCES).unwrap();
        let summary = payload::summarize(&ds).unwrap();

        let html = render_page(&payload, &summary, "data.csv").unwrap();
        let start = html.find(r#"type="application/json">"#).unwrap()
            + r#"type="application/json">"#.len();
        let end = html[start..].find("</script>").unwrap() + start;

        // The first closing tag after the block opens is the real one, and
        // the escaped JSON still decodes to the original payload.
        let embedded: Payload = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(embedded, payload);
        assert_eq!(embedded.points[0].authors, "Evil</script><b>Pwned");
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_format_doubling() {
        assert_eq!(format_doubling(None), "n/a");
        assert_eq!(format_doubling(Some(f64::INFINITY)), "n/a");
        assert_eq!(format_doubling(Some(12.34)), "12.3 yr");
        assert_eq!(format_doubling(Some(1.846)), "1.85 yr");
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("Mouse brain (~7.1e7)"), "Mouse brain");
        assert_eq!(short_label("Plain"), "Plain");
    }

    #[test]
    fn test_write_site_outputs_page_and_csv() {
        use std::io::Write as _;

        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("papers.csv");
        let mut f = std::fs::File::create(&csv).unwrap();
        writeln!(f, "Year,Neurons").unwrap();

        let out = dir.path().join("public");
        let index = write_site("<!DOCTYPE html>", &csv, &out).unwrap();
        assert!(index.exists());
        assert!(out.join("papers.csv").exists());
    }
}
