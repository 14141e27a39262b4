use serde::{Deserialize, Serialize};

use crate::config::{ReferenceMark, MIN_METHOD_SAMPLES, TREND_GRID_POINTS};
use crate::data::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Exponential trend fitting: neurons ≈ exp(intercept + slope · year)
// ---------------------------------------------------------------------------

/// One sample of a fitted trend curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub decimal_year: f64,
    pub neurons: f64,
}

/// A fitted exponential trend with its sampled curve.
///
/// `series` is evaluated on a regular grid across the observed year span and
/// left unclamped; clipping to the visible axis window happens at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFit {
    pub label: String,
    pub slope: f64,
    pub intercept: f64,
    /// ln 2 / slope when the trend is growing, None otherwise.
    pub doubling_time_years: Option<f64>,
    pub series: Vec<TrendPoint>,
}

/// A per-method trend with its sample count. Payload shaping happens in
/// `payload`; this is the raw fit output.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodTrend {
    pub method: String,
    pub count: usize,
    pub fit: TrendFit,
}

/// Year at which a fitted trend is projected to reach a reference mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceHit {
    pub label: String,
    pub year: f64,
}

/// Closed-form ordinary least squares on (x, ln y). Returns
/// (slope, intercept) or None when fewer than 2 distinct x values exist.
/// Callers guarantee y > 0 (§ loader), so the log transform is total.
fn fit_log_linear(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let first_x = points.first()?.0;
    if !points.iter().any(|&(x, _)| x != first_x) {
        return None;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|&(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|&(_, y)| y.ln()).sum();
    let sum_xy: f64 = points.iter().map(|&(x, y)| x * y.ln()).sum();
    let sum_x2: f64 = points.iter().map(|&(x, _)| x * x).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((slope, intercept))
}

/// Evaluate a fitted trend on `TREND_GRID_POINTS` evenly spaced samples
/// spanning `[lo, hi]`.
fn sample_series(slope: f64, intercept: f64, lo: f64, hi: f64) -> Vec<TrendPoint> {
    let n = TREND_GRID_POINTS.max(2);
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let x = lo + step * i as f64;
            TrendPoint {
                decimal_year: x,
                neurons: (intercept + slope * x).exp(),
            }
        })
        .collect()
}

fn fit_scope(label: &str, points: &[(f64, f64)], lo: f64, hi: f64) -> Option<TrendFit> {
    let (slope, intercept) = fit_log_linear(points)?;
    let doubling = (slope > 0.0).then(|| std::f64::consts::LN_2 / slope);
    Some(TrendFit {
        label: label.to_string(),
        slope,
        intercept,
        doubling_time_years: doubling,
        series: sample_series(slope, intercept, lo, hi),
    })
}

/// Fit the frontier trend: the running maximum of neurons observed up to and
/// including each calendar year. Tracks the upper envelope of capability
/// rather than the bulk of the data, so a year's sub-maximum records never
/// enter the fit.
///
/// Returns None when the dataset spans fewer than 2 distinct years.
pub fn fit_frontier(dataset: &Dataset) -> Option<TrendFit> {
    let (lo, hi) = dataset.year_range()?;

    let mut ordered: Vec<&Record> = dataset.records.iter().collect();
    ordered.sort_by(|a, b| {
        a.decimal_year
            .total_cmp(&b.decimal_year)
            .then(a.neurons.total_cmp(&b.neurons))
    });

    // Collapse to one sample per year: the running maximum after that
    // year's last record, placed at that record's decimal year.
    let mut running = f64::MIN;
    let mut envelope: Vec<(i32, f64, f64)> = Vec::new();
    for rec in ordered {
        running = running.max(rec.neurons);
        if let Some(last) = envelope.last_mut() {
            if last.0 == rec.year {
                last.1 = rec.decimal_year;
                last.2 = running;
                continue;
            }
        }
        envelope.push((rec.year, rec.decimal_year, running));
    }
    let points: Vec<(f64, f64)> = envelope.iter().map(|&(_, x, y)| (x, y)).collect();

    fit_scope("Running maximum", &points, lo, hi)
}

/// Fit one trend per method with at least `min_samples` records, using the
/// raw (non-frontier) observations. Methods appear in the dataset's
/// first-seen order; unfittable methods are omitted.
pub fn fit_methods(dataset: &Dataset, min_samples: usize) -> Vec<MethodTrend> {
    let Some((lo, hi)) = dataset.year_range() else {
        return Vec::new();
    };

    dataset
        .methods
        .iter()
        .filter_map(|method| {
            let points: Vec<(f64, f64)> = dataset
                .by_method(method)
                .map(|r| (r.decimal_year, r.neurons))
                .collect();
            if points.len() < min_samples {
                return None;
            }
            fit_scope(method, &points, lo, hi).map(|fit| MethodTrend {
                method: method.clone(),
                count: points.len(),
                fit,
            })
        })
        .collect()
}

/// Convenience wrapper using the configured threshold.
pub fn fit_all_methods(dataset: &Dataset) -> Vec<MethodTrend> {
    fit_methods(dataset, MIN_METHOD_SAMPLES)
}

/// Project the year at which a growing trend reaches each reference mark:
/// solves exp(intercept + slope·x) = target. Shrinking trends never hit.
pub fn reference_hits(fit: &TrendFit, references: &[ReferenceMark]) -> Vec<ReferenceHit> {
    if fit.slope <= 0.0 {
        return Vec::new();
    }
    references
        .iter()
        .filter(|r| r.neurons > 0.0)
        .map(|r| ReferenceHit {
            label: r.label.to_string(),
            year: (r.neurons.ln() - fit.intercept) / fit.slope,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn rec(id: usize, year: i32, neurons: f64, method: &str) -> Record {
        Record::new(
            id,
            year,
            Some(1),
            neurons,
            String::new(),
            method.into(),
            String::new(),
            String::new(),
            String::new(),
            None,
        )
    }

    fn dataset(rows: &[(i32, f64, &str)]) -> Dataset {
        Dataset::from_records(
            rows.iter()
                .enumerate()
                .map(|(i, &(y, n, m))| rec(i, y, n, m))
                .collect(),
        )
    }

    #[test]
    fn test_recovers_exact_exponential() {
        // neurons = exp(-390 + 0.2·year), doubling ≈ 3.47 yr
        let points: Vec<(f64, f64)> = (2000..2010)
            .map(|y| (y as f64, (-390.0 + 0.2 * y as f64).exp()))
            .collect();
        let (slope, intercept) = fit_log_linear(&points).unwrap();
        assert!((slope - 0.2).abs() < 1e-9, "slope {slope}");
        assert!((intercept + 390.0).abs() < 1e-5, "intercept {intercept}");
    }

    #[test]
    fn test_single_distinct_year_is_skipped() {
        assert!(fit_log_linear(&[(2000.0, 10.0), (2000.0, 20.0)]).is_none());
        assert!(fit_log_linear(&[(2000.0, 10.0)]).is_none());
        assert!(fit_log_linear(&[]).is_none());
    }

    #[test]
    fn test_series_spans_grid() {
        let fit = fit_scope("t", &[(2000.0, 10.0), (2010.0, 1000.0)], 2000.0, 2010.0).unwrap();
        assert_eq!(fit.series.len(), TREND_GRID_POINTS);
        assert_eq!(fit.series.first().unwrap().decimal_year, 2000.0);
        assert!((fit.series.last().unwrap().decimal_year - 2010.0).abs() < 1e-9);
    }

    #[test]
    fn test_frontier_is_monotonic() {
        // A late small datapoint must not pull the frontier down.
        let ds = dataset(&[
            (2001, 50.0, "A"),
            (2010, 500.0, "A"),
            (2012, 30.0, "B"),
            (2015, 5000.0, "B"),
        ]);
        let fit = fit_frontier(&ds).unwrap();
        assert!(fit.slope >= 0.0);
        for pair in fit.series.windows(2) {
            assert!(pair[1].neurons >= pair[0].neurons);
        }
        assert!(fit.doubling_time_years.unwrap() > 0.0);
    }

    #[test]
    fn test_frontier_ignores_sub_envelope_records_in_same_year() {
        // 2010 carries both a small record and the new maximum; only the
        // year's envelope value may shape the fit. With one sample per year
        // the slope is ln(1000/100)/10, a small record alongside would
        // halve it.
        let ds = dataset(&[
            (2000, 100.0, "A"),
            (2010, 10.0, "B"),
            (2010, 1000.0, "A"),
        ]);
        let fit = fit_frontier(&ds).unwrap();
        let expected = (1000.0f64 / 100.0).ln() / 10.0;
        assert!(
            (fit.slope - expected).abs() < 1e-6,
            "slope {} should match the per-year envelope {expected}",
            fit.slope
        );
    }

    #[test]
    fn test_frontier_requires_two_distinct_years() {
        let ds = dataset(&[(2001, 50.0, "A"), (2001, 80.0, "B")]);
        assert!(fit_frontier(&ds).is_none());
        assert!(fit_frontier(&Dataset::default()).is_none());
    }

    #[test]
    fn test_method_threshold_filters_sparse_methods() {
        let ds = dataset(&[
            (2001, 50.0, "A"),
            (2003, 90.0, "A"),
            (2005, 200.0, "A"),
            (2010, 500.0, "B"),
        ]);
        let trends = fit_methods(&ds, 3);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].method, "A");
        assert_eq!(trends[0].count, 3);

        assert!(fit_methods(&ds, 5).is_empty());
    }

    #[test]
    fn test_method_with_one_year_is_omitted_even_if_populous() {
        let ds = dataset(&[
            (2005, 10.0, "A"),
            (2005, 20.0, "A"),
            (2005, 30.0, "A"),
            (2010, 40.0, "B"),
        ]);
        assert!(fit_methods(&ds, 3).is_empty());
    }

    #[test]
    fn test_reference_hits_only_for_growing_trends() {
        let refs = [ReferenceMark {
            label: "Mouse brain",
            neurons: 71_000_000.0,
        }];
        let growing = fit_scope("g", &[(2000.0, 100.0), (2010.0, 10_000.0)], 2000.0, 2010.0)
            .unwrap();
        let hits = reference_hits(&growing, &refs);
        assert_eq!(hits.len(), 1);
        // Target is above the data, so the hit lies in the future.
        assert!(hits[0].year > 2010.0);

        let shrinking = fit_scope("s", &[(2000.0, 10_000.0), (2010.0, 100.0)], 2000.0, 2010.0)
            .unwrap();
        assert!(reference_hits(&shrinking, &refs).is_empty());
    }
}
