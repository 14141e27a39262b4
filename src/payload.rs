use anyhow::{bail, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ReferenceMark;
use crate::data::model::{Dataset, Record};
use crate::trend::{self, MethodTrend, ReferenceHit, TrendFit, TrendPoint};

// ---------------------------------------------------------------------------
// Payload – the JSON structure embedded in the generated page
// ---------------------------------------------------------------------------
//
// This schema is the contract with the chart hydrator and must stay stable:
// points, methodRegressions, frontier, references, xRange, maxNeurons,
// methods. Assembled once per build, immutable thereafter.

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XRange {
    pub min: f64,
    pub max: f64,
}

/// Owned, serializable form of a configured [`ReferenceMark`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    pub neurons: f64,
}

impl From<&ReferenceMark> for Reference {
    fn from(mark: &ReferenceMark) -> Self {
        Reference {
            label: mark.label.to_string(),
            neurons: mark.neurons,
        }
    }
}

/// The frontier trend as embedded in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierTrend {
    pub label: String,
    pub doubling_time_years: Option<f64>,
    pub series: Vec<TrendPoint>,
    pub reference_hits: Vec<ReferenceHit>,
}

/// One per-method regression entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRegression {
    pub method: String,
    pub count: usize,
    pub doubling_time_years: Option<f64>,
    pub series: Vec<TrendPoint>,
    pub reference_hits: Vec<ReferenceHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub points: Vec<Record>,
    pub method_regressions: Vec<MethodRegression>,
    /// Absent when the dataset spans fewer than two distinct years.
    pub frontier: Option<FrontierTrend>,
    pub references: Vec<Reference>,
    pub x_range: XRange,
    pub max_neurons: f64,
    /// Distinct method labels in first-seen order.
    pub methods: Vec<String>,
}

impl Payload {
    /// Compact JSON encoding, byte-identical across rebuilds of unchanged
    /// input (no timestamps or other nondeterminism).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn frontier_payload(fit: TrendFit, references: &[ReferenceMark]) -> FrontierTrend {
    let reference_hits = trend::reference_hits(&fit, references);
    FrontierTrend {
        label: fit.label,
        doubling_time_years: fit.doubling_time_years,
        series: fit.series,
        reference_hits,
    }
}

fn method_payload(mt: MethodTrend, references: &[ReferenceMark]) -> MethodRegression {
    let reference_hits = trend::reference_hits(&mt.fit, references);
    MethodRegression {
        method: mt.method,
        count: mt.count,
        doubling_time_years: mt.fit.doubling_time_years,
        series: mt.fit.series,
        reference_hits,
    }
}

/// Combine the cleaned rows, fitted trends, and static reference marks into
/// the payload. Pure: deterministic given the same dataset and references.
///
/// An empty dataset is build-fatal; there is nothing meaningful to publish.
pub fn assemble(dataset: &Dataset, references: &[ReferenceMark]) -> Result<Payload> {
    let Some((min_year, max_year)) = dataset.year_range() else {
        bail!("no valid rows in dataset; nothing to publish");
    };
    // year_range() is Some, so the dataset is non-empty.
    let max_neurons = dataset.max_neurons().unwrap_or(0.0);

    let frontier = trend::fit_frontier(dataset).map(|fit| frontier_payload(fit, references));
    let method_regressions: Vec<MethodRegression> = trend::fit_all_methods(dataset)
        .into_iter()
        .map(|mt| method_payload(mt, references))
        .collect();

    info!(
        "assembled payload: {} points, {} method trends, frontier={}",
        dataset.len(),
        method_regressions.len(),
        frontier.is_some()
    );

    Ok(Payload {
        points: dataset.records.clone(),
        method_regressions,
        frontier,
        references: references.iter().map(Reference::from).collect(),
        x_range: XRange {
            min: min_year,
            max: max_year,
        },
        max_neurons,
        methods: dataset.methods.clone(),
    })
}

// ---------------------------------------------------------------------------
// Summary – hero metrics for the rendered page (not part of the chart payload)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    /// Most recent datapoint by decimal year.
    pub latest: Record,
    /// Datapoint with the largest neuron count.
    pub top: Record,
    /// (source tag, paper count), descending by count.
    pub source_counts: Vec<(String, usize)>,
}

pub fn summarize(dataset: &Dataset) -> Option<Summary> {
    let latest = dataset
        .records
        .iter()
        .max_by(|a, b| a.decimal_year.total_cmp(&b.decimal_year))?
        .clone();
    let top = dataset
        .records
        .iter()
        .max_by(|a, b| a.neurons.total_cmp(&b.neurons))?
        .clone();

    let mut source_counts: Vec<(String, usize)> = Vec::new();
    for rec in &dataset.records {
        match source_counts.iter_mut().find(|(s, _)| s == &rec.source) {
            Some((_, n)) => *n += 1,
            None => source_counts.push((rec.source.clone(), 1)),
        }
    }
    source_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Some(Summary {
        rows: dataset.len(),
        latest,
        top,
        source_counts,
    })
}
