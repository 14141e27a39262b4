use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MONTH, MONTH_NAMES};

// ---------------------------------------------------------------------------
// Record – one publication observation (one row of the source CSV)
// ---------------------------------------------------------------------------

/// Sentinel method label for rows with a blank method column.
pub const UNKNOWN_METHOD: &str = "Unknown";

/// A single cleaned observation: one paper, one simultaneous-recording count.
///
/// Field names serialize in camelCase because the struct doubles as the
/// `points` entry of the embedded payload JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable index in source order.
    pub id: usize,
    pub year: i32,
    pub month: u32,
    /// Display-ready "Jul 2023" style label.
    pub date_label: String,
    /// Year plus month offset, e.g. 2023.54 – the x coordinate used everywhere.
    pub decimal_year: f64,
    /// Neurons recorded simultaneously. Always > 0 for a retained record.
    pub neurons: f64,
    pub authors: String,
    pub method: String,
    pub source: String,
    pub publication: String,
    #[serde(default)]
    pub method_note: String,
    #[serde(default)]
    pub doi: Option<String>,
}

/// Midpoint-of-month decimal year: July 2023 → 2023 + 6.5/12.
pub fn decimal_year(year: i32, month: u32) -> f64 {
    f64::from(year) + (f64::from(month) - 0.5) / 12.0
}

/// "Jul 2023" from (2023, 7). Out-of-range months are pinned to [1, 12].
pub fn format_date(year: i32, month: u32) -> String {
    let idx = month.clamp(1, 12) as usize - 1;
    format!("{} {}", MONTH_NAMES[idx], year)
}

impl Record {
    /// Assemble a record from parsed row fields, deriving the decorated
    /// display fields. `month` falls back to mid-year when absent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        year: i32,
        month: Option<u32>,
        neurons: f64,
        authors: String,
        method: String,
        source: String,
        publication: String,
        method_note: String,
        doi: Option<String>,
    ) -> Self {
        let month = month.unwrap_or(DEFAULT_MONTH).clamp(1, 12);
        let method = if method.trim().is_empty() {
            UNKNOWN_METHOD.to_string()
        } else {
            method
        };
        Record {
            id,
            year,
            month,
            date_label: format_date(year, month),
            decimal_year: decimal_year(year, month),
            neurons,
            authors,
            method,
            source,
            publication,
            method_note,
            doi,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned row set
// ---------------------------------------------------------------------------

/// All retained records in source order, with the distinct method labels
/// indexed in first-seen order (legend / palette ordering downstream).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub methods: Vec<String>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut methods: Vec<String> = Vec::new();
        for rec in &records {
            if !methods.iter().any(|m| m == &rec.method) {
                methods.push(rec.method.clone());
            }
        }
        Dataset { records, methods }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest neuron count in the dataset.
    pub fn max_neurons(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.neurons)
            .fold(None, |acc, n| Some(acc.map_or(n, |a: f64| a.max(n))))
    }

    /// [min, max] decimal year across all records.
    pub fn year_range(&self) -> Option<(f64, f64)> {
        self.records.iter().fold(None, |acc, r| {
            let x = r.decimal_year;
            Some(match acc {
                None => (x, x),
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
            })
        })
    }

    /// Records carrying the given method label, in source order.
    pub fn by_method<'a>(&'a self, method: &'a str) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| r.method == method)
    }
}
