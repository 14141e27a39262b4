use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use thiserror::Error;

use super::model::{Dataset, Record};
use crate::config::{YEAR_MAX, YEAR_MIN};

// ---------------------------------------------------------------------------
// Row-level errors: a malformed row is dropped, never fatal
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing or non-numeric year '{0}'")]
    BadYear(String),
    #[error("year {0} outside plausible range {YEAR_MIN}..={YEAR_MAX}")]
    YearOutOfRange(i32),
    #[error("missing or non-numeric neuron count '{0}'")]
    BadNeurons(String),
    #[error("non-positive neuron count {0}")]
    NonPositiveNeurons(f64),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the publication table from a CSV file.
///
/// Expected columns (header-matched, case-insensitive): `Year`, `Month`,
/// `Neurons`, `Method`, `Authors`, `Publication`, `DOI`, `Source`,
/// `Method Note`. Rows with an unparseable year or a non-positive neuron
/// count are dropped with a warning; source order is preserved.
///
/// A missing or unreadable file aborts the build.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = |name: &str| -> Option<usize> {
        headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    };

    let year_idx = col("year").context("CSV missing 'Year' column")?;
    let neurons_idx = col("neurons").context("CSV missing 'Neurons' column")?;
    let month_idx = col("month");
    let method_idx = col("method");
    let authors_idx = col("authors");
    let publication_idx = col("publication");
    let doi_idx = col("doi");
    let source_idx = col("source");
    let note_idx = col("method note");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let parsed = parse_row(
            record.get(year_idx).unwrap_or(""),
            month_idx.and_then(|i| record.get(i)),
            record.get(neurons_idx).unwrap_or(""),
        );
        let (year, month, neurons) = match parsed {
            Ok(v) => v,
            Err(err) => {
                warn!("dropping row {row_no}: {err}");
                dropped += 1;
                continue;
            }
        };

        let doi = match field(&record, doi_idx) {
            s if s.is_empty() => None,
            s => Some(s),
        };

        records.push(Record::new(
            records.len(),
            year,
            month,
            neurons,
            field(&record, authors_idx),
            field(&record, method_idx),
            field(&record, source_idx),
            field(&record, publication_idx),
            field(&record, note_idx),
            doi,
        ));
    }

    debug!(
        "loaded {} records from {} ({dropped} dropped)",
        records.len(),
        path.display()
    );
    Ok(Dataset::from_records(records))
}

/// Validate the numeric fields of one row. Month is best-effort: anything
/// unparseable is treated as absent rather than failing the row.
fn parse_row(
    year: &str,
    month: Option<&str>,
    neurons: &str,
) -> std::result::Result<(i32, Option<u32>, f64), RowError> {
    let year: i32 = year
        .parse::<f64>()
        .map_err(|_| RowError::BadYear(year.to_string()))? as i32;
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(RowError::YearOutOfRange(year));
    }

    let neurons_val: f64 = neurons
        .replace(',', "")
        .parse()
        .map_err(|_| RowError::BadNeurons(neurons.to_string()))?;
    if !neurons_val.is_finite() || neurons_val <= 0.0 {
        return Err(RowError::NonPositiveNeurons(neurons_val));
    }

    let month = month.and_then(|m| m.parse::<f64>().ok()).map(|m| m as u32);

    Ok((year, month, neurons_val))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Year,Month,Neurons,Method,Authors,Publication,DOI,Source,Method Note";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn test_loads_well_formed_rows_in_order() {
        let file = write_csv(&[
            "2001,3,50,Tetrode,Smith et al.,Nature,10.1000/a,curated,",
            "2010,,500,Imaging,Jones et al.,Science,,curated,two-photon",
        ]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, 2001);
        assert_eq!(ds.records[0].month, 3);
        assert_eq!(ds.records[0].doi.as_deref(), Some("10.1000/a"));
        // blank month falls back to mid-year
        assert_eq!(ds.records[1].month, crate::config::DEFAULT_MONTH);
        assert_eq!(ds.records[1].doi, None);
        assert_eq!(ds.records[1].method_note, "two-photon");
    }

    #[test]
    fn test_drops_non_numeric_neurons() {
        let file = write_csv(&[
            "2001,7,N/A,Tetrode,Smith,Nature,,curated,",
            "2002,7,80,Tetrode,Smith,Nature,,curated,",
        ]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].year, 2002);
    }

    #[test]
    fn test_drops_non_positive_neurons_and_bad_years() {
        let file = write_csv(&[
            "2001,7,0,A,x,y,,z,",
            "2002,7,-5,A,x,y,,z,",
            ",7,10,A,x,y,,z,",
            "9999,7,10,A,x,y,,z,",
            "2005,7,10,A,x,y,,z,",
        ]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].year, 2005);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(load_csv(Path::new("definitely/does/not/exist.csv")).is_err());
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year,Method").unwrap();
        writeln!(file, "2001,Tetrode").unwrap();
        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(
            parse_row("abc", None, "10"),
            Err(RowError::BadYear("abc".into()))
        );
        assert_eq!(
            parse_row("2001", None, "n/a"),
            Err(RowError::BadNeurons("n/a".into()))
        );
        assert_eq!(
            parse_row("2001", None, "0"),
            Err(RowError::NonPositiveNeurons(0.0))
        );
        assert_eq!(parse_row("1650", None, "10"), Err(RowError::YearOutOfRange(1650)));
    }

    #[test]
    fn test_thousands_separators_accepted() {
        let (_, _, n) = parse_row("2015", Some("2"), "1,000,000").unwrap();
        assert_eq!(n, 1_000_000.0);
    }
}
