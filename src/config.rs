// ---------------------------------------------------------------------------
// Build configuration: fixed constants injected into the pipeline stages
// ---------------------------------------------------------------------------

/// A static landmark neuron count drawn as a horizontal guide line.
/// Not derived from the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceMark {
    pub label: &'static str,
    pub neurons: f64,
}

/// Known whole-structure neuron counts used as comparison guide lines.
pub const BIO_REFERENCES: &[ReferenceMark] = &[
    ReferenceMark {
        label: "Fruit fly brain (~1.5e5)",
        neurons: 150_000.0,
    },
    ReferenceMark {
        label: "Mouse cortex (~1.4e7)",
        neurons: 14_000_000.0,
    },
    ReferenceMark {
        label: "Mouse brain (~7.1e7)",
        neurons: 71_000_000.0,
    },
];

/// Minimum number of qualifying records before a per-method trend is fitted.
/// Sparser categories produce no regression series.
pub const MIN_METHOD_SAMPLES: usize = 5;

/// Number of evenly spaced samples per fitted trend series.
pub const TREND_GRID_POINTS: usize = 200;

/// Month substituted when a row leaves the month column blank (mid-year).
pub const DEFAULT_MONTH: u32 = 7;

/// Accepted publication-year window; rows outside are dropped as malformed.
pub const YEAR_MIN: i32 = 1700;
pub const YEAR_MAX: i32 = 2100;

/// Number of distinct hues in the method palette; methods beyond this cycle.
pub const PALETTE_SIZE: usize = 8;

/// Default input / output locations when no CLI arguments are given.
pub const DEFAULT_DATA_PATH: &str = "neural_recording_papers.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "public";

/// Element id of the embedded payload JSON block in the generated page.
pub const PAYLOAD_ELEMENT_ID: &str = "neuro-data";

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
