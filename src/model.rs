use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One line of a percentile report: latency at or below which `percentile` of requests fall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileRow {
    /// Latency in milliseconds.
    pub latency: f64,
    pub percentile: f64,
    pub total_count: u64,
    /// `1 / (1 - percentile)` as printed by the report.
    pub inverse_tail_probability: f64,
}

/// All rows extracted from one report file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileTable {
    pub rows: Vec<PercentileRow>,
}

impl PercentileTable {
    pub fn new(rows: Vec<PercentileRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `(percentile, latency)` pairs in row order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows.iter().map(|r| (r.percentile, r.latency))
    }
}

/// Figures shown in the summary box for one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min_ms: f64,
    pub median_ms: f64,
    pub max_ms: f64,
    pub jitter_us: i64,
}

/// Export record for `--export-json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub label: String,
    pub file: PathBuf,
    pub rows: usize,
    pub min_ms: f64,
    pub median_ms: f64,
    pub max_ms: f64,
    #[serde(default)]
    pub jitter_us: Option<i64>,
}

/// Resolved and validated run configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub files: Vec<PathBuf>,
    /// One entry per file when the summary box is drawn, `None` otherwise.
    pub jitters: Option<Vec<i64>>,
    pub output: PathBuf,
    pub title: String,
    pub summary_box: bool,
    pub width: u32,
    pub height: u32,
    pub export_json: Option<PathBuf>,
}
