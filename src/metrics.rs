use crate::error::{PlotError, Result};
use crate::model::{PercentileRow, PercentileTable, Summary};

/// Compute min, median and max latency of a table and attach the externally measured jitter.
///
/// The median is the latency of the row whose percentile is closest to 0.5; on a tie the
/// earlier row wins. An empty table has no such values and is rejected.
pub fn summarize(label: &str, table: &PercentileTable, jitter_us: i64) -> Result<Summary> {
    let median = median_row(&table.rows).ok_or_else(|| PlotError::EmptyTable {
        label: label.to_string(),
    })?;
    let min_ms = table
        .rows
        .iter()
        .map(|r| r.latency)
        .fold(f64::INFINITY, f64::min);
    let max_ms = table
        .rows
        .iter()
        .map(|r| r.latency)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(Summary {
        min_ms,
        median_ms: median.latency,
        max_ms,
        jitter_us,
    })
}

/// Row nearest to the 50th percentile.
pub fn median_row(rows: &[PercentileRow]) -> Option<&PercentileRow> {
    // min_by keeps the first of equal elements
    rows.iter().min_by(|a, b| {
        let da = (a.percentile - 0.5).abs();
        let db = (b.percentile - 0.5).abs();
        da.total_cmp(&db)
    })
}
