//! Text blocks for the summary box.
//!
//! Each input file gets a fixed-width block: its label, a rule, then min/median/max
//! latency and the jitter that was measured alongside the run.

use crate::error::{PlotError, Result};
use crate::metrics;
use crate::model::{PercentileTable, Summary};

const RULE: &str = "------------------";

/// Format one file's block. The result ends with a newline.
pub fn info_text(label: &str, summary: &Summary) -> String {
    format!(
        "{label:<18}\n{RULE}\n{:<6} = {:>6.3} ms\n{:<6} = {:>6.3} ms\n{:<6} = {:>6.3} ms\n{:<6} = {:>6} us\n",
        "min",
        summary.min_ms,
        "median",
        summary.median_ms,
        "max",
        summary.max_ms,
        "jitter",
        summary.jitter_us,
    )
}

/// Summarize every table and join the blocks in input order, one blank line apart.
///
/// `labels`, `tables` and `jitters` are index-aligned.
pub fn summary_box_text(
    labels: &[String],
    tables: &[PercentileTable],
    jitters: &[i64],
) -> Result<String> {
    if jitters.len() != tables.len() {
        return Err(PlotError::ConfigMismatch {
            files: tables.len(),
            jitters: jitters.len(),
        });
    }
    let blocks = labels
        .iter()
        .zip(tables)
        .zip(jitters)
        .map(|((label, table), &jitter)| {
            metrics::summarize(label, table, jitter).map(|s| info_text(label, &s))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(blocks.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PercentileRow;

    fn row(percentile: f64, latency: f64) -> PercentileRow {
        PercentileRow {
            latency,
            percentile,
            total_count: 1,
            inverse_tail_probability: 1.0,
        }
    }

    #[test]
    fn block_layout_is_fixed_width() {
        let s = Summary {
            min_ms: 0.921,
            median_ms: 2.015,
            max_ms: 12.935,
            jitter_us: 150,
        };
        let text = info_text("nginx", &s);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "nginx             ",
                "------------------",
                "min    =  0.921 ms",
                "median =  2.015 ms",
                "max    = 12.935 ms",
                "jitter =    150 us",
            ]
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn blocks_are_joined_in_input_order() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let tables = vec![
            PercentileTable::new(vec![row(0.5, 1.0)]),
            PercentileTable::new(vec![row(0.5, 2.0)]),
        ];
        let text = summary_box_text(&labels, &tables, &[10, 20]).unwrap();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("a "));
        assert!(blocks[0].contains("jitter =     10 us"));
        assert!(blocks[1].starts_with("b "));
        assert!(blocks[1].contains("jitter =     20 us"));
    }

    #[test]
    fn jitter_count_must_match() {
        let labels = vec!["a".to_string()];
        let tables = vec![PercentileTable::new(vec![row(0.5, 1.0)])];
        let err = summary_box_text(&labels, &tables, &[1, 2]).unwrap_err();
        assert!(matches!(err, PlotError::ConfigMismatch { files: 1, jitters: 2 }));
    }
}
