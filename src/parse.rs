//! Extraction of percentile tables from wrk2 / HdrHistogram text reports.
//!
//! A report interleaves free text (headers, `#[Mean = ...]` summaries, blank lines)
//! with indented rows of four numeric columns:
//!
//! ```text
//!        Value   Percentile   TotalCount 1/(1-Percentile)
//!
//!        0.921     0.000000            1         1.00
//!        1.763     0.100000        11995         1.11
//! ```
//!
//! Only the numeric rows are kept.

use crate::error::{PlotError, Result};
use crate::model::{PercentileRow, PercentileTable};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ROW_PATTERN: &str = r"^\s+([0-9.]+)\s+([0-9.]+)\s+([0-9.]+)\s+([0-9.]+)";

/// Compiled row matcher. Built once per run and shared by reference.
#[derive(Debug, Clone)]
pub struct PercentilePattern {
    re: Regex,
}

impl PercentilePattern {
    pub fn new() -> Self {
        Self {
            re: Regex::new(ROW_PATTERN).expect("row pattern is a valid regex"),
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.re.is_match(line)
    }

    /// The four raw column tokens of a matching line.
    fn columns<'l>(&self, line: &'l str) -> Option<[&'l str; 4]> {
        let caps = self.re.captures(line)?;
        Some([
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
            caps.get(4)?.as_str(),
        ])
    }
}

impl Default for PercentilePattern {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazily yield `(line_number, line)` for every line of `reader` that looks like a table row.
///
/// Line numbers are 1-based. Read errors are passed through to the caller.
pub fn matching_lines<'p, R: BufRead + 'p>(
    reader: R,
    pattern: &'p PercentilePattern,
) -> impl Iterator<Item = std::io::Result<(usize, String)>> + 'p {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(idx, line)| match line {
            Ok(line) if pattern.is_match(&line) => Some(Ok((idx + 1, line))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
}

/// Convert one matching line into a row. Returns a message describing the first bad token.
pub fn parse_row(pattern: &PercentilePattern, line: &str) -> Result<PercentileRow, String> {
    let [latency, percentile, total_count, inverse] = pattern
        .columns(line)
        .ok_or_else(|| "not a percentile row".to_string())?;

    Ok(PercentileRow {
        latency: parse_float("latency", latency)?,
        percentile: parse_float("percentile", percentile)?,
        total_count: total_count
            .parse()
            .map_err(|e| format!("bad total count {total_count:?}: {e}"))?,
        inverse_tail_probability: parse_float("1/(1-percentile)", inverse)?,
    })
}

fn parse_float(column: &str, token: &str) -> Result<f64, String> {
    token
        .parse()
        .map_err(|e| format!("bad {column} {token:?}: {e}"))
}

/// Build a table from an already opened report. `path` is used for diagnostics only.
pub fn read_table<R: BufRead>(
    reader: R,
    path: &Path,
    pattern: &PercentilePattern,
) -> Result<PercentileTable> {
    let mut rows = Vec::new();
    for item in matching_lines(reader, pattern) {
        let (line_no, line) = item.map_err(|source| PlotError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let row = parse_row(pattern, &line).map_err(|message| PlotError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        })?;
        rows.push(row);
    }
    Ok(PercentileTable::new(rows))
}

/// Open and parse a single report file.
pub fn parse_file(path: &Path, pattern: &PercentilePattern) -> Result<PercentileTable> {
    let file = File::open(path).map_err(|source| PlotError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(BufReader::new(file), path, pattern)?;
    if table.is_empty() {
        warn!(path = %path.display(), "no percentile rows found");
    } else {
        debug!(path = %path.display(), rows = table.len(), "parsed percentile table");
    }
    Ok(table)
}

/// Parse every file in order. The first failure aborts the whole batch.
pub fn parse_files(paths: &[PathBuf]) -> Result<Vec<PercentileTable>> {
    let pattern = PercentilePattern::new();
    paths.iter().map(|p| parse_file(p, &pattern)).collect()
}

/// Short display name for a report: the file name up to its first `.`.
///
/// `runs/a.hdr2` becomes `a`; `b.hdr` becomes `b`.
pub fn derive_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const REPORT: &str = "\
Running 30s test @ http://127.0.0.1:80/index.html
  Latency Distribution (HdrHistogram - Recorded Latency)
 50.000%    1.52ms

  Detailed Percentile spectrum:
       Value   Percentile   TotalCount 1/(1-Percentile)

       0.921     0.000000            1         1.00
       1.763     0.100000        11995         1.11
       2.015     0.500000        59923         2.00
       4.111     0.990000       118643       100.00
#[Mean    =        2.102, StdDeviation   =        0.734]
#[Max     =       12.935, Total count    =       119844]
";

    fn table(text: &str) -> Result<PercentileTable> {
        read_table(
            Cursor::new(text),
            Path::new("test.hdr"),
            &PercentilePattern::new(),
        )
    }

    #[test]
    fn keeps_only_numeric_rows_in_order() {
        let t = table(REPORT).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(
            t.rows[1],
            PercentileRow {
                latency: 1.763,
                percentile: 0.1,
                total_count: 11995,
                inverse_tail_probability: 1.11,
            }
        );
        let latencies: Vec<f64> = t.rows.iter().map(|r| r.latency).collect();
        assert_eq!(latencies, vec![0.921, 1.763, 2.015, 4.111]);
    }

    #[test]
    fn matching_lines_reports_line_numbers() {
        let pattern = PercentilePattern::new();
        let lines: Vec<(usize, String)> = matching_lines(Cursor::new(REPORT), &pattern)
            .collect::<std::io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].0, 8);
        assert!(lines[0].1.contains("0.921"));
    }

    #[test]
    fn unindented_and_partial_lines_are_skipped() {
        let pattern = PercentilePattern::new();
        assert!(!pattern.is_match("1.0 0.5 10 2.0"));
        assert!(!pattern.is_match("   1.0 0.5 10"));
        assert!(!pattern.is_match("       Value   Percentile   TotalCount 1/(1-Percentile)"));
        assert!(!pattern.is_match("     123.456 1.000000      119844         inf"));
        assert!(pattern.is_match("   1.0 0.5 10 2.0 trailing"));
    }

    #[test]
    fn no_rows_is_an_empty_table() {
        let t = table("header only\n\n#[Mean = 1.0]\n").unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn malformed_token_is_a_parse_error() {
        let err = table("  title\n   1.2.3   0.5   10   2.0\n").unwrap_err();
        match err {
            PlotError::Parse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("latency"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fractional_total_count_is_a_parse_error() {
        let err = table("   1.0   0.5   10.5   2.0\n").unwrap_err();
        assert!(matches!(err, PlotError::Parse { line: 1, .. }));
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let err = parse_file(
            Path::new("/definitely/not/here.hdr"),
            &PercentilePattern::new(),
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::FileAccess { .. }));
    }

    #[test]
    fn labels_strip_directory_and_extension() {
        assert_eq!(derive_label(Path::new("a.hdr2")), "a");
        assert_eq!(derive_label(Path::new("dir/b.hdr")), "b");
        assert_eq!(derive_label(Path::new("/tmp/runs/nginx.hdr10")), "nginx");
        assert_eq!(derive_label(Path::new("plain")), "plain");
    }

    #[test]
    fn identical_labels_are_allowed() {
        assert_eq!(
            derive_label(Path::new("x/run.hdr1")),
            derive_label(Path::new("y/run.hdr2"))
        );
    }
}
