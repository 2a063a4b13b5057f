use crate::chart::{self, BitmapChart, ChartRenderer};
use crate::error::{PlotError, Result as PlotResult};
use crate::metrics;
use crate::model::{FileSummary, PercentileTable, PlotConfig};
use crate::parse;
use crate::storage;
use crate::text_summary;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hdr-plot",
    version,
    about = "Plot HdrHistogram / wrk2 latency percentiles"
)]
pub struct Cli {
    /// Percentile report files to plot
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Comma-delimited jitter values in microseconds, one per file (e.g. 120,95)
    #[arg(long)]
    pub jitters: Option<String>,

    /// Output image path
    #[arg(long, default_value = "latency.png")]
    pub output: PathBuf,

    /// Title drawn above the chart
    #[arg(long, default_value = "")]
    pub title: String,

    /// Do not draw the summary box
    #[arg(long)]
    pub nobox: bool,

    /// Image width in pixels
    #[arg(long, default_value_t = 1800)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1000)]
    pub height: u32,

    /// Also write per-file summaries as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

/// Parse a `--jitters` list. Surrounding whitespace around entries is ignored.
pub fn parse_jitters(list: &str) -> PlotResult<Vec<i64>> {
    list.split(',')
        .map(|item| {
            let item = item.trim();
            item.parse().map_err(|_| PlotError::InvalidJitter {
                value: item.to_string(),
            })
        })
        .collect()
}

/// Build a validated `PlotConfig` from CLI arguments.
///
/// Jitters are only consulted when the summary box is drawn; then there must be exactly
/// one per file. This runs before any file is read.
pub fn build_config(args: &Cli) -> PlotResult<PlotConfig> {
    let summary_box = !args.nobox;
    let jitters = if summary_box {
        let jitters = match args.jitters.as_deref() {
            Some(list) => parse_jitters(list)?,
            None => Vec::new(),
        };
        if jitters.len() != args.files.len() {
            return Err(PlotError::ConfigMismatch {
                files: args.files.len(),
                jitters: jitters.len(),
            });
        }
        Some(jitters)
    } else {
        None
    };

    Ok(PlotConfig {
        files: args.files.clone(),
        jitters,
        output: args.output.clone(),
        title: args.title.clone(),
        summary_box,
        width: args.width,
        height: args.height,
        export_json: args.export_json.clone(),
    })
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args).context("invalid arguments")?;
    let mut chart = BitmapChart::new(cfg.width, cfg.height);
    let written = run_pipeline(&cfg, &mut chart)?;
    println!("Wrote: {}", written.display());
    if let Some(p) = cfg.export_json.as_deref() {
        eprintln!("Exported JSON: {}", p.display());
    }
    Ok(())
}

/// Parse, plot, annotate and save. Returns the path of the written image.
pub fn run_pipeline<R: ChartRenderer>(cfg: &PlotConfig, chart: &mut R) -> PlotResult<PathBuf> {
    let tables = parse::parse_files(&cfg.files)?;
    let labels: Vec<String> = cfg.files.iter().map(|p| parse::derive_label(p)).collect();
    debug!(?labels, "parsed {} report(s)", tables.len());

    chart::plot_percentiles(chart, &tables, &labels);
    if cfg.summary_box {
        let jitters = cfg.jitters.as_deref().unwrap_or_default();
        let text = text_summary::summary_box_text(&labels, &tables, jitters)?;
        chart::plot_summary_box(chart, &text);
    }
    chart.set_super_title(&cfg.title);

    // export first: a failed export must not leave an image behind
    if let Some(p) = cfg.export_json.as_deref() {
        let summaries = file_summaries(cfg, &tables, &labels)?;
        storage::export_json(p, &summaries)?;
    }

    chart.save(&cfg.output)?;
    info!(path = %cfg.output.display(), "chart written");
    Ok(cfg.output.clone())
}

/// Export records for every non-empty table.
fn file_summaries(
    cfg: &PlotConfig,
    tables: &[PercentileTable],
    labels: &[String],
) -> PlotResult<Vec<FileSummary>> {
    let mut out = Vec::with_capacity(tables.len());
    for (i, (table, label)) in tables.iter().zip(labels).enumerate() {
        if table.is_empty() {
            warn!(label = %label, "skipping empty table in JSON export");
            continue;
        }
        let jitter = cfg.jitters.as_ref().and_then(|j| j.get(i).copied());
        let s = metrics::summarize(label, table, jitter.unwrap_or_default())?;
        out.push(FileSummary {
            label: label.clone(),
            file: cfg.files[i].clone(),
            rows: table.len(),
            min_ms: s.min_ms,
            median_ms: s.median_ms,
            max_ms: s.max_ms,
            jitter_us: jitter,
        });
    }
    Ok(out)
}
