//! Percentile chart composition.
//!
//! Drawing goes through the [`ChartRenderer`] seam: the functions here decide *what* is on
//! the chart (curves, ticks, legend, summary box) and a renderer decides how it
//! ends up in a file. [`BitmapChart`] is the plotters-backed PNG implementation.

mod bitmap;
mod logit;

pub use bitmap::BitmapChart;

use crate::error::Result;
use crate::model::PercentileTable;
use std::path::Path;

pub const CHART_TITLE: &str = "Latency Percentiles (lower is better)";
pub const X_LABEL: &str = "Percentile";
pub const Y_LABEL: &str = "Latency (milliseconds)";
pub const LEGEND_COLUMNS: usize = 2;

/// Major ticks of the percentile axis.
pub const PERCENTILE_TICKS: [(f64, &str); 8] = [
    (0.25, "25%"),
    (0.5, "50%"),
    (0.9, "90%"),
    (0.99, "99%"),
    (0.999, "99.9%"),
    (0.9999, "99.99%"),
    (0.99999, "99.999%"),
    (0.999999, "99.9999%"),
];

/// Operations a chart backend has to support.
pub trait ChartRenderer {
    /// Add one curve; points are drawn in the given order.
    fn add_curve(&mut self, xs: &[f64], ys: &[f64]);
    /// Fixed major ticks for the x axis. Minor ticks are not labelled.
    fn set_tick_labels(&mut self, ticks: &[(f64, &str)]);
    fn set_labels(&mut self, title: &str, x_label: &str, y_label: &str);
    /// Legend entries, one per curve in curve order.
    fn set_legend(&mut self, labels: &[String], columns: usize);
    /// Text box drawn right of the plot area, top aligned.
    fn add_annotation_box(&mut self, text: &str);
    fn set_super_title(&mut self, title: &str);
    /// Render everything to `path`. Nothing is written before this call.
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Scene description shared by renderers. Filled through [`ChartRenderer`] calls.
#[derive(Debug, Clone, Default)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_ticks: Vec<(f64, String)>,
    pub curves: Vec<Vec<(f64, f64)>>,
    pub legend: Vec<String>,
    pub legend_columns: usize,
    pub annotation: Option<String>,
    pub super_title: String,
}

impl Figure {
    pub fn add_curve(&mut self, xs: &[f64], ys: &[f64]) {
        self.curves
            .push(xs.iter().copied().zip(ys.iter().copied()).collect());
    }

    pub fn set_tick_labels(&mut self, ticks: &[(f64, &str)]) {
        self.x_ticks = ticks.iter().map(|&(v, l)| (v, l.to_string())).collect();
    }

    pub fn set_labels(&mut self, title: &str, x_label: &str, y_label: &str) {
        self.title = title.to_string();
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
    }

    pub fn set_legend(&mut self, labels: &[String], columns: usize) {
        self.legend = labels.to_vec();
        self.legend_columns = columns.max(1);
    }
}

/// Draw one latency-vs-percentile curve per table on a logit percentile axis.
pub fn plot_percentiles<R: ChartRenderer>(
    chart: &mut R,
    tables: &[PercentileTable],
    labels: &[String],
) {
    for table in tables {
        let (xs, ys): (Vec<f64>, Vec<f64>) = table.points().unzip();
        chart.add_curve(&xs, &ys);
    }
    chart.set_labels(CHART_TITLE, X_LABEL, Y_LABEL);
    chart.set_tick_labels(&PERCENTILE_TICKS);
    chart.set_legend(labels, LEGEND_COLUMNS);
}

pub fn plot_summary_box<R: ChartRenderer>(chart: &mut R, text: &str) {
    chart.add_annotation_box(text);
}

/// Renderer that only records the scene; used to check chart composition.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingChart {
    pub figure: Figure,
    pub saved_to: Vec<std::path::PathBuf>,
}

#[cfg(test)]
impl ChartRenderer for RecordingChart {
    fn add_curve(&mut self, xs: &[f64], ys: &[f64]) {
        self.figure.add_curve(xs, ys);
    }
    fn set_tick_labels(&mut self, ticks: &[(f64, &str)]) {
        self.figure.set_tick_labels(ticks);
    }
    fn set_labels(&mut self, title: &str, x_label: &str, y_label: &str) {
        self.figure.set_labels(title, x_label, y_label);
    }
    fn set_legend(&mut self, labels: &[String], columns: usize) {
        self.figure.set_legend(labels, columns);
    }
    fn add_annotation_box(&mut self, text: &str) {
        self.figure.annotation = Some(text.to_string());
    }
    fn set_super_title(&mut self, title: &str) {
        self.figure.super_title = title.to_string();
    }
    fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_to.push(path.to_path_buf());
        Ok(())
    }
}
