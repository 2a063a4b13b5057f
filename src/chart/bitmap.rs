use super::logit::{self, LogitRange};
use super::{ChartRenderer, Figure};
use crate::error::{PlotError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// matplotlib's default cycle, so charts look familiar next to older plots.
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];
const LIGHT_CYAN: RGBColor = RGBColor(224, 255, 255);

const SUPER_TITLE_FONT: i32 = 30;
const CAPTION_FONT: i32 = 24;
const LABEL_FONT: i32 = 16;
const BOX_FONT: i32 = 15;

const CHART_MARGIN: i32 = 20;
const X_LABEL_AREA: i32 = 50;
const Y_LABEL_AREA: i32 = 80;
const LEGEND_ROW_HEIGHT: i32 = 24;
const LEGEND_PAD: i32 = 8;
/// Share of the image width reserved for the summary box.
const BOX_SHARE: f64 = 0.2;
const BOX_PAD: i32 = 12;
const BOX_RADIUS: i32 = 10;
const ARC_STEPS: usize = 6;

/// PNG (or any format plotters infers from the extension) renderer.
#[derive(Debug, Clone)]
pub struct BitmapChart {
    figure: Figure,
    width: u32,
    height: u32,
}

impl BitmapChart {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            figure: Figure::default(),
            width,
            height,
        }
    }
}

impl ChartRenderer for BitmapChart {
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

    /// Draw into a staging file next to `path` and move it into place once complete,
    /// so a failed render never leaves a partial image behind.
    fn save(&mut self, path: &Path) -> Result<()> {
        let staging = staging_file(path).map_err(|source| PlotError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        {
            let root = BitMapBackend::new(staging.path(), (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, &self.figure).map_err(|e| PlotError::render(e.to_string()))?;
            root.present()
                .map_err(|e| PlotError::render(e.to_string()))?;
        }

        staging.persist(path).map_err(|e| PlotError::Write {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        debug!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            curves = self.figure.curves.len(),
            "chart rendered"
        );
        Ok(())
    }
}

/// Temp file in the destination directory, created with the same mode a plain
/// `File::create` would get (0o666 minus umask) so `persist` keeps it readable.
fn staging_file(path: &Path) -> std::io::Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    let suffix = format!(".{ext}");
    let mut builder = tempfile::Builder::new();
    builder.prefix(".hdr-plot-").suffix(&suffix);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn series_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

fn draw_figure(root: &Area<'_>, fig: &Figure) -> DrawResult<()> {
    root.fill(&WHITE)?;
    let body = if fig.super_title.is_empty() {
        root.clone()
    } else {
        root.titled(
            &fig.super_title,
            ("sans-serif", SUPER_TITLE_FONT).into_font(),
        )?
    };

    let (plot_area, box_area) = if fig.annotation.is_some() {
        let (w, _) = body.dim_in_pixel();
        let (left, right) = body.split_horizontally((f64::from(w) * (1.0 - BOX_SHARE)) as u32);
        (left, Some(right))
    } else {
        (body, None)
    };

    let plot_area = if fig.title.is_empty() {
        plot_area
    } else {
        plot_area.titled(&fig.title, ("sans-serif", CAPTION_FONT).into_font())?
    };
    let (legend_area, chart_area) = plot_area.split_vertically(legend_height(fig));
    draw_legend(&legend_area, fig)?;
    draw_plot(&chart_area, fig)?;

    if let (Some(area), Some(text)) = (box_area, fig.annotation.as_deref()) {
        // top of the plotting rectangle, relative to the box column
        let top = chart_area.get_base_pixel().1 - area.get_base_pixel().1 + CHART_MARGIN;
        draw_summary_box(&area, text, top)?;
    }
    Ok(())
}

fn legend_height(fig: &Figure) -> u32 {
    if fig.legend.is_empty() {
        return 0;
    }
    let cols = fig.legend_columns.max(1);
    let rows = fig.legend.len().div_ceil(cols) as i32;
    (rows * LEGEND_ROW_HEIGHT + 2 * LEGEND_PAD) as u32
}

fn draw_legend(area: &Area<'_>, fig: &Figure) -> DrawResult<()> {
    if fig.legend.is_empty() {
        return Ok(());
    }
    let (w, h) = area.dim_in_pixel();
    let cols = fig.legend_columns.max(1);
    let left = CHART_MARGIN + Y_LABEL_AREA;
    let right = w as i32 - CHART_MARGIN;
    let col_width = (right - left) / cols as i32;

    area.draw(&Rectangle::new(
        [(left, 2), (right, h as i32 - 2)],
        BLACK.mix(0.3),
    ))?;

    let font = ("sans-serif", LABEL_FONT).into_font();
    for (i, label) in fig.legend.iter().enumerate() {
        let col = (i % cols) as i32;
        let row = (i / cols) as i32;
        let x = left + 10 + col * col_width;
        let y = LEGEND_PAD + row * LEGEND_ROW_HEIGHT + LEGEND_ROW_HEIGHT / 2;
        area.draw(&PathElement::new(
            vec![(x, y), (x + 30, y)],
            series_color(i).stroke_width(2),
        ))?;
        area.draw(&Text::new(
            label.as_str(),
            (x + 40, y - LABEL_FONT / 2),
            font.clone(),
        ))?;
    }
    Ok(())
}

/// Bounds of the plotted data: x over defined percentiles, y from zero.
fn data_bounds(curves: &[Vec<(f64, f64)>], fig: &Figure) -> ((f64, f64), f64) {
    let xs = curves.iter().flatten().map(|&(x, _)| x);
    let x_lo = xs.clone().fold(f64::INFINITY, f64::min);
    let x_hi = xs.fold(f64::NEG_INFINITY, f64::max);
    let x_bounds = if x_lo.is_finite() && x_hi.is_finite() {
        (x_lo, x_hi)
    } else {
        let first = fig.x_ticks.first().map_or(0.25, |t| t.0);
        let last = fig.x_ticks.last().map_or(0.999999, |t| t.0);
        (first, last)
    };
    let y_hi = curves
        .iter()
        .flatten()
        .map(|&(_, y)| y)
        .fold(0.0, f64::max);
    let y_max = if y_hi > 0.0 { y_hi * 1.05 } else { 1.0 };
    (x_bounds, y_max)
}

/// Curves with the points that have no image on the logit axis removed.
fn plottable_curves(fig: &Figure) -> Vec<Vec<(f64, f64)>> {
    let total: usize = fig.curves.iter().map(Vec::len).sum();
    let curves: Vec<Vec<(f64, f64)>> = fig
        .curves
        .iter()
        .map(|c| {
            c.iter()
                .copied()
                .filter(|&(x, y)| logit::is_plottable(x) && y.is_finite())
                .collect()
        })
        .collect();
    let kept: usize = curves.iter().map(Vec::len).sum();
    if kept < total {
        debug!(
            masked = total - kept,
            "points outside the percentile axis domain were not drawn"
        );
    }
    curves
}

fn draw_plot(area: &Area<'_>, fig: &Figure) -> DrawResult<()> {
    let curves = plottable_curves(fig);
    let ((x_lo, x_hi), y_max) = data_bounds(&curves, fig);
    let ticks: Vec<f64> = fig.x_ticks.iter().map(|(v, _)| *v).collect();
    let x_range = LogitRange::covering(x_lo, x_hi, ticks);

    let mut chart = ChartBuilder::on(area)
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, 0f64..y_max)?;

    let tick_label = |x: &f64| {
        fig.x_ticks
            .iter()
            .find(|(v, _)| (v - x).abs() < 1e-12)
            .map(|(_, l)| l.clone())
            .unwrap_or_else(|| format!("{:.4}%", x * 100.0))
    };
    chart
        .configure_mesh()
        .x_desc(fig.x_label.as_str())
        .y_desc(fig.y_label.as_str())
        .x_label_formatter(&tick_label)
        .y_label_formatter(&|y| format!("{y:.1}"))
        .label_style(("sans-serif", LABEL_FONT))
        .axis_desc_style(("sans-serif", LABEL_FONT))
        .draw()?;

    for (i, points) in curves.into_iter().enumerate() {
        chart.draw_series(LineSeries::new(points, series_color(i).stroke_width(2)))?;
    }
    Ok(())
}

fn draw_summary_box(area: &Area<'_>, text: &str, top: i32) -> DrawResult<()> {
    let style = ("monospace", BOX_FONT).into_font().color(&BLACK);
    let lines: Vec<&str> = text.lines().collect();
    let mut text_width = 0;
    for line in &lines {
        let (w, _) = area.estimate_text_size(line, &style)?;
        text_width = text_width.max(w as i32);
    }

    let (area_w, _) = area.dim_in_pixel();
    let line_height = BOX_FONT + 4;
    let x0 = 6;
    let x1 = (x0 + text_width + 2 * BOX_PAD).min(area_w as i32 - 2);
    let y1 = top + lines.len() as i32 * line_height + 2 * BOX_PAD;

    let outline = rounded_rect((x0, top), (x1, y1), BOX_RADIUS);
    area.draw(&Polygon::new(outline.clone(), LIGHT_CYAN.mix(0.5).filled()))?;
    let mut border = outline;
    if let Some(&first) = border.first() {
        border.push(first);
    }
    area.draw(&PathElement::new(border, BLACK.stroke_width(1)))?;

    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            *line,
            (x0 + BOX_PAD, top + BOX_PAD + i as i32 * line_height),
            style.clone(),
        ))?;
    }
    Ok(())
}

/// Outline of a rectangle with rounded corners, clockwise on screen starting at the top edge.
fn rounded_rect((x0, y0): (i32, i32), (x1, y1): (i32, i32), radius: i32) -> Vec<(i32, i32)> {
    let r = radius.min((x1 - x0) / 2).min((y1 - y0) / 2).max(0);
    let corners = [
        ((x1 - r, y0 + r), -90.0),
        ((x1 - r, y1 - r), 0.0),
        ((x0 + r, y1 - r), 90.0),
        ((x0 + r, y0 + r), 180.0),
    ];
    corners
        .iter()
        .flat_map(|&((cx, cy), start): &((i32, i32), f64)| {
            (0..=ARC_STEPS).map(move |step| {
                let a = (start + 90.0 * step as f64 / ARC_STEPS as f64).to_radians();
                (
                    cx + (f64::from(r) * a.cos()).round() as i32,
                    cy + (f64::from(r) * a.sin()).round() as i32,
                )
            })
        })
        .collect()
}
