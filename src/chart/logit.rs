use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use std::ops::Range;

/// Smallest distance from 0 and 1 the logit transform is evaluated at.
const LOGIT_EPSILON: f64 = 1e-12;

/// `ln(p / (1 - p))`; spreads out percentiles close to 1.
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn inverse_logit(t: f64) -> f64 {
    1.0 / (1.0 + (-t).exp())
}

/// Whether `p` has an image on the logit axis. It is undefined at 0 and 1.
pub fn is_plottable(p: f64) -> bool {
    p > 0.0 && p < 1.0
}

fn clamped_logit(p: f64) -> f64 {
    logit(p.clamp(LOGIT_EPSILON, 1.0 - LOGIT_EPSILON))
}

/// Logit-scaled percentile axis for plotters whose key points are a fixed tick set.
#[derive(Debug, Clone)]
pub struct LogitRange {
    start: f64,
    end: f64,
    ticks: Vec<f64>,
}

impl LogitRange {
    /// Range covering `lo..=hi` with a small margin in logit space.
    pub fn covering(lo: f64, hi: f64, ticks: Vec<f64>) -> Self {
        let (t_lo, t_hi) = (clamped_logit(lo), clamped_logit(hi));
        let pad = if t_hi > t_lo { (t_hi - t_lo) * 0.02 } else { 1.0 };
        Self {
            start: inverse_logit(t_lo - pad),
            end: inverse_logit(t_hi + pad),
            ticks,
        }
    }
}

impl Ranged for LogitRange {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let (lo, hi) = (clamped_logit(self.start), clamped_logit(self.end));
        let frac = if hi > lo {
            (clamped_logit(*value) - lo) / (hi - lo)
        } else {
            0.5
        };
        limit.0 + (frac * f64::from(limit.1 - limit.0)).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // fixed ticks only; no minor grid
        if hint.weight().allow_light_points() {
            return Vec::new();
        }
        self.ticks
            .iter()
            .copied()
            .filter(|t| *t >= self.start && *t <= self.end)
            .collect()
    }

    fn range(&self) -> Range<f64> {
        self.start..self.end
    }
}
