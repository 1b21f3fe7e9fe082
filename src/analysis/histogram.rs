//! Metric value distributions across predicates.

use crate::eval::{RankType, Side};
use crate::report::MetricRow;

/// Fixed-width histogram over a value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Lower and upper edge of one bin.
    pub fn bin_range(&self, bin: usize) -> (f64, f64) {
        let width = (self.max - self.min) / self.counts.len() as f64;
        let low = self.min + bin as f64 * width;
        (low, low + width)
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bin values into `bins` equal-width buckets over their observed range.
///
/// Returns `None` for empty input or zero bins. A degenerate range (all
/// values equal) puts everything into the first bin.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if values.is_empty() || bins == 0 {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }

    let mut counts = vec![0u64; bins];
    let width = (max - min) / bins as f64;
    for &v in values {
        let bin = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }

    Some(Histogram { min, max, counts })
}

/// Extract one metric's per-predicate values for one model.
///
/// The counterpart of querying the metrics table by
/// Metric/model/Side/Type; model names compare case-insensitively.
pub fn metric_values(
    rows: &[MetricRow],
    metric: &str,
    model: &str,
    side: Side,
    rank_type: RankType,
) -> Vec<f64> {
    rows.iter()
        .filter(|r| {
            r.metric == metric
                && r.model.eq_ignore_ascii_case(model)
                && r.side == side
                && r.rank_type == rank_type
        })
        .map(|r| r.value)
        .collect()
}
