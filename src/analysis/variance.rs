//! Cross-model variance per predicate.
//!
//! A predicate where the models disagree strongly is an interesting example
//! case; this module ranks predicates by how much the metric values vary
//! across models.

use crate::eval::{Metric, RankType, Side};
use crate::report::MetricRow;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A predicate's average cross-model metric variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateVariance {
    pub relation_label: String,
    pub variance: f64,
}

/// Rank predicates by the variance of their metric values across models.
///
/// Only rows matching `side` and `rank_type` are considered. For every
/// predicate, the population variance of Value across all models is taken
/// per metric and the variances are averaged over the selected metrics.
/// Predicates missing a (model, metric) cell are skipped: a variance over a
/// partial model set would not be comparable.
pub fn rank_by_cross_model_variance(
    rows: &[MetricRow],
    metrics: &[Metric],
    side: Side,
    rank_type: RankType,
) -> Vec<PredicateVariance> {
    let metric_names: Vec<String> = metrics.iter().map(Metric::name).collect();

    let selected: Vec<&MetricRow> = rows
        .iter()
        .filter(|r| r.side == side && r.rank_type == rank_type)
        .filter(|r| metric_names.iter().any(|m| *m == r.metric))
        .collect();

    let models: BTreeSet<&str> = selected.iter().map(|r| r.model.as_str()).collect();
    if models.is_empty() {
        return Vec::new();
    }

    // (label, metric) -> values across models
    let mut cells: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for row in &selected {
        cells
            .entry((row.relation_label.as_str(), row.metric.as_str()))
            .or_default()
            .push(row.value);
    }

    let labels: BTreeSet<&str> = selected
        .iter()
        .map(|r| r.relation_label.as_str())
        .collect();

    let mut variances = Vec::new();
    'labels: for label in labels {
        let mut sum = 0.0;
        for metric in &metric_names {
            match cells.get(&(label, metric.as_str())) {
                Some(values) if values.len() == models.len() => {
                    sum += population_variance(values);
                }
                // Incomplete cell: this predicate cannot be compared fairly.
                _ => continue 'labels,
            }
        }
        variances.push(PredicateVariance {
            relation_label: label.to_string(),
            variance: sum / metric_names.len() as f64,
        });
    }

    variances.sort_by(|a, b| {
        b.variance
            .total_cmp(&a.variance)
            .then_with(|| a.relation_label.cmp(&b.relation_label))
    });
    variances
}

fn population_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, model: &str, metric: &str, value: f64) -> MetricRow {
        MetricRow {
            relation_id: 0,
            relation_label: label.to_string(),
            model: model.to_string(),
            side: Side::Both,
            rank_type: RankType::Realistic,
            metric: metric.to_string(),
            value,
        }
    }

    #[test]
    fn ranks_by_average_variance() {
        let rows = vec![
            // P1: values 0.0 / 1.0 across two models -> variance 0.25
            row("P1", "a", "hits_at_5", 0.0),
            row("P1", "b", "hits_at_5", 1.0),
            // P2: identical values -> variance 0
            row("P2", "a", "hits_at_5", 0.5),
            row("P2", "b", "hits_at_5", 0.5),
        ];

        let ranked = rank_by_cross_model_variance(
            &rows,
            &[Metric::HitsAt(5)],
            Side::Both,
            RankType::Realistic,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].relation_label, "P1");
        assert!((ranked[0].variance - 0.25).abs() < 1e-9);
        assert_eq!(ranked[1].relation_label, "P2");
        assert_eq!(ranked[1].variance, 0.0);
    }

    #[test]
    fn averages_over_selected_metrics() {
        let rows = vec![
            row("P1", "a", "hits_at_5", 0.0),
            row("P1", "b", "hits_at_5", 1.0),
            row("P1", "a", "hits_at_10", 0.5),
            row("P1", "b", "hits_at_10", 0.5),
        ];

        let ranked = rank_by_cross_model_variance(
            &rows,
            &[Metric::HitsAt(5), Metric::HitsAt(10)],
            Side::Both,
            RankType::Realistic,
        );
        // (0.25 + 0.0) / 2
        assert!((ranked[0].variance - 0.125).abs() < 1e-9);
    }

    #[test]
    fn skips_predicates_with_missing_cells() {
        let rows = vec![
            row("P1", "a", "hits_at_5", 0.0),
            row("P1", "b", "hits_at_5", 1.0),
            // P2 is only present for model a.
            row("P2", "a", "hits_at_5", 0.3),
        ];

        let ranked = rank_by_cross_model_variance(
            &rows,
            &[Metric::HitsAt(5)],
            Side::Both,
            RankType::Realistic,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].relation_label, "P1");
    }

    #[test]
    fn filters_on_side_and_type() {
        let mut other = row("P1", "a", "hits_at_5", 0.9);
        other.side = Side::Head;
        let rows = vec![
            row("P1", "a", "hits_at_5", 0.0),
            row("P1", "b", "hits_at_5", 1.0),
            other,
        ];

        let ranked = rank_by_cross_model_variance(
            &rows,
            &[Metric::HitsAt(5)],
            Side::Both,
            RankType::Realistic,
        );
        // Head-side row must not leak into the both-side cells.
        assert!((ranked[0].variance - 0.25).abs() < 1e-9);
    }

    #[test]
    fn empty_input() {
        let ranked = rank_by_cross_model_variance(
            &[],
            &[Metric::HitsAt(5)],
            Side::Both,
            RankType::Realistic,
        );
        assert!(ranked.is_empty());
    }
}
