//! Per-predicate aggregation of rank records.
//!
//! Rank records are partitioned by relation, then by (side, rank type);
//! each non-empty partition is summarized under a set of named metrics.
//! Empty partitions contribute no rows, so a relation absent from the
//! input never appears in the output.

use crate::error::{KgevalError, Result};
use crate::eval::ranks::{RankRecord, RankType, Side};
use crate::report::MetricRow;
use std::collections::BTreeMap;

/// A named aggregate metric over a set of ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ArithmeticMeanRank,
    MedianRank,
    GeometricMeanRank,
    HarmonicMeanRank,
    /// Mean reciprocal rank.
    InverseHarmonicMeanRank,
    HitsAt(u32),
}

impl Metric {
    /// The metric's column name in the persisted table.
    pub fn name(&self) -> String {
        match self {
            Metric::ArithmeticMeanRank => "arithmetic_mean_rank".to_string(),
            Metric::MedianRank => "median_rank".to_string(),
            Metric::GeometricMeanRank => "geometric_mean_rank".to_string(),
            Metric::HarmonicMeanRank => "harmonic_mean_rank".to_string(),
            Metric::InverseHarmonicMeanRank => "inverse_harmonic_mean_rank".to_string(),
            Metric::HitsAt(k) => format!("hits_at_{}", k),
        }
    }

    /// Parse a metric name. Unknown names fail fast rather than being
    /// silently skipped.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "arithmetic_mean_rank" => Ok(Metric::ArithmeticMeanRank),
            "median_rank" => Ok(Metric::MedianRank),
            "geometric_mean_rank" => Ok(Metric::GeometricMeanRank),
            "harmonic_mean_rank" => Ok(Metric::HarmonicMeanRank),
            "inverse_harmonic_mean_rank" => Ok(Metric::InverseHarmonicMeanRank),
            _ => {
                if let Some(k) = name.strip_prefix("hits_at_") {
                    let k: u32 = k
                        .parse()
                        .map_err(|_| KgevalError::UnknownMetric(name.to_string()))?;
                    if k == 0 {
                        return Err(KgevalError::UnknownMetric(name.to_string()));
                    }
                    return Ok(Metric::HitsAt(k));
                }
                Err(KgevalError::UnknownMetric(name.to_string()))
            }
        }
    }

    /// Compute the metric over a non-empty rank set.
    pub fn compute(&self, ranks: &[f64]) -> f64 {
        debug_assert!(!ranks.is_empty(), "empty partitions must be skipped");
        let n = ranks.len() as f64;
        match self {
            Metric::ArithmeticMeanRank => ranks.iter().sum::<f64>() / n,
            Metric::MedianRank => {
                let mut sorted = ranks.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    sorted[mid]
                } else {
                    0.5 * (sorted[mid - 1] + sorted[mid])
                }
            }
            Metric::GeometricMeanRank => (ranks.iter().map(|r| r.ln()).sum::<f64>() / n).exp(),
            Metric::HarmonicMeanRank => n / ranks.iter().map(|r| 1.0 / r).sum::<f64>(),
            Metric::InverseHarmonicMeanRank => ranks.iter().map(|r| 1.0 / r).sum::<f64>() / n,
            Metric::HitsAt(k) => {
                let k = *k as f64;
                ranks.iter().filter(|&&r| r <= k).count() as f64 / n
            }
        }
    }
}

/// The metric set the evaluation binaries compute by default.
pub fn default_metrics(hits_at: &[u32]) -> Vec<Metric> {
    let mut metrics = vec![
        Metric::ArithmeticMeanRank,
        Metric::MedianRank,
        Metric::GeometricMeanRank,
        Metric::HarmonicMeanRank,
        Metric::InverseHarmonicMeanRank,
    ];
    metrics.extend(hits_at.iter().map(|&k| Metric::HitsAt(k)));
    metrics
}

/// Rank lists of one relation for one rank type.
#[derive(Debug, Default)]
struct Partition {
    head: Vec<f64>,
    tail: Vec<f64>,
    /// Records that arrived already tagged as combined.
    both: Vec<f64>,
}

impl Partition {
    fn ranks_for(&self, side: Side) -> Vec<f64> {
        match side {
            Side::Head => self.head.clone(),
            Side::Tail => self.tail.clone(),
            Side::Both => {
                let mut combined =
                    Vec::with_capacity(self.head.len() + self.tail.len() + self.both.len());
                combined.extend_from_slice(&self.head);
                combined.extend_from_slice(&self.tail);
                combined.extend_from_slice(&self.both);
                combined
            }
        }
    }
}

/// Aggregate rank records into one metric row per
/// (relation, side, rank type, metric).
///
/// The three rank types are independent input streams; records of one type
/// never influence another. `label_of` resolves relation labels; a relation
/// without a label falls back to its numeric identifier.
pub fn aggregate_per_relation(
    records: &[RankRecord],
    metrics: &[Metric],
    model: &str,
    mut label_of: impl FnMut(u32) -> Option<String>,
) -> Vec<MetricRow> {
    let mut partitions: BTreeMap<u32, [Partition; 3]> = BTreeMap::new();

    for record in records {
        let by_type = partitions.entry(record.relation_id).or_default();
        let partition = &mut by_type[record.rank_type.index()];
        match record.side {
            Side::Head => partition.head.push(record.rank),
            Side::Tail => partition.tail.push(record.rank),
            Side::Both => partition.both.push(record.rank),
        }
    }

    let mut rows = Vec::new();
    for (&relation_id, by_type) in &partitions {
        let relation_label =
            label_of(relation_id).unwrap_or_else(|| relation_id.to_string());

        for side in Side::ALL {
            for rank_type in RankType::ALL {
                let ranks = by_type[rank_type.index()].ranks_for(side);
                if ranks.is_empty() {
                    continue;
                }
                for metric in metrics {
                    rows.push(MetricRow {
                        relation_id,
                        relation_label: relation_label.clone(),
                        model: model.to_string(),
                        side,
                        rank_type,
                        metric: metric.name(),
                        value: metric.compute(&ranks),
                    });
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(relation_id: u32, side: Side, rank_type: RankType, rank: f64) -> RankRecord {
        RankRecord {
            relation_id,
            side,
            rank_type,
            rank,
            num_candidates: 100,
        }
    }

    /// Tail-side realistic records for one relation, one per rank.
    fn tail_records(relation_id: u32, ranks: &[f64]) -> Vec<RankRecord> {
        ranks
            .iter()
            .map(|&r| record(relation_id, Side::Tail, RankType::Realistic, r))
            .collect()
    }

    fn value_of<'a>(
        rows: &'a [MetricRow],
        side: Side,
        rank_type: RankType,
        metric: &str,
    ) -> Option<&'a MetricRow> {
        rows.iter()
            .find(|r| r.side == side && r.rank_type == rank_type && r.metric == metric)
    }

    #[test]
    fn known_values() {
        // Ranks [1, 2, 5, 10]: hits@5 = 0.75, mean = 4.5.
        let records = tail_records(7, &[1.0, 2.0, 5.0, 10.0]);
        let rows = aggregate_per_relation(
            &records,
            &[Metric::ArithmeticMeanRank, Metric::HitsAt(5)],
            "TransE",
            |_| Some("P31".to_string()),
        );

        let mean = value_of(&rows, Side::Tail, RankType::Realistic, "arithmetic_mean_rank")
            .unwrap();
        assert!((mean.value - 4.5).abs() < 1e-9);
        let hits = value_of(&rows, Side::Tail, RankType::Realistic, "hits_at_5").unwrap();
        assert!((hits.value - 0.75).abs() < 1e-9);
        assert_eq!(mean.relation_label, "P31");
        assert_eq!(mean.model, "TransE");
    }

    #[test]
    fn hits_at_k_is_monotone_in_k() {
        let records = tail_records(1, &[1.0, 3.0, 4.0, 8.0, 20.0, 50.0]);
        let metrics: Vec<Metric> = [1, 3, 5, 10].iter().map(|&k| Metric::HitsAt(k)).collect();
        let rows = aggregate_per_relation(&records, &metrics, "m", |_| None);

        let values: Vec<f64> = [1, 3, 5, 10]
            .iter()
            .map(|k| {
                value_of(&rows, Side::Tail, RankType::Realistic, &format!("hits_at_{}", k))
                    .unwrap()
                    .value
            })
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn mean_rank_at_least_one() {
        let records = tail_records(1, &[1.0, 1.0, 2.0]);
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);
        assert!(rows[0].value >= 1.0);
    }

    #[test]
    fn singleton_rank_hits() {
        // A single rank of 3: hits@k is 1.0 for k >= 3, else 0.0.
        let records = tail_records(1, &[3.0]);
        let metrics: Vec<Metric> = [1, 3, 5, 10].iter().map(|&k| Metric::HitsAt(k)).collect();
        let rows = aggregate_per_relation(&records, &metrics, "m", |_| None);

        for (k, expected) in [(1, 0.0), (3, 1.0), (5, 1.0), (10, 1.0)] {
            let row = value_of(&rows, Side::Tail, RankType::Realistic, &format!("hits_at_{}", k))
                .unwrap();
            assert_eq!(row.value, expected, "hits_at_{}", k);
        }
    }

    #[test]
    fn relations_are_never_mixed() {
        let mut records = tail_records(1, &[1.0, 1.0]);
        records.extend(tail_records(2, &[100.0, 100.0]));
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].relation_id, 1);
        assert!((rows[0].value - 1.0).abs() < 1e-9);
        assert_eq!(rows[1].relation_id, 2);
        assert!((rows[1].value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn absent_relation_produces_no_rows() {
        let records = tail_records(1, &[2.0]);
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);
        assert!(rows.iter().all(|r| r.relation_id == 1));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn rank_types_are_independent_streams() {
        let records = vec![
            record(1, Side::Tail, RankType::Optimistic, 1.0),
            record(1, Side::Tail, RankType::Pessimistic, 9.0),
            record(1, Side::Tail, RankType::Realistic, 5.0),
        ];
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);

        assert_eq!(
            value_of(&rows, Side::Tail, RankType::Optimistic, "arithmetic_mean_rank")
                .unwrap()
                .value,
            1.0
        );
        assert_eq!(
            value_of(&rows, Side::Tail, RankType::Pessimistic, "arithmetic_mean_rank")
                .unwrap()
                .value,
            9.0
        );
        assert_eq!(
            value_of(&rows, Side::Tail, RankType::Realistic, "arithmetic_mean_rank")
                .unwrap()
                .value,
            5.0
        );
    }

    #[test]
    fn both_combines_head_and_tail() {
        let records = vec![
            record(1, Side::Head, RankType::Realistic, 2.0),
            record(1, Side::Tail, RankType::Realistic, 4.0),
        ];
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);

        let both = value_of(&rows, Side::Both, RankType::Realistic, "arithmetic_mean_rank")
            .unwrap();
        assert!((both.value - 3.0).abs() < 1e-9);
        let head = value_of(&rows, Side::Head, RankType::Realistic, "arithmetic_mean_rank")
            .unwrap();
        assert!((head.value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_label_falls_back_to_identifier() {
        let records = tail_records(42, &[1.0]);
        let rows =
            aggregate_per_relation(&records, &[Metric::ArithmeticMeanRank], "m", |_| None);
        assert_eq!(rows[0].relation_label, "42");
    }

    #[test]
    fn aggregation_is_deterministic() {
        let mut records = tail_records(2, &[4.0, 2.0, 9.0]);
        records.extend(tail_records(1, &[1.0, 7.0]));
        records.push(record(1, Side::Head, RankType::Optimistic, 3.0));

        let metrics = default_metrics(&[1, 3, 5, 10]);
        let first = aggregate_per_relation(&records, &metrics, "m", |_| None);
        let second = aggregate_per_relation(&records, &metrics, "m", |_| None);
        assert_eq!(first, second);
    }

    #[test]
    fn median_of_even_sets_averages() {
        let records = tail_records(1, &[1.0, 2.0, 5.0, 10.0]);
        let rows = aggregate_per_relation(&records, &[Metric::MedianRank], "m", |_| None);
        assert!((rows[0].value - 3.5).abs() < 1e-9);
    }

    #[test]
    fn mrr_matches_reciprocal_mean() {
        let records = tail_records(1, &[1.0, 2.0, 4.0]);
        let rows =
            aggregate_per_relation(&records, &[Metric::InverseHarmonicMeanRank], "m", |_| None);
        let expected = (1.0 + 0.5 + 0.25) / 3.0;
        assert!((rows[0].value - expected).abs() < 1e-9);
    }

    #[test]
    fn geometric_and_harmonic_means() {
        let ranks = [1.0, 4.0];
        assert!((Metric::GeometricMeanRank.compute(&ranks) - 2.0).abs() < 1e-9);
        assert!((Metric::HarmonicMeanRank.compute(&ranks) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn parse_round_trips_names() {
        for metric in default_metrics(&[1, 3, 5, 10]) {
            assert_eq!(Metric::parse(&metric.name()).unwrap(), metric);
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!(matches!(
            Metric::parse("adjusted_mean_rank"),
            Err(KgevalError::UnknownMetric(_))
        ));
        assert!(matches!(
            Metric::parse("hits_at_zero"),
            Err(KgevalError::UnknownMetric(_))
        ));
        assert!(matches!(
            Metric::parse("hits_at_0"),
            Err(KgevalError::UnknownMetric(_))
        ));
    }
}
