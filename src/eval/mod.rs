//! Rank-based evaluation: rank computation and per-predicate aggregation.

pub mod aggregate;
pub mod evaluator;
pub mod ranks;

pub use aggregate::{aggregate_per_relation, default_metrics, Metric};
pub use evaluator::RankEvaluator;
pub use ranks::{RankRecord, RankTally, RankType, Side, TripleRanks};
