//! Downstream analysis over the persisted metrics table and raw splits.

pub mod frequency;
pub mod histogram;
pub mod variance;

pub use frequency::{predicate_frequencies, PredicateFrequency};
pub use histogram::{histogram, metric_values, Histogram};
pub use variance::{rank_by_cross_model_variance, PredicateVariance};
