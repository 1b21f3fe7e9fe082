//! The persisted predicate metrics table.
//!
//! One row per (relation, model, side, rank type, metric). Column names
//! match the table the downstream analysis tooling expects:
//! `relation_id,relation_label,model,Side,Type,Metric,Value`.

use crate::error::Result;
use crate::eval::{RankType, Side};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One aggregated metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub relation_id: u32,
    pub relation_label: String,
    pub model: String,
    #[serde(rename = "Side")]
    pub side: Side,
    #[serde(rename = "Type")]
    pub rank_type: RankType,
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Write the metrics table as CSV with a header row.
pub fn write_metrics(path: &Path, rows: &[MetricRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a metrics table written by [`write_metrics`].
pub fn read_metrics(path: &Path) -> Result<Vec<MetricRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<MetricRow>() {
        rows.push(row?);
    }
    Ok(rows)
}
