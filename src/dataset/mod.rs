//! Triple datasets: TSV split files and the label/id triples factory.

pub mod factory;

pub use factory::{MappedTriple, TriplesFactory, FACTORY_FILE};

use crate::error::{KgevalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A labeled (subject, predicate, object) fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Read triples from a tab-separated file with no header row.
///
/// Each line is `subject<TAB>predicate<TAB>object`. Lines with fewer than
/// three columns are a dataset error; extra columns are ignored.
pub fn read_triples(path: &Path) -> Result<Vec<Triple>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut triples = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < 3 {
            return Err(KgevalError::Dataset(format!(
                "{}: line {} has {} columns, expected 3",
                path.display(),
                line + 1,
                record.len()
            )));
        }
        triples.push(Triple::new(&record[0], &record[1], &record[2]));
    }

    Ok(triples)
}
