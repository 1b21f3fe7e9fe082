//! The triples factory: entity/relation label mappings and mapped triples.
//!
//! A factory fixes the label -> id assignment a model was trained under.
//! Evaluation must map raw triples with the *trained* factory, never a fresh
//! one, or every score lookup would silently read the wrong embedding row.

use crate::dataset::Triple;
use crate::error::{KgevalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// File name of a persisted factory inside a model directory.
pub const FACTORY_FILE: &str = "training_factory.bin";

/// An id-mapped (head, relation, tail) triple.
pub type MappedTriple = [u32; 3];

/// Label/id mappings plus the mapped training triples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriplesFactory {
    entity_labels: Vec<String>,
    relation_labels: Vec<String>,
    mapped_triples: Vec<MappedTriple>,
    #[serde(skip)]
    entity_index: HashMap<String, u32>,
    #[serde(skip)]
    relation_index: HashMap<String, u32>,
}

fn build_index(labels: &[String]) -> HashMap<String, u32> {
    labels
        .iter()
        .enumerate()
        .map(|(id, label)| (label.clone(), id as u32))
        .collect()
}

impl TriplesFactory {
    /// Build a factory from labeled triples, assigning fresh ids.
    ///
    /// Ids are assigned in sorted label order so the mapping is deterministic
    /// for a given triple set.
    pub fn from_labeled_triples(triples: &[Triple]) -> Self {
        let mut entity_labels: Vec<String> = triples
            .iter()
            .flat_map(|t| [t.subject.clone(), t.object.clone()])
            .collect();
        entity_labels.sort();
        entity_labels.dedup();

        let mut relation_labels: Vec<String> =
            triples.iter().map(|t| t.predicate.clone()).collect();
        relation_labels.sort();
        relation_labels.dedup();

        let entity_index = build_index(&entity_labels);
        let relation_index = build_index(&relation_labels);
        // All labels came from the triples, so mapping cannot fail.
        let mapped_triples = triples
            .iter()
            .map(|t| {
                [
                    entity_index[&t.subject],
                    relation_index[&t.predicate],
                    entity_index[&t.object],
                ]
            })
            .collect();

        Self {
            entity_labels,
            relation_labels,
            mapped_triples,
            entity_index,
            relation_index,
        }
    }

    /// Build a factory from fixed label lists (id = position) and map the
    /// given triples under them. Unknown labels fail fast.
    pub fn from_mappings(
        entity_labels: Vec<String>,
        relation_labels: Vec<String>,
        triples: &[Triple],
    ) -> Result<Self> {
        let mut factory = Self {
            entity_index: build_index(&entity_labels),
            relation_index: build_index(&relation_labels),
            entity_labels,
            relation_labels,
            mapped_triples: Vec::new(),
        };
        if factory.entity_index.len() != factory.entity_labels.len() {
            return Err(KgevalError::Dataset(
                "entity mapping contains duplicate labels".to_string(),
            ));
        }
        if factory.relation_index.len() != factory.relation_labels.len() {
            return Err(KgevalError::Dataset(
                "relation mapping contains duplicate labels".to_string(),
            ));
        }
        factory.mapped_triples = factory.map_triples(triples)?;
        Ok(factory)
    }

    /// Map labeled triples under this factory's fixed mappings.
    ///
    /// Fails fast on the first label without an id.
    pub fn map_triples(&self, triples: &[Triple]) -> Result<Vec<MappedTriple>> {
        triples
            .iter()
            .map(|t| {
                let h = self
                    .entity_id(&t.subject)
                    .ok_or_else(|| KgevalError::EntityNotFound(t.subject.clone()))?;
                let r = self
                    .relation_id(&t.predicate)
                    .ok_or_else(|| KgevalError::RelationNotFound(t.predicate.clone()))?;
                let o = self
                    .entity_id(&t.object)
                    .ok_or_else(|| KgevalError::EntityNotFound(t.object.clone()))?;
                Ok([h, r, o])
            })
            .collect()
    }

    pub fn num_entities(&self) -> usize {
        self.entity_labels.len()
    }

    pub fn num_relations(&self) -> usize {
        self.relation_labels.len()
    }

    pub fn num_triples(&self) -> usize {
        self.mapped_triples.len()
    }

    /// The mapped training triples this factory was built over.
    pub fn mapped_triples(&self) -> &[MappedTriple] {
        &self.mapped_triples
    }

    pub fn entity_id(&self, label: &str) -> Option<u32> {
        self.entity_index.get(label).copied()
    }

    pub fn relation_id(&self, label: &str) -> Option<u32> {
        self.relation_index.get(label).copied()
    }

    pub fn entity_label(&self, id: u32) -> Option<&str> {
        self.entity_labels.get(id as usize).map(String::as_str)
    }

    pub fn relation_label(&self, id: u32) -> Option<&str> {
        self.relation_labels.get(id as usize).map(String::as_str)
    }

    /// Persist the factory as a single bincode file.
    pub fn to_path_binary(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a factory persisted with [`to_path_binary`](Self::to_path_binary).
    pub fn from_path_binary(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut factory: Self = bincode::deserialize_from(BufReader::new(file))?;
        // Indexes are skipped during serialization; rebuild them.
        factory.entity_index = build_index(&factory.entity_labels);
        factory.relation_index = build_index(&factory.relation_labels);
        Ok(factory)
    }
}
