//! Embedding store: one matrix row per entity/relation id.

use crate::error::{KgevalError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// File name of a persisted store inside a model directory.
pub const STORE_FILE: &str = "embeddings.bin";

/// Entity and relation embedding matrices for one trained model.
///
/// Row index is the factory id. Both matrices share one dimensionality;
/// models with composite layouts (ComplEx, SimplE) pack their parts into a
/// single even-length row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingStore {
    entities: Array2<f32>,
    relations: Array2<f32>,
}

impl EmbeddingStore {
    pub fn new(entities: Array2<f32>, relations: Array2<f32>) -> Result<Self> {
        if entities.ncols() != relations.ncols() {
            return Err(KgevalError::Shape(format!(
                "entity dimension {} != relation dimension {}",
                entities.ncols(),
                relations.ncols()
            )));
        }
        Ok(Self {
            entities,
            relations,
        })
    }

    /// Build a store from flat row-major data.
    pub fn from_flat(
        entity_data: Vec<f32>,
        relation_data: Vec<f32>,
        num_entities: usize,
        num_relations: usize,
        dim: usize,
    ) -> Result<Self> {
        let entities = Array2::from_shape_vec((num_entities, dim), entity_data)
            .map_err(|e| KgevalError::Shape(format!("entity matrix: {}", e)))?;
        let relations = Array2::from_shape_vec((num_relations, dim), relation_data)
            .map_err(|e| KgevalError::Shape(format!("relation matrix: {}", e)))?;
        Self::new(entities, relations)
    }

    pub fn num_entities(&self) -> usize {
        self.entities.nrows()
    }

    pub fn num_relations(&self) -> usize {
        self.relations.nrows()
    }

    pub fn dim(&self) -> usize {
        self.entities.ncols()
    }

    /// Embedding row for an entity id.
    pub fn entity(&self, id: u32) -> Result<&[f32]> {
        row(&self.entities, id, "entity")
    }

    /// Embedding row for a relation id.
    pub fn relation(&self, id: u32) -> Result<&[f32]> {
        row(&self.relations, id, "relation")
    }

    /// Persist the store as a single bincode file.
    pub fn to_path_binary(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a store persisted with [`to_path_binary`](Self::to_path_binary).
    pub fn from_path_binary(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let store: Self = bincode::deserialize_from(BufReader::new(file))?;
        if store.entities.ncols() != store.relations.ncols() {
            return Err(KgevalError::Shape(format!(
                "{}: entity dimension {} != relation dimension {}",
                path.display(),
                store.entities.ncols(),
                store.relations.ncols()
            )));
        }
        Ok(store)
    }
}

fn row<'a>(matrix: &'a Array2<f32>, id: u32, what: &str) -> Result<&'a [f32]> {
    let i = id as usize;
    if i >= matrix.nrows() {
        return Err(KgevalError::Shape(format!(
            "{} id {} out of range (matrix has {} rows)",
            what,
            id,
            matrix.nrows()
        )));
    }
    matrix
        .row(i)
        .to_slice()
        .ok_or_else(|| KgevalError::Shape(format!("{} matrix is not row-contiguous", what)))
}
