//! Conversion CLI: turn pretrained embedding dumps into this toolkit's
//! binary factory and embedding store files.
//!
//! A dump directory holds, per model: `entity_to_id.json`,
//! `relation_to_id.json`, `entity_embeddings.npy` and
//! `relation_embeddings.npy` as exported from the training framework.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{
    dataset::{self, TriplesFactory, FACTORY_FILE},
    embeddings::{load_npy_f32, EmbeddingStore, STORE_FILE},
    Config, ModelKind,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "convert")]
#[command(about = "Convert pretrained embedding dumps into factory and store binaries")]
struct Args {
    /// Convert a single model instead of every configured one.
    #[arg(long)]
    model: Option<String>,

    /// Directory holding one pretrained dump sub-directory per model.
    #[arg(long, default_value = "pretrained")]
    source: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let model_names = match args.model {
        Some(name) => vec![name],
        None => config.embeddings.models.clone(),
    };

    log::info!(
        "Loading training triples from {}",
        config.dataset.train_path.display()
    );
    let train_triples = dataset::read_triples(&config.dataset.train_path)
        .with_context(|| format!("Failed to read {}", config.dataset.train_path.display()))?;
    log::info!("Loaded {} training triples", train_triples.len());

    for name in &model_names {
        let kind = ModelKind::from_name(name)?;
        let src_dir = args.source.join(kind.dir_name());
        log::info!("Converting pretrained {} from {}", kind.name(), src_dir.display());

        let entity_map = read_id_map(&src_dir.join("entity_to_id.json"))?;
        let relation_map = read_id_map(&src_dir.join("relation_to_id.json"))?;
        let entity_labels = labels_in_id_order(&entity_map, "entity")?;
        let relation_labels = labels_in_id_order(&relation_map, "relation")?;

        let entity_data = load_npy_f32(&src_dir.join("entity_embeddings.npy"))?;
        let relation_data = load_npy_f32(&src_dir.join("relation_embeddings.npy"))?;

        let dim = matrix_dim(entity_data.len(), entity_labels.len(), "entity")?;
        let relation_dim = matrix_dim(relation_data.len(), relation_labels.len(), "relation")?;
        if dim != relation_dim {
            anyhow::bail!(
                "{}: entity dimension {} != relation dimension {}",
                kind.name(),
                dim,
                relation_dim
            );
        }
        if kind.requires_even_dim() && dim % 2 != 0 {
            anyhow::bail!(
                "{}: embeddings must have even dimension, got {}",
                kind.name(),
                dim
            );
        }

        let store = EmbeddingStore::from_flat(
            entity_data,
            relation_data,
            entity_labels.len(),
            relation_labels.len(),
            dim,
        )?;

        log::info!(
            "{}: {} entities, {} relations, dimension {}",
            kind.name(),
            store.num_entities(),
            store.num_relations(),
            store.dim()
        );

        let factory = TriplesFactory::from_mappings(entity_labels, relation_labels, &train_triples)
            .context("Training triples do not fit the pretrained mapping")?;

        let out_dir = config.model_dir(name);
        std::fs::create_dir_all(&out_dir)?;
        factory.to_path_binary(&out_dir.join(FACTORY_FILE))?;
        store.to_path_binary(&out_dir.join(STORE_FILE))?;
        log::info!(
            "{}: saved factory and embedding store to {}",
            kind.name(),
            out_dir.display()
        );
    }

    Ok(())
}

fn read_id_map(path: &Path) -> Result<HashMap<String, u32>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let map = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(map)
}

/// Invert a label -> id map into id-ordered labels.
///
/// Ids must form exactly 0..n; gaps and duplicates are conversion errors.
fn labels_in_id_order(map: &HashMap<String, u32>, what: &str) -> Result<Vec<String>> {
    let mut labels: Vec<Option<&str>> = vec![None; map.len()];
    for (label, &id) in map {
        let slot = labels.get_mut(id as usize).with_context(|| {
            format!("{} id {} out of range for {} labels", what, id, map.len())
        })?;
        if slot.replace(label.as_str()).is_some() {
            anyhow::bail!("{} id {} assigned twice", what, id);
        }
    }
    // Bijection: n distinct in-range ids over n slots leaves none empty.
    Ok(labels
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

fn matrix_dim(values: usize, rows: usize, what: &str) -> Result<usize> {
    if rows == 0 {
        anyhow::bail!("{} mapping is empty", what);
    }
    if values % rows != 0 {
        anyhow::bail!(
            "{} matrix holds {} values, not divisible by {} mapped rows",
            what,
            values,
            rows
        );
    }
    Ok(values / rows)
}
