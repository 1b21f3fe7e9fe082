//! Prediction CLI: score whole triple files, or complete a
//! (head, relation, ?) query and check candidates against the splits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgeval::{
    dataset::{self, TriplesFactory, FACTORY_FILE},
    embeddings::{EmbeddingStore, STORE_FILE},
    eval::{RankType, Side},
    report, Config, ModelKind,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "predict")]
#[command(about = "Score triples or complete (head, relation, ?) queries with a trained model")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every triple in a tab-separated file.
    Triples {
        #[arg(long)]
        model: String,

        /// Input TSV of (subject, predicate, object) triples.
        #[arg(long)]
        input: PathBuf,

        /// Output CSV of scored triples.
        #[arg(long)]
        output: PathBuf,
    },
    /// Rank all entities as the tail of (head, relation, ?).
    Target {
        #[arg(long)]
        model: String,

        #[arg(long)]
        head: String,

        #[arg(long)]
        relation: String,

        /// Candidates to report (default: predict.top_k from config).
        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    head: &'a str,
    relation: &'a str,
    tail: &'a str,
    score: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    match args.command {
        Command::Triples {
            model,
            input,
            output,
        } => score_triples(&config, &model, &input, &output),
        Command::Target {
            model,
            head,
            relation,
            top_k,
        } => {
            let top_k = top_k.unwrap_or(config.predict.top_k);
            complete_target(&config, &model, &head, &relation, top_k)
        }
    }
}

fn load_model(config: &Config, model: &str) -> Result<(ModelKind, TriplesFactory, EmbeddingStore)> {
    let kind = ModelKind::from_name(model)?;
    let model_dir = config.model_dir(model);
    log::info!("Loading {} model from {}", kind.name(), model_dir.display());

    let factory = TriplesFactory::from_path_binary(&model_dir.join(FACTORY_FILE))
        .with_context(|| format!("Failed to load factory for {}", kind.name()))?;
    let store = EmbeddingStore::from_path_binary(&model_dir.join(STORE_FILE))
        .with_context(|| format!("Failed to load embeddings for {}", kind.name()))?;
    log::info!(
        "Training set: {} triples, {} entities, {} relations",
        factory.num_triples(),
        factory.num_entities(),
        factory.num_relations()
    );
    Ok((kind, factory, store))
}

fn score_triples(config: &Config, model: &str, input: &PathBuf, output: &PathBuf) -> Result<()> {
    let (kind, factory, store) = load_model(config, model)?;

    let triples = dataset::read_triples(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mapped = factory
        .map_triples(&triples)
        .context("Input triples contain labels unknown to the training mapping")?;
    log::info!("Scoring {} triples with {}", triples.len(), kind.name());

    let mut writer = csv::Writer::from_path(output)?;
    for (triple, &[h, r, t]) in triples.iter().zip(mapped.iter()) {
        let score = kind.score(store.entity(h)?, store.relation(r)?, store.entity(t)?);
        writer.serialize(ScoreRow {
            head: &triple.subject,
            relation: &triple.predicate,
            tail: &triple.object,
            score,
        })?;
    }
    writer.flush()?;

    log::info!("Saved predicted scores to {}", output.display());
    Ok(())
}

fn complete_target(
    config: &Config,
    model: &str,
    head: &str,
    relation: &str,
    top_k: usize,
) -> Result<()> {
    let (kind, factory, store) = load_model(config, model)?;

    let head_id = factory
        .entity_id(head)
        .with_context(|| format!("Entity {} not in the training mapping", head))?;
    let relation_id = factory
        .relation_id(relation)
        .with_context(|| format!("Relation {} not in the training mapping", relation))?;

    let head_emb = store.entity(head_id)?;
    let relation_emb = store.relation(relation_id)?;

    let mut scored: Vec<(u32, f32)> = Vec::with_capacity(store.num_entities());
    for candidate in 0..store.num_entities() as u32 {
        let score = kind.score(head_emb, relation_emb, store.entity(candidate)?);
        scored.push((candidate, score));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);

    let candidates: Vec<&str> = scored
        .iter()
        .filter_map(|&(id, _)| factory.entity_label(id))
        .collect();

    let in_train = split_membership(&config.dataset.train_path, head, relation, &candidates)?;
    let in_valid = split_membership(&config.dataset.valid_path, head, relation, &candidates)?;
    let in_test = split_membership(&config.dataset.test_path, head, relation, &candidates)?;

    println!("\nTop {} tails for ({}, {}, ?) under {}:\n", top_k, head, relation, kind.name());
    println!("{:-<72}", "");
    println!(
        "{:<6} {:<20} {:>12} {:>9} {:>9} {:>9}",
        "Rank", "Entity", "Score", "Train", "Valid", "Test"
    );
    println!("{:-<72}", "");
    for (position, &(id, score)) in scored.iter().enumerate() {
        let label = factory.entity_label(id).unwrap_or("?");
        println!(
            "{:<6} {:<20} {:>12.4} {:>9} {:>9} {:>9}",
            position + 1,
            label,
            score,
            mark(in_train.contains(label)),
            mark(in_valid.contains(label)),
            mark(in_test.contains(label))
        );
    }
    println!("{:-<72}", "");

    print_stored_metrics(config, kind, relation)?;
    Ok(())
}

fn mark(member: bool) -> &'static str {
    if member {
        "yes"
    } else {
        ""
    }
}

/// Which of `candidates` appear as the object of (head, relation, ?) in one
/// split file. One linear scan; the splits are large, the candidates few.
fn split_membership(
    path: &PathBuf,
    head: &str,
    relation: &str,
    candidates: &[&str],
) -> Result<HashSet<String>> {
    let wanted: HashSet<&str> = candidates.iter().copied().collect();
    let triples = dataset::read_triples(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(triples
        .iter()
        .filter(|t| t.subject == head && t.predicate == relation)
        .filter(|t| wanted.contains(t.object.as_str()))
        .map(|t| t.object.clone())
        .collect())
}

/// Print the stored per-predicate metrics for the query relation
/// (tail side, realistic ranks).
fn print_stored_metrics(config: &Config, kind: ModelKind, relation: &str) -> Result<()> {
    let metrics_path = config.metrics_path();
    let rows = report::read_metrics(&metrics_path)
        .with_context(|| format!("Failed to read {}", metrics_path.display()))?;

    let lookup = |metric: &str| -> String {
        rows.iter()
            .find(|r| {
                r.metric == metric
                    && r.relation_label == relation
                    && r.model.eq_ignore_ascii_case(kind.name())
                    && r.side == Side::Tail
                    && r.rank_type == RankType::Realistic
            })
            .map(|r| format!("{:.4}", r.value))
            .unwrap_or_else(|| "n/a".to_string())
    };

    println!("\nStored tail-side metrics for {} (realistic):", relation);
    println!("  Arithmetic mean rank: {}", lookup("arithmetic_mean_rank"));
    for k in &config.evaluation.hits_at {
        println!("  Hits at {:<2}:           {}", k, lookup(&format!("hits_at_{}", k)));
    }
    Ok(())
}
