//! Evaluation CLI: rank every test triple per model and aggregate rank
//! metrics per predicate into the metrics CSV.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{
    dataset::{self, TriplesFactory, FACTORY_FILE},
    embeddings::{EmbeddingStore, STORE_FILE},
    eval::{aggregate_per_relation, default_metrics, RankEvaluator},
    report, Config, ModelKind,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "evaluate")]
#[command(about = "Rank test triples per model and aggregate metrics per predicate")]
struct Args {
    /// Evaluate a single model instead of every configured one.
    #[arg(long)]
    model: Option<String>,

    /// Output CSV path (default: <metrics_dir>/predicate_metrics.csv).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let model_names = match args.model {
        Some(name) => vec![name],
        None => config.embeddings.models.clone(),
    };

    let test_triples = dataset::read_triples(&config.dataset.test_path)
        .with_context(|| format!("Failed to read {}", config.dataset.test_path.display()))?;
    let num_predicates: usize = test_triples
        .iter()
        .map(|t| t.predicate.as_str())
        .collect::<HashSet<_>>()
        .len();
    log::info!(
        "Loaded {} test triples over {} predicates",
        test_triples.len(),
        num_predicates
    );

    let valid_triples = dataset::read_triples(&config.dataset.valid_path)
        .with_context(|| format!("Failed to read {}", config.dataset.valid_path.display()))?;
    log::info!("Loaded {} validation triples for filtering", valid_triples.len());

    let metrics = default_metrics(&config.evaluation.hits_at);

    let start = Instant::now();
    let mut all_rows = Vec::new();

    for name in &model_names {
        let kind = ModelKind::from_name(name)?;
        let model_dir = config.model_dir(name);

        log::info!("Loading {} from {}", kind.name(), model_dir.display());
        let factory = TriplesFactory::from_path_binary(&model_dir.join(FACTORY_FILE))
            .with_context(|| format!("Failed to load factory for {}", kind.name()))?;
        let store = EmbeddingStore::from_path_binary(&model_dir.join(STORE_FILE))
            .with_context(|| format!("Failed to load embeddings for {}", kind.name()))?;

        if factory.num_entities() != store.num_entities()
            || factory.num_relations() != store.num_relations()
        {
            anyhow::bail!(
                "{}: factory ({} entities, {} relations) does not match store ({} entities, {} relations)",
                kind.name(),
                factory.num_entities(),
                factory.num_relations(),
                store.num_entities(),
                store.num_relations()
            );
        }
        log::info!(
            "{}: {} entities, {} relations, dimension {}",
            kind.name(),
            store.num_entities(),
            store.num_relations(),
            store.dim()
        );

        let mapped_test = factory
            .map_triples(&test_triples)
            .context("Test triples contain labels unknown to the training mapping")?;

        // Filter against everything known true: training (already mapped in
        // the factory), validation, and the test triples themselves.
        let mut evaluator = RankEvaluator::new(kind, &store)
            .with_progress_interval(config.evaluation.progress_interval);
        evaluator.add_filter_triples(factory.mapped_triples().iter().copied());
        evaluator.add_filter_triples(
            factory
                .map_triples(&valid_triples)
                .context("Validation triples contain labels unknown to the training mapping")?,
        );
        evaluator.add_filter_triples(mapped_test.iter().copied());
        log::info!(
            "Filter set holds {} known triples",
            evaluator.num_filter_triples()
        );

        let records = evaluator.evaluate(&mapped_test)?;
        let rows = aggregate_per_relation(&records, &metrics, kind.name(), |id| {
            factory.relation_label(id).map(str::to_string)
        });
        log::info!("{}: aggregated {} metric rows", kind.name(), rows.len());
        all_rows.extend(rows);
    }

    let output = args.output.unwrap_or_else(|| config.metrics_path());
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    report::write_metrics(&output, &all_rows)?;

    log::info!(
        "Wrote {} metric rows to {} in {:.1?}",
        all_rows.len(),
        output.display(),
        start.elapsed()
    );
    Ok(())
}
