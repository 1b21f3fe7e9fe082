//! Summary CLI: compare training losses and overall metrics across models
//! from the results.json files the training pipeline left behind.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{eval::Metric, Config, ModelKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

const RESULTS_FILE: &str = "results.json";

#[derive(Parser, Debug)]
#[command(name = "summary")]
#[command(about = "Compare training losses and overall metrics across models")]
struct Args {
    /// Evaluation side to read from results.json.
    #[arg(long, default_value = "both")]
    side: String,

    /// Rank type to read from results.json.
    #[arg(long, default_value = "optimistic")]
    rank_type: String,

    /// Metrics to tabulate.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "hits_at_1,hits_at_3,hits_at_5,hits_at_10,arithmetic_mean_rank,median_rank"
    )]
    metrics: Vec<String>,
}

/// Shape of a results.json as written by the training pipeline.
#[derive(Debug, Deserialize)]
struct TrainingResults {
    losses: Vec<f64>,
    /// side -> rank type -> metric name -> value
    metrics: HashMap<String, HashMap<String, HashMap<String, f64>>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    // Validate metric names up front so a typo fails before any IO.
    for name in &args.metrics {
        Metric::parse(name)?;
    }

    let mut loaded: Vec<(String, TrainingResults)> = Vec::new();
    for name in &config.embeddings.models {
        let kind = ModelKind::from_name(name)?;
        let path = config.model_dir(name).join(RESULTS_FILE);
        if !path.exists() {
            log::warn!("{}: no {} at {}, skipping", kind.name(), RESULTS_FILE, path.display());
            continue;
        }
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let results: TrainingResults = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::info!(
            "{}: {} epochs of losses",
            kind.name(),
            results.losses.len()
        );
        loaded.push((kind.name().to_string(), results));
    }

    if loaded.is_empty() {
        anyhow::bail!("No {} found for any configured model", RESULTS_FILE);
    }

    print_losses(&loaded);
    print_metrics(&loaded, &args.side, &args.rank_type, &args.metrics);
    Ok(())
}

fn print_losses(loaded: &[(String, TrainingResults)]) {
    let epochs = loaded
        .iter()
        .map(|(_, r)| r.losses.len())
        .max()
        .unwrap_or(0);

    println!("\n=== Training Loss per Epoch ===\n");
    print!("{:<8}", "Epoch");
    for (model, _) in loaded {
        print!(" {:>14}", model);
    }
    println!();
    println!("{:-<1$}", "", 8 + loaded.len() * 15);

    for epoch in 0..epochs {
        print!("{:<8}", epoch);
        for (_, results) in loaded {
            match results.losses.get(epoch) {
                Some(loss) => print!(" {:>14.6}", loss),
                None => print!(" {:>14}", "-"),
            }
        }
        println!();
    }
}

fn print_metrics(
    loaded: &[(String, TrainingResults)],
    side: &str,
    rank_type: &str,
    metrics: &[String],
) {
    println!("\n=== Overall Metrics ({} / {}) ===\n", side, rank_type);
    print!("{:<28}", "Metric");
    for (model, _) in loaded {
        print!(" {:>14}", model);
    }
    println!();
    println!("{:-<1$}", "", 28 + loaded.len() * 15);

    for metric in metrics {
        print!("{:<28}", metric);
        for (_, results) in loaded {
            let value = results
                .metrics
                .get(side)
                .and_then(|types| types.get(rank_type))
                .and_then(|values| values.get(metric));
            match value {
                Some(value) => print!(" {:>14.6}", value),
                None => print!(" {:>14}", "-"),
            }
        }
        println!();
    }
    println!();
}
