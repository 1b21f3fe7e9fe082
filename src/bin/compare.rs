//! Comparison CLI: rank predicates by cross-model metric variance to find
//! example predicates where the models disagree most.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{
    analysis::rank_by_cross_model_variance,
    eval::{Metric, RankType, Side},
    report, Config,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Rank predicates by cross-model metric variance")]
struct Args {
    /// Metrics to compare on.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "arithmetic_mean_rank,hits_at_5,hits_at_10"
    )]
    metrics: Vec<String>,

    /// Evaluation side the values were aggregated on.
    #[arg(long, default_value = "both")]
    side: String,

    /// Rank type the values were aggregated on.
    #[arg(long, default_value = "realistic")]
    rank_type: String,

    /// Number of predicates to print.
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Metrics CSV to read (default: <metrics_dir>/predicate_metrics.csv).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Optionally write the full variance ranking as CSV.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let metrics = args
        .metrics
        .iter()
        .map(|name| Metric::parse(name))
        .collect::<kgeval::Result<Vec<Metric>>>()?;
    let side = Side::parse(&args.side)?;
    let rank_type = RankType::parse(&args.rank_type)?;

    let input = args.input.unwrap_or_else(|| config.metrics_path());
    let rows = report::read_metrics(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    log::info!("Loaded {} metric rows from {}", rows.len(), input.display());

    let ranking = rank_by_cross_model_variance(&rows, &metrics, side, rank_type);
    if ranking.is_empty() {
        anyhow::bail!(
            "No complete predicate entries for the selected metrics in {}",
            input.display()
        );
    }

    println!(
        "\nPredicates with the largest cross-model variance ({} / {}):\n",
        side.as_str(),
        rank_type.as_str()
    );
    println!("{:-<48}", "");
    println!("{:<24} {:>20}", "Predicate", "Variance");
    println!("{:-<48}", "");
    for entry in ranking.iter().take(args.top) {
        println!("{:<24} {:>20.6}", entry.relation_label, entry.variance);
    }
    println!("{:-<48}", "");

    if let Some(output) = args.output {
        let mut writer = csv::Writer::from_path(&output)?;
        for entry in &ranking {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        log::info!("Wrote {} rows to {}", ranking.len(), output.display());
    }

    Ok(())
}
