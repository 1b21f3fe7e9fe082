//! Distribution CLI: histograms of per-predicate metric values per model.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{
    analysis::{histogram, metric_values},
    eval::{Metric, RankType, Side},
    report, Config,
};
use std::path::PathBuf;

const BAR_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "distributions")]
#[command(about = "Histograms of per-predicate metric values across models")]
struct Args {
    /// Metrics to plot.
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

    /// Number of histogram bins.
    #[arg(long, default_value_t = 20)]
    bins: usize,

    /// Metrics CSV to read (default: <metrics_dir>/predicate_metrics.csv).
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    // Unknown metric names fail here, before any table is read.
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
    log::info!("Plotting {} metric distributions", metrics.len());

    for metric in &metrics {
        let name = metric.name();
        println!(
            "\n=== {} ({} / {}) ===",
            name,
            side.as_str(),
            rank_type.as_str()
        );

        for model in &config.embeddings.models {
            let values = metric_values(&rows, &name, model, side, rank_type);
            let Some(hist) = histogram(&values, args.bins) else {
                log::warn!("No {} rows for {} in {}", name, model, input.display());
                continue;
            };

            println!("\n{} ({} predicates):", model, values.len());
            let max_count = hist.max_count().max(1);
            for (bin, &count) in hist.counts.iter().enumerate() {
                let (low, high) = hist.bin_range(bin);
                let bar = BAR_WIDTH as u64 * count / max_count;
                println!(
                    "  [{:>12.4}, {:>12.4})  {:<width$} {}",
                    low,
                    high,
                    "#".repeat(bar as usize),
                    count,
                    width = BAR_WIDTH
                );
            }
        }
    }

    Ok(())
}
