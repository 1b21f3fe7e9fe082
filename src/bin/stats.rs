//! Predicate frequency statistics over the training split.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{analysis::predicate_frequencies, dataset, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stats")]
#[command(about = "Predicate, subject and object frequencies of the training split")]
struct Args {
    /// Number of predicates to print.
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Optionally write the full frequency table as CSV.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let triples = dataset::read_triples(&config.dataset.train_path)
        .with_context(|| format!("Failed to read {}", config.dataset.train_path.display()))?;
    let frequencies = predicate_frequencies(&triples);

    println!("\n=== Training Split Predicate Statistics ===\n");
    println!("Triples:    {}", triples.len());
    println!("Predicates: {}", frequencies.len());

    println!("\nTop {} predicates by triple count:\n", args.top.min(frequencies.len()));
    println!("{:-<64}", "");
    println!(
        "{:<16} {:>12} {:>16} {:>16}",
        "Predicate", "Triples", "Subjects", "Objects"
    );
    println!("{:-<64}", "");
    for frequency in frequencies.iter().take(args.top) {
        println!(
            "{:<16} {:>12} {:>16} {:>16}",
            frequency.predicate,
            frequency.triples,
            frequency.distinct_subjects,
            frequency.distinct_objects
        );
    }
    println!("{:-<64}", "");

    if let Some(output) = args.output {
        let mut writer = csv::Writer::from_path(&output)?;
        for frequency in &frequencies {
            writer.serialize(frequency)?;
        }
        writer.flush()?;
        log::info!("Wrote {} rows to {}", frequencies.len(), output.display());
    }

    Ok(())
}
