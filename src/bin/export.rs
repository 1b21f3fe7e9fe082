//! Export CLI: convert a tab-separated triple split to Turtle.

use anyhow::{Context, Result};
use clap::Parser;
use kgeval::{dataset, Config};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const WIKIDATA_PREFIX: &str = "https://www.wikidata.org/wiki/";

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Convert a tab-separated triple split to Turtle")]
struct Args {
    /// Split to export: train, valid or test.
    #[arg(long, default_value = "train")]
    split: String,

    /// Output path (default: the split path with a .ttl extension).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let input = match args.split.as_str() {
        "train" => &config.dataset.train_path,
        "valid" => &config.dataset.valid_path,
        "test" => &config.dataset.test_path,
        other => anyhow::bail!("unknown split '{}', expected train, valid or test", other),
    };

    let triples = dataset::read_triples(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let output = args.output.unwrap_or_else(|| input.with_extension("ttl"));
    let file = std::fs::File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "@prefix wd: <{}> .", WIKIDATA_PREFIX)?;
    writeln!(writer)?;
    for triple in &triples {
        writeln!(
            writer,
            "wd:{} wd:{} wd:{} .",
            triple.subject, triple.predicate, triple.object
        )?;
    }
    writer.flush()?;

    log::info!("Wrote {} triples to {}", triples.len(), output.display());
    Ok(())
}
