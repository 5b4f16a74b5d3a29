//! Resolve a raw dump and export the notebook
//!
//! Reads a JSON raw dump, gathers it into a repository backed by the
//! standard grammar, solves, and writes the deterministic notebook export.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sketchbook::{export_notebook, loader, standard_registry, RawRepository};

#[derive(Parser)]
#[command(name = "notebook-export")]
#[command(about = "Resolve a raw model dump into a notebook export")]
struct Args {
    /// Path to the JSON raw dump
    input: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let registry = standard_registry().context("building factory registry")?;
    let mut repository = RawRepository::new(&registry).context("seeding repository")?;
    let loaded = loader::load_path(&mut repository, &args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    tracing::info!(records = loaded, total = repository.len(), "gather complete");

    let notebook = repository.solve().context("solving")?;
    let rendered = export_notebook(&notebook).context("exporting notebook")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("wrote {} sketches to {}", notebook.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
