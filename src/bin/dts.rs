//! dts CLI tool
//!
//! Command-line interface for parsing XBRL taxonomies with dts-core.
//!
//! ## Commands
//!
//! - `parse`: load a taxonomy from its entry-point schema and write the
//!   JSON artifacts plus a statistics report
//! - `stats`: recompute the statistics report from an existing artifact

use clap::{Parser, Subcommand};
use dts_core::{
    codec::TaxonomyLoader, config::LoaderConfig, model::Taxonomy, stats::TaxonomyStats,
    writer::TaxonomyWriter,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dts")]
#[command(author, version, about = "Parse XBRL taxonomies into JSON concept graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a taxonomy from its entry point and write JSON artifacts
    Parse {
        /// Base directory containing the taxonomy files
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Entry point XSD file (absolute, or relative to the base directory)
        #[arg(long)]
        entry: Option<PathBuf>,

        /// Directory to save the output JSON files
        #[arg(long)]
        output_dir: PathBuf,

        /// TOML configuration file; command-line flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Recompute the statistics report from an existing taxonomy JSON
    Stats {
        /// A complete_taxonomy.json produced by `dts parse`
        taxonomy: PathBuf,

        /// Directory for the report (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            base_dir,
            entry,
            output_dir,
            config,
        } => {
            let config = loader_config(base_dir, entry, config)?;
            let taxonomy = TaxonomyLoader::load(config)?;

            let writer = TaxonomyWriter::new(&taxonomy, &output_dir)?;
            let outputs = writer.write_all()?;
            TaxonomyStats::new(&taxonomy).save_report(&output_dir)?;

            println!(
                "Taxonomy parsing complete. Main output file: {}",
                outputs["main"].display()
            );
        }
        Commands::Stats {
            taxonomy,
            output_dir,
        } => {
            let content = std::fs::read_to_string(&taxonomy)?;
            let parsed: Taxonomy = serde_json::from_str(&content)?;
            let output_dir = output_dir
                .or_else(|| taxonomy.parent().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let report_path = TaxonomyStats::new(&parsed).save_report(&output_dir)?;
            println!("Statistics report saved to: {}", report_path.display());
        }
    }

    Ok(())
}

/// Combine `--config` with command-line overrides; both the base directory
/// and the entry point must come from one of the two.
fn loader_config(
    base_dir: Option<PathBuf>,
    entry: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<LoaderConfig, Box<dyn std::error::Error>> {
    let mut loaded = match config {
        Some(path) => Some(LoaderConfig::from_file(path)?),
        None => None,
    };

    if let Some(base_dir) = base_dir {
        match loaded.as_mut() {
            Some(config) => config.base_dir = base_dir,
            None => loaded = entry.clone().map(|entry| LoaderConfig::new(base_dir, entry)),
        }
    }
    if let (Some(config), Some(entry)) = (loaded.as_mut(), entry) {
        config.entry_point = entry;
    }

    loaded.ok_or_else(|| "either --config or both --base-dir and --entry are required".into())
}
