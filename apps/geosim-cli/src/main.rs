use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use geosim_aggregate::{Aggregator, IndexingHook, SidecarExtractor};
use geosim_core::config::{resolve_with_base, Config};
use geosim_similarity::{report, OverlapScorer, SimilarityEngine, SnapshotSource};

#[derive(Parser)]
#[command(name = "geosim", about = "Spatial summaries and similarity ranking for repository records")]
struct Cli {
    /// Directory holding config.toml / config.<env>.toml
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate a record document's files and print the enriched document
    Index {
        document: PathBuf,
        /// Overrides storage.data_root
        #[arg(long)]
        data_root: Option<PathBuf>,
    },
    /// Rank records from a snapshot by similarity to one record
    Similar {
        recid: String,
        /// JSON array of record documents, newest first
        #[arg(long)]
        records: PathBuf,
        /// Number of results (defaults to, and is capped at, similarity.default_size)
        #[arg(long)]
        size: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir).map_err(|e| { tracing::error!(error = %e, "Error loading config"); e })?;
    let settings = config.settings();

    match cli.command {
        Command::Index { document, data_root } => {
            let raw = fs::read_to_string(&document).with_context(|| format!("reading {}", document.display()))?;
            let mut value: serde_json::Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", document.display()))?;
            let doc = value.as_object_mut().ok_or_else(|| anyhow!("{} must contain a JSON object", document.display()))?;
            let root = data_root.unwrap_or_else(|| resolve_with_base(&cli.config_dir, &settings.storage.data_root));
            tracing::info!(data_root = %root.display(), "Indexing {}", document.display());
            let hook = IndexingHook::new(Aggregator::new(SidecarExtractor::new(), root));
            let outcome = hook.on_index(doc);
            tracing::info!(skipped = outcome.skipped.len(), has_bbox = outcome.summary.bbox.is_some(), "Index document ready");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Similar { recid, records, size } => {
            let source = SnapshotSource::load(&records)?;
            tracing::info!(records = source.len(), "Loaded snapshot {}", records.display());
            let scorer = OverlapScorer::new(settings.similarity.type_weight);
            let engine = SimilarityEngine::new(source, Box::new(scorer), settings.similarity.clone());
            let result = engine.similar(&recid, size.as_deref());
            println!("{}", serde_json::to_string_pretty(&report::to_json(&result))?);
        }
    }
    Ok(())
}
