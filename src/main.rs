//! findex - index a JSON dataset in memory and search it

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use findex_index::dataset::{normalize_keyword, Dataset};
use findex_index::{
    Findex, FindexConfig, FindexKey, InMemoryBackend, Keyword, Label, LogicalMode, Location,
    ReferenceEngine,
};

#[derive(Parser, Debug)]
#[command(name = "findex")]
#[command(about = "Index a JSON dataset in memory and run a keyword search")]
struct Args {
    /// Path to the JSON dataset
    #[arg(long, env = "FINDEX_DATASET")]
    dataset: PathBuf,

    /// Keywords to search
    #[arg(required = true)]
    keywords: Vec<String>,

    /// How keyword results are combined (and | or)
    #[arg(long, env = "FINDEX_MODE", default_value = "or")]
    mode: LogicalMode,

    /// Index generation label
    #[arg(long, env = "FINDEX_LABEL", default_value = "findex-cli")]
    label: String,

    /// Keyword-to-keyword hops to follow (defaults to FINDEX_MAX_DEPTH or 1000)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Chain rows read per keyword, 0 = unlimited
    #[arg(long)]
    max_results_per_keyword: Option<usize>,

    /// Print results grouped per keyword instead of combined
    #[arg(long)]
    per_keyword: bool,

    /// Log per-call summaries at info
    #[arg(long, env = "FINDEX_VERBOSE")]
    verbose: bool,

    /// Log level
    #[arg(long, env = "FINDEX_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

fn render(location: &Location) -> String {
    location.to_string_lossy()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = FindexConfig::from_env();
    config.verbose |= args.verbose;
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max) = args.max_results_per_keyword {
        config.max_results_per_keyword = max;
    }

    let dataset = Dataset::load(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))?;
    let entries = dataset.to_entries();
    tracing::info!(
        records = dataset.records.len(),
        entries = entries.len(),
        "Dataset loaded"
    );

    // Keys live for this process only.
    let search_key = FindexKey::new(uuid::Uuid::new_v4().as_bytes().to_vec());
    let update_key = FindexKey::new(uuid::Uuid::new_v4().as_bytes().to_vec());
    let label = Label::from(args.label.as_str());

    let findex = Findex::with_config(
        Arc::new(InMemoryBackend::new()),
        Arc::new(ReferenceEngine::new()),
        config,
    );
    findex
        .upsert(&search_key, &update_key, &label, &entries)
        .await
        .context("indexing dataset")?;

    let keywords: Vec<Keyword> = args
        .keywords
        .iter()
        .map(|k| Keyword::from(normalize_keyword(k)))
        .collect();
    let options = findex.search_options().with_mode(args.mode);

    if args.per_keyword {
        let results = findex
            .search_per_keyword(&search_key, &label, &keywords, &options)
            .await
            .context("searching")?;
        for (keyword, locations) in results.iter() {
            let mut rendered: Vec<String> = locations.iter().map(render).collect();
            rendered.sort();
            println!("{}: {}", keyword.to_string_lossy(), rendered.join(", "));
        }
    } else {
        let locations = findex
            .search(&search_key, &label, &keywords, &options)
            .await
            .context("searching")?;
        let mut rendered: Vec<String> = locations.iter().map(render).collect();
        rendered.sort();
        for location in rendered {
            println!("{}", location);
        }
    }

    Ok(())
}
