//! # Source Indexer CLI (`srcidx`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `srcidx init` | Create the vector collection if it is missing |
//! | `srcidx index` | Scan, chunk, embed and upsert the configured sources |
//! | `srcidx query "<text>"` | Show the closest indexed chunks |
//! | `srcidx chunk <file>` | Print the chunks one file produces |
//!
//! Every command accepts `--config`. A missing config file means defaults.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use source_indexer::config::{self, Config};
use source_indexer::embedding::create_provider;
use source_indexer::ingest::{self, IndexReport};
use source_indexer::logging;
use source_indexer::qdrant::QdrantStore;
use source_indexer::query::{self, DEFAULT_TOP_K};
use source_indexer::scanner;
use source_indexer_core::chunk::{chunk_source_file, classify};

/// Source Indexer CLI: chunk a source tree and index it for semantic search.
#[derive(Parser)]
#[command(
    name = "srcidx",
    about = "Index a source tree into a vector database for semantic code search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is missing.
    #[arg(long, global = true, default_value = "./srcidx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the collection (embedder dims, cosine distance). Idempotent.
    Init,

    /// Index the configured roots and config files.
    Index {
        /// Directory to walk instead of the configured roots. Repeatable.
        #[arg(long = "root")]
        roots: Vec<String>,

        /// Scan and chunk only; report counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,

        /// Skip files that fail instead of aborting the run.
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Run a semantic query against the collection.
    Query {
        /// Natural-language query text.
        text: String,

        /// Number of results.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Print the chunks a single file is split into.
    Chunk {
        /// File to chunk.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Init => {
            let embedder = create_provider(&cfg.embedding)?;
            let store = QdrantStore::new(&cfg.store)?;
            let status =
                ingest::ensure_collection(&store, &cfg.store.collection, embedder.dims()).await?;
            println!("collection {}: {:?}", cfg.store.collection, status);
        }
        Commands::Index {
            roots,
            dry_run,
            continue_on_error,
        } => {
            if !roots.is_empty() {
                cfg.indexing.roots = roots;
            }
            if continue_on_error {
                cfg.indexing.continue_on_error = true;
            }
            run_index_command(&cfg, dry_run).await?;
        }
        Commands::Query { text, top_k } => {
            let embedder = create_provider(&cfg.embedding)?;
            let store = QdrantStore::new(&cfg.store)?;
            let hits =
                query::query_index(&*embedder, &store, &cfg.store.collection, &text, top_k)
                    .await?;
            query::print_hits(&hits);
        }
        Commands::Chunk { file } => {
            let name = file.display().to_string();
            let source = scanner::read_source_file(&file, &name, cfg.indexing.max_file_chars)?;
            let chunks = chunk_source_file(&source, &cfg.indexing.chunk_options());
            println!("{} ({:?}): {} chunks", name, classify(&name), chunks.len());
            for chunk in &chunks {
                println!(
                    "--- chunk {}/{} ({} chars) ---",
                    chunk.index + 1,
                    chunk.total_in_file,
                    chunk.text.chars().count()
                );
                println!("{}", chunk.text);
            }
        }
    }

    Ok(())
}

async fn run_index_command(cfg: &Config, dry_run: bool) -> anyhow::Result<()> {
    let base_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    let report = if dry_run {
        ingest::plan_index(&cfg.indexing, &base_dir)?
    } else {
        let embedder = create_provider(&cfg.embedding)?;
        let store = QdrantStore::new(&cfg.store)?;
        ingest::run_index(&cfg.indexing, &cfg.store, &*embedder, &store, &base_dir).await?
    };

    print_report(&cfg.store.collection, &report, dry_run);
    Ok(())
}

fn print_report(collection: &str, report: &IndexReport, dry_run: bool) {
    if dry_run {
        println!("index {} (dry-run)", collection);
        println!("  files found: {}", report.files_found);
        println!("  estimated chunks: {}", report.chunks_indexed);
        return;
    }

    println!("index {}", collection);
    println!("  files found: {}", report.files_found);
    println!("  files indexed: {}", report.files_indexed);
    println!("  chunks indexed: {}", report.chunks_indexed);
    if !report.failed_files.is_empty() {
        println!("  failed files: {}", report.failed_files.len());
        for file in &report.failed_files {
            println!("    {}", file);
        }
    }
    println!("ok");
}
