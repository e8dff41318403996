//! # ChunkScope: scoped keyword retrieval over an educational corpus
//!
//! Usage:
//!   chunkscope serve                               # Start the HTTP gateway
//!   chunkscope search --board CBSE --grade 5 \
//!       --subject Math -k fraction -k decimal      # One-shot retrieval, JSON to stdout
//!   chunkscope import corpus.json                  # Load boards/books/chapters/chunks
//!   chunkscope stats                               # Corpus row counts

use anyhow::Result;
use chunkscope_core::config::ChunkScopeConfig;
use chunkscope_corpus::{CorpusSnapshot, SqliteCorpus};
use chunkscope_retrieval::{RetrievalRequest, RetrievalService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chunkscope",
    version,
    about = "📚 ChunkScope: scoped keyword retrieval over board/book/chapter content"
)]
struct Cli {
    /// Config file (defaults to $CHUNKSCOPE_CONFIG or ~/.chunkscope/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Corpus database path (overrides [corpus].db_path)
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Listen port (overrides [gateway].port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host (overrides [gateway].host)
        #[arg(long)]
        host: Option<String>,
    },
    /// Run one retrieval and print the response as JSON
    Search {
        #[arg(long)]
        board: String,
        #[arg(long)]
        grade: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        chapter: Option<String>,
        /// Seed keyword (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Load a corpus snapshot (JSON) into the database
    Import {
        file: PathBuf,
    },
    /// Print corpus row counts
    Stats,
}

fn load_config(cli: &Cli) -> Result<ChunkScopeConfig> {
    let mut config = match &cli.config {
        Some(path) => ChunkScopeConfig::load_from(path)?,
        None => ChunkScopeConfig::load()?,
    };
    if let Some(db_path) = &cli.db_path {
        config.corpus.db_path = db_path.clone();
    }
    Ok(config)
}

fn open_corpus(config: &ChunkScopeConfig) -> Result<SqliteCorpus> {
    Ok(SqliteCorpus::open(&config.corpus.resolved_db_path())?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "chunkscope=debug,chunkscope_retrieval=debug,chunkscope_corpus=debug,chunkscope_gateway=debug,tower_http=debug"
    } else {
        "chunkscope=info,chunkscope_retrieval=info,chunkscope_corpus=info,chunkscope_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(&cli)?;
    tracing::debug!(
        db_path = %config.corpus.resolved_db_path().display(),
        default_limit = config.retrieval.default_limit,
        max_limit = config.retrieval.max_limit,
        "config loaded"
    );

    match cli.command {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            chunkscope_gateway::start(config).await?;
        }
        Command::Search { board, grade, subject, chapter, keywords, limit } => {
            let corpus = Arc::new(open_corpus(&config)?);
            let service = RetrievalService::new(corpus, config.retrieval.clone());
            let request = RetrievalRequest {
                board: Some(board),
                grade: Some(grade),
                subject: Some(subject),
                chapter_id: chapter,
                seed_keywords: Some(keywords),
                limit,
            };
            let response = service.retrieve(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let snapshot = CorpusSnapshot::from_json(&json)?;
            let corpus = open_corpus(&config)?;
            let report = corpus.import(&snapshot)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Stats => {
            let corpus = open_corpus(&config)?;
            println!("{}", serde_json::to_string_pretty(&corpus.stats()?)?);
        }
    }
    Ok(())
}
