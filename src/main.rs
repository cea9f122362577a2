//! # docindex CLI (`dix`)
//!
//! Ingest text and PDF documents into a local vector index, query it, and
//! serve the agent capability table over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! dix --config ./config/dix.toml <command>
//! ```
//!
//! `DIX_CONFIG` is used when `--config` is not given.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dix init` | Create the index database and run schema migrations |
//! | `dix ingest <path> --type <text\|pdf>` | Load, chunk, embed, and index one file |
//! | `dix query "<text>" [-k N]` | Top-k passages for a query |
//! | `dix stats` | Entry and source counts, recorded embedding space |
//! | `dix tools list` | List the capability table |
//! | `dix tools call <name> --args '<json>'` | Invoke one tool |
//! | `dix serve` | Start the HTTP tool server |
//!
//! ## Examples
//!
//! ```bash
//! dix ingest ./docs/handbook.pdf --type pdf
//! dix query "who is on call this week?" -k 5
//! dix tools call weather --args '{"loc": "Beijing"}'
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docindex::action::Action;
use docindex::config;
use docindex::ingest;
use docindex::logging;
use docindex::search;
use docindex::server;
use docindex::sqlite_store::SqliteStore;
use docindex::stats;
use docindex::traits::{ToolContext, ToolRegistry};

/// docindex: a local document index for LLM agents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "dix",
    about = "docindex: ingest documents into a local vector index and serve retrieval tools",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, env = "DIX_CONFIG", default_value = "./config/dix.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the index database and schema. Idempotent.
    Init,

    /// Ingest one text or PDF file.
    Ingest {
        /// Path of the file to ingest.
        path: PathBuf,

        /// Document type: `text` (or `txt`) or `pdf`.
        #[arg(long = "type", default_value = "text")]
        file_type: String,
    },

    /// Retrieve the passages most similar to a query.
    Query {
        /// Query text.
        text: String,

        /// Number of passages (defaults to `[retrieval] top_k`).
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Show index statistics.
    Stats,

    /// Inspect or invoke the capability table.
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },

    /// Start the HTTP tool server on `[server] bind`.
    Serve,
}

#[derive(Subcommand)]
enum ToolsAction {
    /// List tools with their descriptions.
    List,

    /// Call a tool with JSON arguments and print the JSON result.
    Call {
        /// Tool name (e.g. `retrieve`).
        name: String,

        /// JSON argument object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    logging::init_with_config(&cfg.logging);

    match cli.command {
        Commands::Init => {
            let store = SqliteStore::open(&cfg.store.path).await?;
            store.close().await;
            println!("Index initialized at {}.", cfg.store.path.display());
        }
        Commands::Ingest { path, file_type } => {
            ingest::run_ingest(&cfg, &path, &file_type).await?;
        }
        Commands::Query { text, k } => {
            search::run_query(&cfg, &text, k).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Tools { action } => match action {
            ToolsAction::List => {
                let registry = ToolRegistry::with_builtins();
                for tool in registry.tools() {
                    println!("{:<12} {}", tool.name(), tool.description());
                }
            }
            ToolsAction::Call { name, args } => {
                let args: serde_json::Value = serde_json::from_str(&args)
                    .map_err(|e| anyhow::anyhow!("--args is not valid JSON: {}", e))?;
                let action = Action::from_call(&name, args)?;
                let ctx = ToolContext::open(cfg).await?;
                let registry = ToolRegistry::with_builtins();
                let result = registry.dispatch(&action, &ctx).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        },
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
