//! `crag`: streaming local chat and a corrective RAG question answerer.

mod ask;
mod chat;
mod index;
mod logging;
mod providers;

use std::path::PathBuf;

use clap::Parser;
use crag_config::CragConfig;

#[derive(Parser, Debug)]
#[command(name = "crag", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./crag.toml, then ~/.crag/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Chat with the local Ollama model
    Chat,
    /// Answer a question with the corrective RAG pipeline
    Ask {
        question: String,
        /// Also print the answer translated into `rag.translate_to`
        #[arg(long)]
        translate: bool,
        /// Route the question to web search or the vector store first
        #[arg(long)]
        route: bool,
        /// Print the workflow graph as a Mermaid diagram before running
        #[arg(long)]
        mermaid: bool,
    },
    /// Load, split and embed the source pages into the vector store
    Index {
        /// Pages to index instead of `rag.urls`
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Rebuild even if a saved collection exists
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = CragConfig::load(cli.config.as_deref())?;
    let _guard = logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Chat => chat::run(&config).await?,
        Commands::Ask {
            question,
            translate,
            route,
            mermaid,
        } => {
            let options = ask::AskOptions {
                translate,
                route: route || config.rag.route_questions,
                mermaid,
            };
            ask::run(&config, &question, options).await?
        }
        Commands::Index { urls, force } => index::run(&config, urls, force).await?,
    }
    Ok(())
}
