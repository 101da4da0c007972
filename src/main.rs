use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tagscout::brain::Brain;
use tagscout::hands::Hands;
use tagscout::{Config, face, pipeline, recovery};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tag Scout CLI.
#[derive(Parser)]
#[command(name = "tagscout")]
#[command(about = "Recommend analytics tags for the interactive elements of a webpage")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web UI and JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// First port to try; the next nine are tried if it is taken
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },

    /// Print the interactive-element inventory of a page as JSON
    Extract { url: String },

    /// Fetch a page, ask the model, print recommendations as JSON
    Analyze {
        url: String,

        /// Use the flash model
        #[arg(long)]
        flash: bool,
    },

    /// Recover recommendations from raw model text (file, or stdin if omitted)
    Recover { file: Option<PathBuf> },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Serve { host, port } => {
            let state = face::AppState {
                hands: Hands::new(config.fetch_timeout())?,
                brain: Brain::new(config)?,
            };
            let (listener, port) = face::bind(&host, port).await?;
            info!("Web UI running at http://{}:{}", host, port);
            face::serve(listener, state).await?;
        }
        Commands::Extract { url } => {
            let hands = Hands::new(config.fetch_timeout())?;
            let elements = pipeline::inventory(&hands, &url)
                .await
                .with_context(|| format!("Failed to analyse {}", url))?;
            println!("{}", serde_json::to_string_pretty(&elements)?);
        }
        Commands::Analyze { url, flash } => {
            let hands = Hands::new(config.fetch_timeout())?;
            let brain = Brain::new(config)?;
            let analysis = pipeline::analyze(&hands, &brain, &url, flash)
                .await
                .with_context(|| format!("Failed to analyse {}", url))?;
            println!("{}", serde_json::to_string_pretty(&analysis.recommendations)?);
        }
        Commands::Recover { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let recommendations = recovery::recover_recommendations(&raw);
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
    }

    Ok(())
}
