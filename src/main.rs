use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use feedback_widget::{
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    observability::{AppObservability, init_tracing},
    services::FaviconResolver,
};

#[derive(Parser)]
#[command(name = "feedback-widget")]
#[command(version)]
#[command(about = "Favicon discovery tooling for the feedback widget")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the favicon URL discovered for an origin
    Resolve {
        origin: String,
    },
    /// Download the favicon of an origin
    Asset {
        origin: String,

        /// Write the icon bytes here instead of printing a summary
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs)?;

    let config = Config::load_from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    let observability = AppObservability::new(env!("CARGO_PKG_NAME"));
    let resolver =
        FaviconResolver::with_config(&config.favicon)?.with_observability(observability);

    match cli.command {
        Command::Resolve { origin } => match resolver.resolve(&origin).await? {
            Some(url) => println!("{url}"),
            None => println!("<none>"),
        },
        Command::Asset { origin, output } => {
            let Some(asset) = resolver.resolve_asset(&origin).await? else {
                info!(%origin, "No favicon found");
                println!("<none>");
                return Ok(());
            };

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &asset.data)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(
                        path = %path.display(),
                        content_type = %asset.content_type,
                        size = asset.len(),
                        "Favicon written"
                    );
                }
                None => println!("{} ({} bytes)", asset.content_type, asset.len()),
            }
        }
    }

    Ok(())
}
