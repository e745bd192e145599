//! Gitscope CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "gitscope")]
#[command(about = "Interactive commit graph studio for git repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Repository path (defaults to current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Config file path (defaults to gitscope.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the studio server
    Serve {
        /// Port to listen on (default 7895)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },
    /// Print the commit log and exit
    Log {
        /// Maximum number of commits to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print repository statistics and exit
    Stats,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("gitscope={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Gitscope v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load(cli.config.as_deref())?;
    let repo = config.repo(cli.repo);
    tracing::info!("Repository: {}", repo.display());

    match cli.command {
        Commands::Serve { port, host, open } => {
            let options = commands::ServeOptions {
                repo,
                host: config.host(host),
                port: config.port(port),
                depth: config.depth(),
            };
            commands::serve(options, open).await
        }
        Commands::Log { limit } => commands::log(repo, limit.unwrap_or_else(|| config.depth())),
        Commands::Stats => commands::stats(repo, config.depth()),
        Commands::Version => {
            println!("Gitscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
