/// Cadence - per-session playback controller, console front-end
use cadence_console::{config::AppConfig, Console};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence session playback console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session reading commands from stdin
    Run {
        /// Configuration file path
        #[arg(short, long, env = "CADENCE_CONFIG")]
        config: Option<PathBuf>,
    },
    /// List the tracks in the configured catalog
    Catalog {
        /// Configuration file path
        #[arg(short, long, env = "CADENCE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, stdout is for command output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence=info,cadence_console=info,cadence_playback=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            run(config).await?;
        }
        Commands::Catalog { config } => {
            list_catalog(config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(path)?;

    tracing::info!("Starting Cadence console");
    tracing::info!("Session: {}", config.session.id);
    tracing::info!("Catalog: {} tracks", config.catalog.len());
    tracing::info!("Engine speed: {}x", config.engine.speed);

    let console = Console::new(&config);
    console.connect().await?;
    let reporter = console.spawn_event_reporter().await;

    println!("Type 'help' for commands.");
    console.run(BufReader::new(tokio::io::stdin())).await?;

    reporter.abort();
    Ok(())
}

fn list_catalog(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(path)?;

    println!("Catalog:");
    for entry in &config.catalog {
        let length = entry
            .duration_secs
            .filter(|secs| *secs > 0.0)
            .map_or_else(|| "live".to_string(), cadence_core::timestamp::format);
        println!("  {} - {} [{}] {}", entry.title, entry.author, length, entry.url);
    }

    Ok(())
}
