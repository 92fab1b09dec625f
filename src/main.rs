//! Ares Travel - travel agency backend with a real-time chat assistant

use anyhow::Result;
use ares_travel::{
    assistant::{Assistant, ProviderMode},
    config::AresConfig,
    server::ServerBuilder,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ares-travel")]
#[command(author = "Ares Travel Team")]
#[command(version)]
#[command(about = "Travel agency backend with a real-time chat assistant")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ARES_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run diagnostics
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ares_travel={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AresConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Doctor => {
            run_doctor(&config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(config: AresConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing::info!("Starting Ares Travel");

    let mut builder = ServerBuilder::new().config(config);
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }

    let server = builder.build().await?;
    let listener = server.bind().await?;

    server
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

async fn run_doctor(config: &AresConfig) -> Result<()> {
    println!("🔍 Ares Travel Doctor");
    println!();

    println!("Checking data files...");
    for (label, path) in [
        ("scratch", &config.storage.scratch_file),
        ("seed", &config.storage.seed_file),
    ] {
        if path.exists() {
            println!("  ✓ {} file found: {}", label, path.display());
        } else {
            println!("  ℹ No {} file at {}", label, path.display());
        }
    }

    println!();
    println!("Checking landing page...");
    let index = config.server.public_dir.join("index.html");
    if index.exists() {
        println!("  ✓ {}", index.display());
    } else {
        println!("  ℹ {} missing (placeholder page will be served)", index.display());
    }
    if config.globe.token().is_empty() {
        println!("  ℹ {} not set (globe uses fallback)", config.globe.token_env);
    } else {
        println!("  ✓ {} set", config.globe.token_env);
    }

    println!();
    println!("Checking assistant...");
    let assistant = Assistant::from_config(&config.assistant)?;
    match assistant.mode() {
        ProviderMode::Mock => println!("  ℹ Mock mode (set USE_OPENAI=true for live replies)"),
        ProviderMode::NoKey => println!("  ✗ Live mode selected but {} is not set", config.assistant.api_key_env),
        ProviderMode::Live => {
            let report = assistant.diagnose().await;
            if report.ok {
                println!(
                    "  ✓ {} answered in {}ms",
                    report.model.unwrap_or_default(),
                    report.response_time.unwrap_or_default()
                );
            } else {
                println!("  ✗ {}", report.error.unwrap_or_default());
                if let Some(details) = report.details {
                    println!("    {}", details);
                }
            }
        }
    }

    println!();
    println!("Doctor check complete!");

    Ok(())
}

fn show_config(config: Option<&AresConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
