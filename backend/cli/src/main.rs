use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use draftschema_cli::{build_router, doctor_cmd, models_cmd, status_cmd, AppState};
use draftschema_config::Config;
use draftschema_providers::ProviderRegistry;

#[derive(Parser)]
#[command(name = "draftschema")]
#[command(about = "Draftschema: infer a database schema from UI design JSON via an LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP proxy (default when no command is given)
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Provider that serves /infer-schema (openai or gemini)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Check whether a local proxy is answering
    Status,
    /// List the models offered by the configured provider
    Models,
    /// Validate the environment configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    draftschema_config::load_dotenv();
    let config = Config::from_env();

    draftschema_logging::init_logger(&config.log_level, config.log_format);

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        provider: None,
    }) {
        Commands::Serve { port, provider } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                provider: provider
                    .map(|p| p.to_ascii_lowercase())
                    .unwrap_or(config.provider),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => status_cmd::run(config.port).await?,
        Commands::Models => models_cmd::run(&config).await?,
        Commands::Doctor => {
            if !doctor_cmd::run(&config)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let report = draftschema_config::check(&config);
    if !report.is_valid() {
        bail!(
            "invalid configuration ({} error(s)); run `draftschema doctor` for details",
            report.errors.len()
        );
    }

    info!(
        port = config.port,
        bind = %config.bind_address,
        provider = %config.provider,
        config = %config.redacted(),
        "Starting Draftschema"
    );

    let registry = ProviderRegistry::from_config(&config);
    let provider = registry.select(&config.provider)?;

    let addr = config.listen_addr();
    let app = build_router(Arc::new(AppState::new(config, provider)));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %listener.local_addr()?, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
