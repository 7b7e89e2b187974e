//! Parley CLI and HTTP API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads the config file, then either starts the HTTP
//! server or runs a one-shot command.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use parley_infra::config::{default_config_path, load_config};
use parley_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use parley_types::config::AppConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    init_tracing(verbosity_filter(cli.verbose, cli.quiet), otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path).await;

    match cli.command {
        Commands::Serve {
            port, host, model, ..
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(model) = model {
                config.model.model = model;
            }

            let result = serve(config).await;
            shutdown_tracing();
            result?;
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_every = Duration::from_secs(config.sessions.sweep_interval_secs.max(1));

    let state = AppState::init(&config)?;

    let cancel = CancellationToken::new();
    let sweeper = state
        .registry()
        .limits()
        .idle_ttl
        .is_some()
        .then(|| state.registry().spawn_idle_sweeper(sweep_every, cancel.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Parley API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// If a handler cannot be installed, that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
