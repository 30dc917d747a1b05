use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::Cli;
use servermock_core::config::parser::{load_config, load_mocks};
use servermock_core::config::settings::Settings;
use servermock_core::InterceptionEngine;
use servermock_http::logging::init_tracing;
use servermock_http::MockServer;
use std::sync::Arc;
use tracing::{info, warn};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level, args.log_format)
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    let mut settings: Settings = match &args.config {
        Some(path) => load_config(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    args.apply(&mut settings);

    let engine = Arc::new(InterceptionEngine::new());
    let server = MockServer::new(Arc::clone(&engine), &settings);

    if let Some(pattern) = &settings.server.mocks {
        let specs = load_mocks(pattern)
            .await
            .with_context(|| format!("Failed to load mocks from {pattern}"))?;
        let count = server.seed(&specs).context("Failed to register seed mocks")?;
        info!(count, pattern = %pattern, "Registered seed mocks");
    }

    let bound = server
        .bind(settings.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.listen))?;
    info!(
        addr = %bound.local_addr()?,
        register = %settings.middleware.registration_path,
        clear = %settings.middleware.clear_path,
        "servermock v{} listening",
        env!("CARGO_PKG_VERSION")
    );

    bound.serve_with_shutdown(shutdown_signal()).await?;

    let pending = engine.pending_mocks();
    if !pending.is_empty() {
        warn!(?pending, "Exiting with unused mocks");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
