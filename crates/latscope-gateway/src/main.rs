//! latscope gateway binary.
//!
//! Startup order: config -> dataset -> bind -> serve. A dataset that fails to
//! load aborts the process before any socket is bound.
//!
//! Config path: `$LATSCOPE_CONFIG`, default `latscope.yaml`.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use latscope_core::error::{LatscopeError, Result};
use latscope_gateway::{
    app_state::AppState,
    config::{self, Adapter},
    router,
    transport,
};

const CONFIG_ENV: &str = "LATSCOPE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "latscope.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "latscope-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.listen_addr()?;
    let adapter = cfg.gateway.adapter;

    let state = AppState::from_config(cfg)?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| LatscopeError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, ?adapter, "latscope-gateway starting");

    let served = match adapter {
        Adapter::Framework => {
            axum::serve(listener, router::build_router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await
        }
        Adapter::Raw => transport::raw::serve(listener, state, shutdown_signal()).await,
    };
    served.map_err(|e| LatscopeError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
