use anyhow::Context;
use loginport_domain::client::ClientSource;
use loginport_domain::DomainError;
use loginport_infrastructure::browser::ChromiumLauncher;
use loginport_infrastructure::config::AppConfig;
use loginport_infrastructure::google::GoogleSheetsClientSource;
use loginport_infrastructure::security::TotpGenerator;
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::routes::router;
use super::state::AppState;
use crate::application::config::LoginTimeouts;
use crate::application::services::{ClientStore, LoginSequencer};

/// Logged once the listener is bound; the shell watches stdout for it.
pub const READY_MARKER: &str = "Server listening on http://127.0.0.1:";

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub config_path: PathBuf,
    pub sheet_title: Option<String>,
    pub port: Option<u16>,
}

/// Load the whole roster up front; any failure aborts startup.
pub async fn load_roster(source: &dyn ClientSource) -> Result<ClientStore, DomainError> {
    let started_at = Instant::now();
    let clients = source.load_clients().await?;
    if clients.is_empty() {
        warn!("Spreadsheet produced no usable client rows");
    }
    info!(
        "✓ Loaded {} clients ({}ms)",
        clients.len(),
        started_at.elapsed().as_millis()
    );
    Ok(ClientStore::new(clients))
}

/// Wire the production sequencer (Chromium + TOTP) around a loaded roster.
pub fn build_app_state(
    clients: ClientStore,
    config: &AppConfig,
    timeouts: LoginTimeouts,
) -> AppState {
    let otp = Arc::new(TotpGenerator::new());
    let launcher = Arc::new(
        ChromiumLauncher::new(config.browser_path.clone())
            .with_timeouts(timeouts.browser_timeouts()),
    );
    let sequencer = Arc::new(LoginSequencer::new(launcher, otp.clone(), timeouts));
    AppState::new(clients, sequencer, otp)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("{}{}", READY_MARKER, addr.port());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// `serve` subcommand: config → roster → bind → serve.
pub async fn run_server(options: ServeOptions) -> anyhow::Result<()> {
    let startup_started_at = Instant::now();
    info!("📁 Config path: {}", options.config_path.display());

    let config = AppConfig::load_or_create(&options.config_path)?;
    let source = GoogleSheetsClientSource::from_config(
        &config,
        &options.config_path,
        options.sheet_title.as_deref(),
    )?;
    info!("📄 Sheet title: {}", source.sheet_title());

    let clients = load_roster(&source).await?;
    let state = build_app_state(clients, &config, LoginTimeouts::default());

    let port = options.port.unwrap_or(config.port);
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {} (is another instance running?)", addr))?;

    info!(
        "✅ Startup finished ({}ms)",
        startup_started_at.elapsed().as_millis()
    );
    serve(listener, state, shutdown_signal()).await
}

/// Handle shutdown signals (SIGINT, SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
