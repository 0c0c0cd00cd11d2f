//! # Tally Server
//!
//! The HTTP server: `Axum` routes from every feature slice, the embedded document store,
//! static assets and the `OpenAPI` reference UI at `/api`.
//!
//! ## Example
//! ```no_run
//! use tally_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8181)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow, bail};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tally::database::Database;
use tally::domain::config::{ApiConfig, DatabaseConfig, SslConfig};
use tally::kernel::server::ApiState;
use tokio::signal;
use tracing::{error, info, warn};

/// In-flight requests get this long to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Replaces the whole configuration, usually the one read from `server.toml`.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn address(mut self, address: IpAddr) -> Self {
        self.cfg.server.address = address;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Opens the store and initializes every feature slice.
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL is configured but the certificate or key file is missing
    /// * The data directory cannot be created or holds unreadable snapshots
    /// * A feature slice refuses its configuration (bad JWT settings, strict Tailwind check)
    pub async fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            check_tls_files(ssl)?;
        }

        info!(address = %self.cfg.server.address, port = self.cfg.server.port, "Initializing server");

        let db = open_store(&self.cfg.database).await?;
        let slices = tally::init(&self.cfg, &db)
            .await
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;

        Ok(Server { state })
    }
}

async fn open_store(cfg: &DatabaseConfig) -> Result<Database> {
    Database::builder()
        .path(&cfg.data_dir)
        .persist(cfg.persist)
        .init()
        .await
        .with_context(|| format!("Failed to open the document store at {}", cfg.data_dir.display()))
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    if !ssl.cert.exists() {
        bail!("SSL certificate not found at: {}", ssl.cert.display());
    }
    if !ssl.key.exists() {
        bail!("SSL key not found at: {}", ssl.key.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
            warn!(key = %ssl.key.display(), "SSL private key is readable by other users (expected 600)");
        }
    }
    Ok(())
}

/// A fully initialized server, ready to [`run`](Server::run).
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// The socket address [`Server::run`] binds.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.state.config.server.address, self.state.config.server.port)
    }

    /// The complete application router, as served by [`Server::run`].
    #[must_use]
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Serves HTTP, or HTTPS when `[server.ssl]` is set, until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Binding the address or loading the certificates failed.
    pub async fn run(self) -> Result<()> {
        let address = self.address();
        let app = self.router().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        match &self.state.config.server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTPS server failed")?;
            },
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTP server failed")?;
            },
        }

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn drain_on_signal(handle: Handle<SocketAddr>) {
    if let Err(e) = shutdown_signal().await {
        error!("Error while waiting for shutdown signal: {e:#}");
        return;
    }
    info!(grace = ?SHUTDOWN_GRACE, "Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
