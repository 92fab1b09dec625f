//! HTTP server assembly and lifecycle

use crate::api::{build_app, AppState};
use crate::assistant::Assistant;
use crate::bookings::BookingStore;
use crate::catalog::Catalog;
use crate::config::AresConfig;
use crate::error::Result;
use crate::realtime::ConnectionRegistry;
use crate::storage::DataFile;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Ares Travel server
pub struct Server {
    state: AppState,
}

impl Server {
    /// Load the data file and build every subsystem from `config`.
    pub async fn new(config: AresConfig) -> Result<Self> {
        let data = DataFile::new(&config.storage.scratch_file, &config.storage.seed_file);
        let (doc, source) = data.load().await;
        tracing::info!(
            ?source,
            destinations = doc.destinations.len(),
            bookings = doc.bookings.len(),
            "Data file loaded"
        );

        let catalog = Catalog::from_loaded(doc.valid_destinations());
        let assistant = Assistant::from_config(&config.assistant)?;
        let bookings = BookingStore::new(data, doc);

        Ok(Self {
            state: AppState {
                config: Arc::new(config),
                catalog: Arc::new(catalog),
                registry: Arc::new(ConnectionRegistry::new()),
                assistant: Arc::new(assistant),
                bookings: Arc::new(bookings),
            },
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let server = &self.state.config.server;
        let listener = TcpListener::bind((server.host.as_str(), server.port)).await?;
        Ok(listener)
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!("Ares Travel listening on http://{}", addr);

        let app = build_app(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Builder for [`Server`]
pub struct ServerBuilder {
    config: AresConfig,
}

impl ServerBuilder {
    /// Create a new builder with default config
    pub fn new() -> Self {
        Self {
            config: AresConfig::default(),
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: AresConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Build the server
    pub async fn build(self) -> Result<Server> {
        Server::new(self.config).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
