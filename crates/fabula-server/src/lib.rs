mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use fabula_config::Config;
use fabula_llm::TextGenerator;
use tower_http::trace::TraceLayer;

/// Assembled server with the skill endpoint and health route
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the text generator or skill cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let llm = fabula_llm::build_generator(&config.llm)?;
        Self::with_generator(config, llm)
    }

    /// Build the server around an existing text generator
    ///
    /// # Errors
    ///
    /// Returns an error if the skill cannot be initialized
    pub fn with_generator(config: &Config, llm: Arc<dyn TextGenerator>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let skill = fabula_skill::build_skill(config, llm)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(fabula_skill::endpoint_router(&config.server.skill_path).with_state(skill));

        app = app.layer(TraceLayer::new_for_http());

        tracing::debug!(
            skill_path = %config.server.skill_path,
            health = config.server.health.enabled,
            "routes assembled"
        );

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
