//! Test server wrapper that starts Fabula on a random port

use std::net::SocketAddr;

use fabula_config::Config;
use fabula_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    skill_path: String,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let skill_path = config.server.skill_path.clone();
        let server = Server::new(&config)?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            skill_path,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// URL of a path on the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Post a request envelope to the skill endpoint and decode the response
    pub async fn turn(&self, envelope: &serde_json::Value) -> serde_json::Value {
        let resp = self
            .client
            .post(self.url(&self.skill_path))
            .json(envelope)
            .send()
            .await
            .expect("skill request must be sent");

        assert_eq!(resp.status(), 200, "skill endpoint must answer every turn");
        resp.json().await.expect("skill response must be JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
