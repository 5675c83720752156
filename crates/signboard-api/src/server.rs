//! Interface server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Interface server configuration.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub host: String,
    pub port: u16,
}

impl InterfaceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the configured address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// The control-surface server.
pub struct InterfaceServer {
    config: InterfaceConfig,
    state: Arc<AppState>,
}

impl InterfaceServer {
    pub fn new(config: InterfaceConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        self.config.addr()
    }

    /// Serve until the shutdown future resolves, then finish in-flight
    /// requests and return.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("control surface listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_config_default() {
        let config = InterfaceConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_interface_config_new() {
        let config = InterfaceConfig::new("127.0.0.1", 3000);
        assert_eq!(config.addr(), "127.0.0.1:3000");
    }
}
