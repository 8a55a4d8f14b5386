//! Application state

use std::sync::Arc;

use tokio::task::JoinHandle;
use user_registry::{RequestGateway, UserStore};

use crate::config::ServerConfig;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Gateway to the user registry processor
    pub registry: RequestGateway,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create the application state and start the user registry.
    ///
    /// The returned handle completes once every clone of the state has been
    /// dropped and the registry has drained its mailbox.
    pub fn new(config: ServerConfig) -> (Self, JoinHandle<UserStore>) {
        let (registry, processor) = user_registry::start(config.registry_config());

        tracing::debug!(
            ask_timeout_ms = config.ask_timeout_ms,
            mailbox_capacity = ?config.mailbox_capacity,
            "User registry started"
        );

        (Self::with_registry(config, registry), processor)
    }

    /// Create the application state around an existing registry gateway
    pub fn with_registry(config: ServerConfig, registry: RequestGateway) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }
}
