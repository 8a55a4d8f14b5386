//! In-memory user registry behind a single-writer processor.
//!
//! This crate provides:
//! - [`UserStore`]: the user collection with email uniqueness
//! - [`RegistryProcessor`]: one task applying commands to the store in arrival order
//! - [`RequestGateway`]: ask-with-timeout access for any number of concurrent callers
//!
//! Passwords are stored and compared in plaintext. Do not use this registry
//! for real accounts.

mod command;
mod error;
mod gateway;
pub mod mailbox;
mod processor;
mod store;
mod user;

use std::time::Duration;

use tokio::task::JoinHandle;

pub use command::*;
pub use error::*;
pub use gateway::*;
pub use mailbox::{CommandReceiver, CommandSender, MailboxPolicy, MAX_MAILBOX_CAPACITY};
pub use processor::*;
pub use store::*;
pub use user::*;

/// Default ask timeout.
pub const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry wiring options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// How long a caller waits for each reply
    pub ask_timeout: Duration,

    /// Overflow policy of the command queue
    pub mailbox: MailboxPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ask_timeout: DEFAULT_ASK_TIMEOUT,
            mailbox: MailboxPolicy::Unbounded,
        }
    }
}

/// Starts a processor over an empty store and returns a gateway to it.
///
/// The processor runs until every clone of the gateway has been dropped; the
/// join handle then yields the final store.
pub fn start(config: RegistryConfig) -> (RequestGateway, JoinHandle<UserStore>) {
    start_with_store(config, UserStore::new())
}

/// Like [`start`], with a caller-provided store
pub fn start_with_store(
    config: RegistryConfig,
    store: UserStore,
) -> (RequestGateway, JoinHandle<UserStore>) {
    let (sender, receiver) = mailbox::channel(config.mailbox);
    let processor = RegistryProcessor::new(store).spawn(receiver);
    (RequestGateway::new(sender, config.ask_timeout), processor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_processor_stops_after_last_gateway_drops() {
        let (gateway, processor) = start(RegistryConfig::default());
        let second = gateway.clone();

        gateway
            .create_user(NewUser::new("a@x.com", "p1", "A"))
            .await
            .unwrap();
        drop(gateway);
        second
            .create_user(NewUser::new("b@x.com", "p2", "B"))
            .await
            .unwrap();
        drop(second);

        let store = processor.await.unwrap();
        assert_eq!(store.len(), 2);
    }
}
