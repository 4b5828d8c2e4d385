//! Contracts for the services supervised by the coordinator

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{BotEvent, ReadyMessage};
use crate::error::Result;

/// Chat-protocol session (Wechaty)
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Log in and start emitting events
    async fn init(&self) -> Result<()>;

    /// Log out and release the session
    async fn quit(&self) -> Result<()>;

    /// Subscribe to the event stream; only events sent after this call are received
    fn subscribe(&self) -> broadcast::Receiver<BotEvent>;
}

/// I/O relay (Io) bound to a messaging client and authorized by a token
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn init(&self) -> Result<()>;

    async fn quit(&self) -> Result<()>;
}

/// Builds messaging clients for a profile identifier
pub trait MessagingClientFactory: Send + Sync {
    fn create(&self, profile: &str) -> Result<Arc<dyn MessagingClient>>;
}

/// Builds relays from a messaging client and a token
pub trait RelayFactory: Send + Sync {
    fn create(
        &self,
        messaging: Arc<dyn MessagingClient>,
        token: &str,
    ) -> Result<Arc<dyn RelayClient>>;
}

/// A message as first delivered, before its contact and room data is loaded
#[async_trait]
pub trait IncomingMessage: Send + Sync + std::fmt::Debug {
    async fn ready(&self) -> Result<ReadyMessage>;
}

/// Receives every materialized message
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, message: ReadyMessage) -> Result<()>;
}
