//! Messaging-client event subscription
//!
//! The coordinator never registers callbacks on the client. It takes a receiver from
//! `MessagingClient::subscribe` and drains it in a task owned by an `EventSubscription`,
//! which teardown cancels before quitting the client.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::{BotEvent, IncomingMessage, MessageHandler};

/// Handle to a running event dispatcher; dropping it cancels the dispatcher
#[derive(Debug)]
pub struct EventSubscription {
    task: JoinHandle<()>,
}

impl EventSubscription {
    /// Start draining `events`, handing each materialized message to `handler`
    pub fn spawn(events: broadcast::Receiver<BotEvent>, handler: Arc<dyn MessageHandler>) -> Self {
        let task = tokio::spawn(dispatch_loop(events, handler));
        Self { task }
    }

    /// Stop dispatching; messages already being materialized still finish
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn dispatch_loop(mut events: broadcast::Receiver<BotEvent>, handler: Arc<dyn MessageHandler>) {
    loop {
        match events.recv().await {
            Ok(event) => dispatch(event, &handler),
            Err(RecvError::Lagged(n)) => {
                warn!("event stream lagged, {} events dropped", n);
            }
            Err(RecvError::Closed) => {
                debug!("event stream closed");
                break;
            }
        }
    }
}

fn dispatch(event: BotEvent, handler: &Arc<dyn MessageHandler>) {
    match event {
        BotEvent::Login(user) => info!("{} logined", user.name),
        BotEvent::Logout(user) => info!("{} logouted", user.name),
        BotEvent::Scan { url, code } => info!("[{}] {}", code, url),
        BotEvent::Message(message) => {
            // Each message waits for its own data so a slow one never blocks the stream.
            tokio::spawn(deliver(message, handler.clone()));
        }
    }
}

async fn deliver(message: Arc<dyn IncomingMessage>, handler: Arc<dyn MessageHandler>) {
    match message.ready().await {
        Ok(ready) => {
            let id = ready.id.clone();
            if let Err(e) = handler.on_message(ready).await {
                error!("message handler failed for {}: {}", id, e);
            }
        }
        Err(e) => error!("message.ready() {}", e),
    }
}
