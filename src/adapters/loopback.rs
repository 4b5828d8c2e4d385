//! In-process stand-ins for the messaging client and the relay
//!
//! Used by the `run` command and by tests. The messaging client never talks to a chat
//! network: it reports a scan and a login on `init`, a logout on `quit`, and delivers
//! whatever messages are injected into it. The relay counts the events it would forward.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::traits::{
    IncomingMessage, MessageHandler, MessagingClient, MessagingClientFactory, RelayClient,
    RelayFactory,
};
use super::types::{BotEvent, Contact, ReadyMessage};
use crate::error::{IoClientError, Result};

/// Scan status reported while waiting for the QR code to be confirmed
pub const SCAN_WAITING: u16 = 408;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A message that is ready as soon as it is delivered
#[derive(Debug, Clone)]
pub struct LoopbackMessage {
    message: ReadyMessage,
}

impl LoopbackMessage {
    pub fn new(message: ReadyMessage) -> Self {
        Self { message }
    }
}

#[async_trait]
impl IncomingMessage for LoopbackMessage {
    async fn ready(&self) -> Result<ReadyMessage> {
        Ok(self.message.clone())
    }
}

/// Messaging client that stays inside the process
pub struct LoopbackMessagingClient {
    profile: String,
    user: Contact,
    events: broadcast::Sender<BotEvent>,
    logged_in: AtomicBool,
}

impl LoopbackMessagingClient {
    pub fn new(profile: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            profile: profile.to_string(),
            user: Contact::new(format!("loopback-{profile}"), profile),
            events,
            logged_in: AtomicBool::new(false),
        }
    }

    /// The account this client logs in as
    pub fn user(&self) -> &Contact {
        &self.user
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    /// Deliver a text message from `from`; returns false when nobody is listening
    pub fn inject_text(&self, from: Contact, content: impl Into<String>) -> bool {
        let message = ReadyMessage {
            id: Uuid::new_v4().to_string(),
            from,
            to: Some(self.user.clone()),
            room: None,
            content: content.into(),
            received_at: Utc::now(),
        };
        self.emit(BotEvent::Message(Arc::new(LoopbackMessage::new(message))))
    }

    fn emit(&self, event: BotEvent) -> bool {
        debug!("loopback[{}] emit {}", self.profile, event.kind());
        self.events.send(event).is_ok()
    }
}

#[async_trait]
impl MessagingClient for LoopbackMessagingClient {
    async fn init(&self) -> Result<()> {
        self.emit(BotEvent::Scan {
            url: format!("https://login.loopback.invalid/qrcode/{}", self.profile),
            code: SCAN_WAITING,
        });
        self.logged_in.store(true, Ordering::SeqCst);
        self.emit(BotEvent::Login(self.user.clone()));
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        if self.logged_in.swap(false, Ordering::SeqCst) {
            self.emit(BotEvent::Logout(self.user.clone()));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.events.subscribe()
    }
}

/// Builds loopback messaging clients and remembers the latest one
#[derive(Default)]
pub struct LoopbackMessagingFactory {
    last: Mutex<Option<Arc<LoopbackMessagingClient>>>,
}

impl LoopbackMessagingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created client, for injecting messages
    pub fn last_client(&self) -> Option<Arc<LoopbackMessagingClient>> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MessagingClientFactory for LoopbackMessagingFactory {
    fn create(&self, profile: &str) -> Result<Arc<dyn MessagingClient>> {
        let client = Arc::new(LoopbackMessagingClient::new(profile));
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(client.clone());
        Ok(client)
    }
}

/// Relay that consumes the messaging client's events without sending them anywhere
pub struct LoopbackRelay {
    token: String,
    messaging: Arc<dyn MessagingClient>,
    forwarded: Arc<AtomicU64>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl LoopbackRelay {
    pub fn new(messaging: Arc<dyn MessagingClient>, token: &str) -> Self {
        Self {
            token: token.to_string(),
            messaging,
            forwarded: Arc::new(AtomicU64::new(0)),
            forwarder: Mutex::new(None),
        }
    }

    /// Number of events seen since `init`
    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[async_trait]
impl RelayClient for LoopbackRelay {
    async fn init(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(IoClientError::Config("relay token must be set".to_string()));
        }

        let mut events = self.messaging.subscribe();
        let forwarded = self.forwarded.clone();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        forwarded.fetch_add(1, Ordering::SeqCst);
                        debug!("relay forwarded {}", event.kind());
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("relay lagged, {} events dropped", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let previous = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
        info!("loopback relay connected");
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let task = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match task {
            Some(task) => {
                task.abort();
                info!("loopback relay disconnected");
            }
            None => debug!("loopback relay was not running"),
        }
        Ok(())
    }
}

/// Builds loopback relays
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopbackRelayFactory;

impl RelayFactory for LoopbackRelayFactory {
    fn create(
        &self,
        messaging: Arc<dyn MessagingClient>,
        token: &str,
    ) -> Result<Arc<dyn RelayClient>> {
        Ok(Arc::new(LoopbackRelay::new(messaging, token)))
    }
}

/// Default handler: log every message
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMessageHandler;

#[async_trait]
impl MessageHandler for LoggingMessageHandler {
    async fn on_message(&self, message: ReadyMessage) -> Result<()> {
        let room = message
            .room
            .as_ref()
            .map(|topic| format!("[{topic}]"))
            .unwrap_or_default();
        info!("{}<{}>:{}", room, message.from.name, message.content);
        Ok(())
    }
}
