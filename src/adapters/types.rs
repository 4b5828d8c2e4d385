//! Event and message types exchanged with the messaging client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::traits::IncomingMessage;

/// A chat account (the bot itself or a peer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
}

impl Contact {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A message whose sender, recipients and content have all been loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyMessage {
    pub id: String,
    pub from: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Contact>,
    /// Room topic for group messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

/// Events emitted by the messaging client
#[derive(Debug, Clone)]
pub enum BotEvent {
    /// Account logged in
    Login(Contact),
    /// Account logged out
    Logout(Contact),
    /// Login QR code issued or its scan status changed
    Scan { url: String, code: u16 },
    /// A new message arrived; call `ready()` before reading it
    Message(Arc<dyn IncomingMessage>),
}

impl BotEvent {
    /// Short event name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            BotEvent::Login(_) => "login",
            BotEvent::Logout(_) => "logout",
            BotEvent::Scan { .. } => "scan",
            BotEvent::Message(_) => "message",
        }
    }
}
