//! Scripted fakes for the messaging client and the relay.
//!
//! Every call is appended to a shared log so tests can assert ordering, and each
//! behaviour (failures, gates that hold a call open) can be changed between operations.

#![allow(dead_code)]

use async_trait::async_trait;
use ioclient::adapters::{
    BotEvent, MessagingClient, MessagingClientFactory, RelayClient, RelayFactory,
};
use ioclient::config::ClientConfig;
use ioclient::{Collaborators, IoClientError, LifecycleCoordinator, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct Script {
    pub messaging_init_fails: AtomicBool,
    pub messaging_quit_fails: AtomicBool,
    pub relay_init_fails: AtomicBool,
    pub relay_quit_fails: AtomicBool,
    pub relay_init_gate: Mutex<Option<Arc<Notify>>>,
    pub messaging_quit_gate: Mutex<Option<Arc<Notify>>>,
}

impl Script {
    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    /// Hold every relay `init` until the returned gate is notified
    pub fn gate_relay_init(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.relay_init_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Hold every messaging `quit` until the returned gate is notified
    pub fn gate_messaging_quit(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.messaging_quit_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

fn failed(what: &str) -> IoClientError {
    IoClientError::Other(anyhow::anyhow!("{what} failed"))
}

pub struct FakeMessaging {
    log: CallLog,
    script: Arc<Script>,
    events: broadcast::Sender<BotEvent>,
}

impl FakeMessaging {
    pub fn emit(&self, event: BotEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

#[async_trait]
impl MessagingClient for FakeMessaging {
    async fn init(&self) -> Result<()> {
        self.log.lock().unwrap().push("messaging.init".to_string());
        if self.script.messaging_init_fails.load(Ordering::SeqCst) {
            return Err(failed("messaging.init"));
        }
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.log.lock().unwrap().push("messaging.quit".to_string());
        let gate = self.script.messaging_quit_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.script.messaging_quit_fails.load(Ordering::SeqCst) {
            return Err(failed("messaging.quit"));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.log.lock().unwrap().push("messaging.subscribe".to_string());
        self.events.subscribe()
    }
}

pub struct FakeMessagingFactory {
    log: CallLog,
    script: Arc<Script>,
    last: Mutex<Option<Arc<FakeMessaging>>>,
}

impl FakeMessagingFactory {
    pub fn last(&self) -> Option<Arc<FakeMessaging>> {
        self.last.lock().unwrap().clone()
    }
}

impl MessagingClientFactory for FakeMessagingFactory {
    fn create(&self, profile: &str) -> Result<Arc<dyn MessagingClient>> {
        self.log
            .lock()
            .unwrap()
            .push(format!("messaging.create({profile})"));
        let (events, _) = broadcast::channel(16);
        let client = Arc::new(FakeMessaging {
            log: self.log.clone(),
            script: self.script.clone(),
            events,
        });
        *self.last.lock().unwrap() = Some(client.clone());
        Ok(client)
    }
}

pub struct FakeRelay {
    log: CallLog,
    script: Arc<Script>,
}

#[async_trait]
impl RelayClient for FakeRelay {
    async fn init(&self) -> Result<()> {
        self.log.lock().unwrap().push("relay.init".to_string());
        let gate = self.script.relay_init_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.script.relay_init_fails.load(Ordering::SeqCst) {
            return Err(failed("relay.init"));
        }
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.log.lock().unwrap().push("relay.quit".to_string());
        if self.script.relay_quit_fails.load(Ordering::SeqCst) {
            return Err(failed("relay.quit"));
        }
        Ok(())
    }
}

pub struct FakeRelayFactory {
    log: CallLog,
    script: Arc<Script>,
}

impl RelayFactory for FakeRelayFactory {
    fn create(
        &self,
        _messaging: Arc<dyn MessagingClient>,
        token: &str,
    ) -> Result<Arc<dyn RelayClient>> {
        self.log.lock().unwrap().push(format!("relay.create({token})"));
        Ok(Arc::new(FakeRelay {
            log: self.log.clone(),
            script: self.script.clone(),
        }))
    }
}

/// A coordinator wired to scripted fakes
pub struct Harness {
    pub log: CallLog,
    pub script: Arc<Script>,
    pub messaging_factory: Arc<FakeMessagingFactory>,
    pub coordinator: LifecycleCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Script::default());
        let messaging_factory = Arc::new(FakeMessagingFactory {
            log: log.clone(),
            script: script.clone(),
            last: Mutex::new(None),
        });
        let relay_factory = Arc::new(FakeRelayFactory {
            log: log.clone(),
            script: script.clone(),
        });

        let config = ClientConfig {
            token: Some("io-token".to_string()),
            profile: "test-profile".to_string(),
        };
        let coordinator = LifecycleCoordinator::new(
            &config,
            Collaborators::new(messaging_factory.clone(), relay_factory),
        )
        .unwrap();

        Self {
            log,
            script,
            messaging_factory,
            coordinator,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }
}
