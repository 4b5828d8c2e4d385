//! Lifecycle coordinator for the messaging client and the Io relay
//!
//! Tracks two states: the target state (what the operator asked for) and the current
//! state (how far the coordinator has got). Every public operation checks and flips the
//! current state under one lock before its first await. Only `stop` and `quit` may run
//! while a bring-up is in flight; once they flip the target, the bring-up quits whatever
//! it brings up late and leaves the current state to them. Failed operations otherwise
//! leave the coordinator `Disconnected`; nothing is retried automatically and subordinate
//! calls have no timeout.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::lifecycle::{CoordinatorSnapshot, LifecycleEvent};
use super::state::{check_transition, CurrentState, LifecycleOp, Subordinate, TargetState};
use super::subscription::EventSubscription;
use crate::adapters::{
    LoggingMessageHandler, LoopbackMessagingFactory, LoopbackRelayFactory, MessageHandler,
    MessagingClient, MessagingClientFactory, RelayClient, RelayFactory,
};
use crate::config::ClientConfig;
use crate::error::{IoClientError, Result};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything the coordinator builds or calls into
#[derive(Clone)]
pub struct Collaborators {
    pub messaging_factory: Arc<dyn MessagingClientFactory>,
    pub relay_factory: Arc<dyn RelayFactory>,
    pub message_handler: Arc<dyn MessageHandler>,
}

impl Collaborators {
    /// Collaborators that log incoming messages
    pub fn new(
        messaging_factory: Arc<dyn MessagingClientFactory>,
        relay_factory: Arc<dyn RelayFactory>,
    ) -> Self {
        Self {
            messaging_factory,
            relay_factory,
            message_handler: Arc::new(LoggingMessageHandler),
        }
    }

    pub fn with_message_handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.message_handler = handler;
        self
    }

    /// In-process messaging client and relay
    pub fn loopback() -> Self {
        Self::new(
            Arc::new(LoopbackMessagingFactory::new()),
            Arc::new(LoopbackRelayFactory),
        )
    }
}

struct Inner {
    token: String,
    target: TargetState,
    current: CurrentState,
    messaging: Option<Arc<dyn MessagingClient>>,
    subscription: Option<EventSubscription>,
    relay: Option<Arc<dyn RelayClient>>,
    last_transition_at: Option<DateTime<Utc>>,
}

/// Brings the messaging client and the relay up and down together
pub struct LifecycleCoordinator {
    inner: Mutex<Inner>,
    profile: String,
    collaborators: Collaborators,
    state_tx: watch::Sender<CurrentState>,
    event_tx: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleCoordinator {
    /// Create a disconnected coordinator; fails when the token or profile is empty
    pub fn new(config: &ClientConfig, collaborators: Collaborators) -> Result<Self> {
        let token = config.token.as_deref().map(str::trim).unwrap_or_default();
        debug!("constructor() with token: {}", mask_token(token));

        if token.is_empty() {
            let e = IoClientError::Config("constructor() token must be set".to_string());
            error!("{}", e);
            return Err(e);
        }
        if config.profile.trim().is_empty() {
            let e = IoClientError::Config("constructor() profile must be set".to_string());
            error!("{}", e);
            return Err(e);
        }

        let (state_tx, _) = watch::channel(CurrentState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Mutex::new(Inner {
                token: token.to_string(),
                target: TargetState::Disconnected,
                current: CurrentState::Disconnected,
                messaging: None,
                subscription: None,
                relay: None,
                last_transition_at: None,
            }),
            profile: config.profile.clone(),
            collaborators,
            state_tx,
            event_tx,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Accessors ====================

    pub fn token(&self) -> String {
        self.lock().token.clone()
    }

    /// Replace the relay token; an empty token is ignored. Returns the stored token.
    pub fn set_token(&self, token: &str) -> String {
        let mut inner = self.lock();
        if token.is_empty() {
            warn!("token() ignoring empty token");
        } else {
            debug!("token({})", mask_token(token));
            inner.token = token.to_string();
        }
        inner.token.clone()
    }

    pub fn target_state(&self) -> TargetState {
        self.lock().target
    }

    pub fn set_target_state(&self, state: TargetState) -> TargetState {
        let mut inner = self.lock();
        self.write_target(&mut inner, state);
        state
    }

    pub fn current_state(&self) -> CurrentState {
        self.lock().current
    }

    pub fn set_current_state(&self, state: CurrentState) -> CurrentState {
        let mut inner = self.lock();
        self.write_current(&mut inner, state);
        state
    }

    /// Profile the messaging client is created with
    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn has_messaging_client(&self) -> bool {
        self.lock().messaging.is_some()
    }

    pub fn has_relay(&self) -> bool {
        self.lock().relay.is_some()
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let inner = self.lock();
        CoordinatorSnapshot {
            target_state: inner.target,
            current_state: inner.current,
            has_messaging_client: inner.messaging.is_some(),
            has_relay: inner.relay.is_some(),
            subscribed: inner.subscription.as_ref().is_some_and(EventSubscription::is_active),
            last_transition_at: inner.last_transition_at,
        }
    }

    /// Watch every current-state change
    pub fn subscribe_state(&self) -> watch::Receiver<CurrentState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to lifecycle events
    pub fn subscribe_events(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.event_tx.subscribe()
    }

    fn write_target(&self, inner: &mut Inner, state: TargetState) {
        debug!("targetState({})", state);
        inner.target = state;
        let _ = self.event_tx.send(LifecycleEvent::TargetChanged { to: state });
    }

    fn write_current(&self, inner: &mut Inner, state: CurrentState) {
        let from = inner.current;
        debug!(from = %from, to = %state, "currentState({})", state);
        inner.current = state;
        inner.last_transition_at = Some(Utc::now());
        self.state_tx.send_replace(state);
        let _ = self.event_tx.send(LifecycleEvent::StateChanged { from, to: state });
    }

    // ==================== Transition protocol ====================

    /// Refuse `op` if another operation is in flight
    fn check(&self, inner: &Inner, op: LifecycleOp) -> Result<()> {
        if let Err(pending) = check_transition(inner.current, op) {
            warn!("{} with currentState() {}, skipped", op, inner.current);
            let _ = self.event_tx.send(LifecycleEvent::OperationRejected(pending));
            return Err(pending.into());
        }
        Ok(())
    }

    /// Check and flip both states in one critical section; returns the state it replaced
    fn begin(
        &self,
        op: LifecycleOp,
        target: TargetState,
        current: CurrentState,
    ) -> Result<CurrentState> {
        let mut inner = self.lock();
        self.check(&inner, op)?;
        let previous = inner.current;
        self.write_target(&mut inner, target);
        self.write_current(&mut inner, current);
        Ok(previous)
    }

    /// Settle into `on_success`, or into `Disconnected` when the operation failed
    ///
    /// A bring-up whose target was flipped by an interleaved `stop` or `quit` leaves the
    /// current state to that operation.
    fn finish(
        &self,
        op: LifecycleOp,
        started: Instant,
        result: Result<()>,
        on_success: CurrentState,
    ) -> Result<()> {
        let superseded = {
            let mut inner = self.lock();
            let superseded =
                on_success == CurrentState::Connected && inner.target != TargetState::Connected;
            if !superseded {
                let settled = if result.is_ok() {
                    on_success
                } else {
                    CurrentState::Disconnected
                };
                self.write_current(&mut inner, settled);
            }
            superseded
        };
        if superseded {
            warn!("{} superseded by a later operation, state left as is", op);
        }

        match result {
            Ok(()) => {
                let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let _ = self
                    .event_tx
                    .send(LifecycleEvent::OperationCompleted { op, duration_ms });
                info!("{} completed in {}ms", op, duration_ms);
                Ok(())
            }
            Err(e) => {
                error!("{} exception: {}", op, e);
                let _ = self.event_tx.send(LifecycleEvent::OperationFailed {
                    op,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn report_missing(&self, component: Subordinate, op: LifecycleOp) {
        warn!("{} no {}", op, component);
        let _ = self
            .event_tx
            .send(LifecycleEvent::SubordinateMissing { component, op });
    }

    // ==================== Operations ====================

    /// Cold start: create the messaging client, then bring up the relay and the client
    pub async fn init(&self) -> Result<()> {
        debug!("init()");
        let started = Instant::now();
        self.begin(LifecycleOp::Init, TargetState::Connected, CurrentState::Connecting)?;

        let result = self.bring_up().await;
        self.finish(LifecycleOp::Init, started, result, CurrentState::Connected)
    }

    async fn bring_up(&self) -> Result<()> {
        let messaging = self
            .collaborators
            .messaging_factory
            .create(&self.profile)
            .map_err(|e| IoClientError::subordinate_init(Subordinate::MessagingClient, e))?;

        let (previous, subscription, previous_relay) = {
            let mut inner = self.lock();
            (
                inner.messaging.replace(messaging),
                inner.subscription.take(),
                inner.relay.take(),
            )
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
        if let Some(previous) = previous {
            warn!("init() replacing an existing messaging client");
            best_effort(Subordinate::MessagingClient, previous.quit()).await;
        }
        if let Some(previous_relay) = previous_relay {
            best_effort(Subordinate::Relay, previous_relay.quit()).await;
        }

        self.init_relay().await?;
        if let Err(e) = self.init_messaging_client().await {
            let relay = self.lock().relay.take();
            if let Some(relay) = relay {
                best_effort(Subordinate::Relay, relay.quit()).await;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Create the relay for the current messaging client and bring it up
    ///
    /// A no-op when the target state is no longer `Connected`. State is left untouched
    /// on failure; the calling operation rolls back. A relay that comes up after the
    /// target flipped or the messaging client was replaced is quit instead of stored.
    pub async fn init_relay(&self) -> Result<()> {
        let (messaging, token) = {
            let inner = self.lock();
            debug!("initRelay() with token {}", mask_token(&inner.token));

            if inner.target != TargetState::Connected {
                warn!("initRelay() targetState is not `connected`, skipped");
                return Ok(());
            }
            let Some(messaging) = inner.messaging.clone() else {
                return Err(IoClientError::MissingMessagingClient);
            };
            (messaging, inner.token.clone())
        };

        let relay = self
            .collaborators
            .relay_factory
            .create(messaging.clone(), &token)
            .map_err(|e| IoClientError::subordinate_init(Subordinate::Relay, e))?;

        if let Err(e) = relay.init().await {
            debug!("initRelay() init fail: {}", e);
            return Err(IoClientError::subordinate_init(Subordinate::Relay, e));
        }

        let stored = {
            let mut inner = self.lock();
            let still_wanted = inner.target == TargetState::Connected
                && inner
                    .messaging
                    .as_ref()
                    .is_some_and(|current| same_client(current, &messaging));
            if still_wanted {
                inner.relay = Some(relay.clone());
            }
            still_wanted
        };
        if !stored {
            warn!("initRelay() superseded while connecting, dropping the new relay");
            best_effort(Subordinate::Relay, relay.quit()).await;
        }
        Ok(())
    }

    /// Subscribe to the messaging client's events, then bring it up
    ///
    /// A no-op when the target state is no longer `Connected`. On failure the subscription
    /// is cancelled and the client is quit on a best-effort basis.
    pub async fn init_messaging_client(&self) -> Result<()> {
        debug!("initMessagingClient()");
        let (messaging, previous) = {
            let mut inner = self.lock();
            if inner.target != TargetState::Connected {
                warn!("initMessagingClient() targetState is not `connected`, skipped");
                return Ok(());
            }
            let messaging = inner
                .messaging
                .clone()
                .ok_or(IoClientError::MissingMessagingClient)?;
            let subscription = EventSubscription::spawn(
                messaging.subscribe(),
                self.collaborators.message_handler.clone(),
            );
            (messaging, inner.subscription.replace(subscription))
        };
        if let Some(previous) = previous {
            previous.cancel();
        }

        match messaging.init().await {
            Ok(()) => {
                debug!("messaging client init succ");
                let dropped = {
                    let inner = self.lock();
                    !inner
                        .messaging
                        .as_ref()
                        .is_some_and(|current| same_client(current, &messaging))
                };
                if dropped {
                    warn!("initMessagingClient() client was torn down while logging in");
                    best_effort(Subordinate::MessagingClient, messaging.quit()).await;
                }
                Ok(())
            }
            Err(e) => {
                error!("initMessagingClient() init fail: {}", e);
                let subscription = self.lock().subscription.take();
                if let Some(subscription) = subscription {
                    subscription.cancel();
                }
                best_effort(Subordinate::MessagingClient, messaging.quit()).await;
                Err(IoClientError::subordinate_init(Subordinate::MessagingClient, e))
            }
        }
    }

    /// Warm start: re-create only the relay when a messaging client already exists
    pub async fn start(&self) -> Result<()> {
        debug!("start()");
        if !self.has_messaging_client() {
            return self.init().await;
        }

        let started = Instant::now();
        self.begin(LifecycleOp::Start, TargetState::Connected, CurrentState::Connecting)?;

        let result = self.init_relay().await;
        self.finish(LifecycleOp::Start, started, result, CurrentState::Connected)
    }

    /// Quit the relay but keep the messaging client, so `start` can reuse it
    pub async fn stop(&self) -> Result<()> {
        debug!("stop()");
        let started = Instant::now();
        let previous =
            self.begin(LifecycleOp::Stop, TargetState::Disconnected, CurrentState::Disconnecting)?;

        let relay = self.lock().relay.clone();
        let Some(relay) = relay else {
            self.report_missing(Subordinate::Relay, LifecycleOp::Stop);
            // Nothing to tear down. An interrupted bring-up must not report connected.
            let settled = if previous.is_pending() {
                CurrentState::Disconnected
            } else {
                CurrentState::Connected
            };
            self.set_current_state(settled);
            return Ok(());
        };

        let result = relay
            .quit()
            .await
            .map_err(|e| IoClientError::subordinate_quit(Subordinate::Relay, e));
        self.finish(LifecycleOp::Stop, started, result, CurrentState::Disconnected)
    }

    /// `stop()` then `start()`; a failed stop never starts
    pub async fn restart(&self) -> Result<()> {
        debug!("restart()");
        {
            let inner = self.lock();
            self.check(&inner, LifecycleOp::Restart)?;
        }

        let result = async {
            self.stop().await?;
            self.start().await
        }
        .await;

        if let Err(e) = &result {
            error!("restart() exception {}", e);
        }
        result
    }

    /// Full teardown of both subordinates
    ///
    /// The relay is quit even when the messaging client's quit fails, both handles are
    /// cleared either way, and the coordinator always ends `Disconnected`. The first
    /// failure is returned.
    pub async fn quit(&self) -> Result<()> {
        debug!("quit()");
        let started = Instant::now();
        self.begin(LifecycleOp::Quit, TargetState::Disconnected, CurrentState::Disconnecting)?;

        let (messaging, subscription, relay) = {
            let mut inner = self.lock();
            (
                inner.messaging.clone(),
                inner.subscription.take(),
                inner.relay.clone(),
            )
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }

        let mut first_error = None;

        match messaging {
            Some(messaging) => {
                if let Err(e) = messaging.quit().await {
                    error!("quit() messaging client quit fail: {}", e);
                    first_error.get_or_insert(IoClientError::subordinate_quit(
                        Subordinate::MessagingClient,
                        e,
                    ));
                }
                self.lock().messaging = None;
            }
            None => self.report_missing(Subordinate::MessagingClient, LifecycleOp::Quit),
        }

        match relay {
            Some(relay) => {
                if let Err(e) = relay.quit().await {
                    error!("quit() relay quit fail: {}", e);
                    first_error.get_or_insert(IoClientError::subordinate_quit(
                        Subordinate::Relay,
                        e,
                    ));
                }
                self.lock().relay = None;
            }
            None => self.report_missing(Subordinate::Relay, LifecycleOp::Quit),
        }

        let result = match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        };
        self.finish(LifecycleOp::Quit, started, result, CurrentState::Disconnected)
    }
}

/// Run a teardown whose failure is logged and swallowed
async fn best_effort<F>(component: Subordinate, teardown: F)
where
    F: Future<Output = Result<()>>,
{
    if let Err(e) = teardown.await {
        warn!("best-effort {} quit failed: {}", component, e);
    }
}

fn same_client(a: &Arc<dyn MessagingClient>, b: &Arc<dyn MessagingClient>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Contact, ReadyMessage};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn client_config(token: &str) -> ClientConfig {
        ClientConfig {
            token: Some(token.to_string()),
            profile: "demo".to_string(),
        }
    }

    fn loopback_coordinator() -> LifecycleCoordinator {
        LifecycleCoordinator::new(&client_config("secret-token"), Collaborators::loopback())
            .unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_new_requires_token() {
        let err = LifecycleCoordinator::new(&client_config("  "), Collaborators::loopback())
            .err()
            .unwrap();
        assert!(matches!(err, IoClientError::Config(_)));

        let config = ClientConfig {
            token: None,
            profile: "demo".to_string(),
        };
        assert!(LifecycleCoordinator::new(&config, Collaborators::loopback()).is_err());
    }

    #[test]
    fn test_new_requires_profile() {
        let config = ClientConfig {
            token: Some("t".to_string()),
            profile: String::new(),
        };
        assert!(LifecycleCoordinator::new(&config, Collaborators::loopback()).is_err());
    }

    #[test]
    fn test_initial_state() {
        let coordinator = loopback_coordinator();
        assert_eq!(coordinator.target_state(), TargetState::Disconnected);
        assert_eq!(coordinator.current_state(), CurrentState::Disconnected);
        assert_eq!(coordinator.token(), "secret-token");
        assert_eq!(coordinator.profile(), "demo");
        assert!(!coordinator.has_messaging_client());
        assert!(!coordinator.has_relay());
    }

    #[test]
    fn test_accessors_store_and_return() {
        let coordinator = loopback_coordinator();

        assert_eq!(coordinator.set_token("next"), "next");
        assert_eq!(coordinator.set_token(""), "next");
        assert_eq!(coordinator.token(), "next");

        assert_eq!(
            coordinator.set_target_state(TargetState::Connected),
            TargetState::Connected
        );
        assert_eq!(coordinator.target_state(), TargetState::Connected);

        assert_eq!(
            coordinator.set_current_state(CurrentState::Connecting),
            CurrentState::Connecting
        );
        assert_eq!(coordinator.current_state(), CurrentState::Connecting);
        assert!(coordinator.snapshot().last_transition_at.is_some());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefgh"), "abcd***");
        assert_eq!(mask_token("ab"), "ab***");
    }

    #[tokio::test]
    async fn test_init_and_quit_with_loopback() {
        let coordinator = loopback_coordinator();
        let mut state = coordinator.subscribe_state();

        coordinator.init().await.unwrap();
        assert_eq!(coordinator.current_state(), CurrentState::Connected);
        assert_eq!(coordinator.target_state(), TargetState::Connected);
        assert!(coordinator.snapshot().is_healthy());
        assert!(state.has_changed().unwrap());
        assert_eq!(*state.borrow_and_update(), CurrentState::Connected);

        coordinator.quit().await.unwrap();
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.current_state, CurrentState::Disconnected);
        assert_eq!(snapshot.target_state, TargetState::Disconnected);
        assert!(!snapshot.has_messaging_client);
        assert!(!snapshot.has_relay);
        assert!(!snapshot.subscribed);
    }

    #[tokio::test]
    async fn test_completed_operation_reports_duration() {
        let coordinator = loopback_coordinator();
        let mut events = coordinator.subscribe_events();

        coordinator.init().await.unwrap();

        let completed: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::OperationCompleted { op, duration_ms } => Some((op, duration_ms)),
                _ => None,
            })
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].0, LifecycleOp::Init);
        assert!(completed[0].1 < 60_000);
    }

    #[tokio::test]
    async fn test_quit_without_subordinates_reports_both_missing() {
        let coordinator = loopback_coordinator();
        let mut events = coordinator.subscribe_events();

        coordinator.quit().await.unwrap();
        assert_eq!(coordinator.current_state(), CurrentState::Disconnected);

        let missing: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::SubordinateMissing { component, op } => Some((component, op)),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            vec![
                (Subordinate::MessagingClient, LifecycleOp::Quit),
                (Subordinate::Relay, LifecycleOp::Quit),
            ]
        );
    }

    #[tokio::test]
    async fn test_stop_without_relay_reverts_to_connected() {
        let coordinator = loopback_coordinator();
        let mut events = coordinator.subscribe_events();

        coordinator.stop().await.unwrap();
        assert_eq!(coordinator.current_state(), CurrentState::Connected);
        assert_eq!(coordinator.target_state(), TargetState::Disconnected);
        assert!(drain(&mut events).contains(&LifecycleEvent::SubordinateMissing {
            component: Subordinate::Relay,
            op: LifecycleOp::Stop,
        }));
    }

    #[tokio::test]
    async fn test_stop_then_start_reuses_messaging_client() {
        let coordinator = loopback_coordinator();
        coordinator.init().await.unwrap();

        coordinator.stop().await.unwrap();
        assert_eq!(coordinator.current_state(), CurrentState::Disconnected);
        assert!(coordinator.has_messaging_client());
        assert!(coordinator.has_relay());

        coordinator.start().await.unwrap();
        assert_eq!(coordinator.current_state(), CurrentState::Connected);
        assert!(coordinator.snapshot().is_healthy());
    }

    struct ChannelHandler {
        tx: mpsc::UnboundedSender<ReadyMessage>,
    }

    #[async_trait]
    impl MessageHandler for ChannelHandler {
        async fn on_message(&self, message: ReadyMessage) -> Result<()> {
            let _ = self.tx.send(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_messages_dispatched_after_init() {
        let factory = Arc::new(LoopbackMessagingFactory::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let collaborators = Collaborators::new(factory.clone(), Arc::new(LoopbackRelayFactory))
            .with_message_handler(Arc::new(ChannelHandler { tx }));
        let coordinator =
            LifecycleCoordinator::new(&client_config("secret-token"), collaborators).unwrap();

        coordinator.init().await.unwrap();
        let client = factory.last_client().unwrap();
        assert!(client.is_logged_in());
        assert!(client.inject_text(Contact::new("u1", "alice"), "wechaty rocks"));

        let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.content, "wechaty rocks");

        coordinator.quit().await.unwrap();
        assert!(!client.is_logged_in());
    }
}
