//! Connection states and the lifecycle transition table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operator intent for connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    Connected,
    Disconnected,
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetState::Connected => write!(f, "connected"),
            TargetState::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Observed progress towards the target state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentState {
    /// Bringing subordinates up
    Connecting,
    /// Both subordinates are up
    Connected,
    /// Tearing subordinates down
    Disconnecting,
    /// Nothing is running
    Disconnected,
}

impl CurrentState {
    /// A lifecycle operation is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, CurrentState::Connecting | CurrentState::Disconnecting)
    }

    /// Settled state an operation may end in
    pub fn is_stable(&self) -> bool {
        !self.is_pending()
    }
}

impl std::fmt::Display for CurrentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrentState::Connecting => write!(f, "connecting"),
            CurrentState::Connected => write!(f, "connected"),
            CurrentState::Disconnecting => write!(f, "disconnecting"),
            CurrentState::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Public lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleOp {
    Init,
    Start,
    Stop,
    Restart,
    Quit,
}

impl std::fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleOp::Init => write!(f, "init()"),
            LifecycleOp::Start => write!(f, "start()"),
            LifecycleOp::Stop => write!(f, "stop()"),
            LifecycleOp::Restart => write!(f, "restart()"),
            LifecycleOp::Quit => write!(f, "quit()"),
        }
    }
}

/// The two services supervised by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subordinate {
    MessagingClient,
    Relay,
}

impl std::fmt::Display for Subordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subordinate::MessagingClient => write!(f, "messaging client"),
            Subordinate::Relay => write!(f, "relay"),
        }
    }
}

/// An operation refused because another one is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{op} rejected while {state}")]
pub struct PendingOperation {
    pub op: LifecycleOp,
    pub state: CurrentState,
}

/// Decide whether `op` may begin while the coordinator is in `current`.
///
/// `stop()` is unconditional and `quit()` is refused only while a teardown is already
/// running. Everything else requires a stable state.
pub fn check_transition(current: CurrentState, op: LifecycleOp) -> Result<(), PendingOperation> {
    let rejected = match op {
        LifecycleOp::Init | LifecycleOp::Start | LifecycleOp::Restart => current.is_pending(),
        LifecycleOp::Quit => current == CurrentState::Disconnecting,
        LifecycleOp::Stop => false,
    };

    if rejected {
        Err(PendingOperation { op, state: current })
    } else {
        Ok(())
    }
}
