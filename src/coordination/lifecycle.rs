//! Lifecycle events and snapshots published by the coordinator

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::{CurrentState, LifecycleOp, PendingOperation, Subordinate, TargetState};

/// Lifecycle events broadcast to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Current state changed
    StateChanged {
        from: CurrentState,
        to: CurrentState,
    },
    /// Target state written by an operation
    TargetChanged { to: TargetState },
    /// Operation refused because another one is in flight
    OperationRejected(PendingOperation),
    /// Operation found no handle for a subordinate it would act on
    SubordinateMissing {
        component: Subordinate,
        op: LifecycleOp,
    },
    /// Operation finished successfully
    OperationCompleted { op: LifecycleOp, duration_ms: u64 },
    /// Operation failed; the coordinator has already settled
    OperationFailed { op: LifecycleOp, error: String },
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    pub target_state: TargetState,
    pub current_state: CurrentState,
    pub has_messaging_client: bool,
    pub has_relay: bool,
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_at: Option<DateTime<Utc>>,
}

impl CoordinatorSnapshot {
    /// Connected with both subordinates in place
    pub fn is_healthy(&self) -> bool {
        self.current_state == CurrentState::Connected
            && self.has_messaging_client
            && self.has_relay
    }
}
