//! Coordination layer for the bot process
//!
//! - Connection states and the transition table
//! - The lifecycle coordinator supervising the messaging client and the relay
//! - Event subscription wiring for the messaging client
//! - Control commands and shutdown signal handling for the process main loop

pub mod command;
pub mod coordinator;
pub mod lifecycle;
pub mod shutdown;
pub mod state;
pub mod subscription;

pub use command::{control_channel, run_control_loop, ControlCommand, ControlHandle};
pub use coordinator::{Collaborators, LifecycleCoordinator};
pub use lifecycle::{CoordinatorSnapshot, LifecycleEvent};
pub use shutdown::{wait_for_shutdown_signal, ShutdownSignal};
pub use state::{
    check_transition, CurrentState, LifecycleOp, PendingOperation, Subordinate, TargetState,
};
pub use subscription::EventSubscription;
