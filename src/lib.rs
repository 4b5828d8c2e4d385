pub mod adapters;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod error;
pub mod logging;

pub use adapters::{
    BotEvent, Contact, IncomingMessage, MessageHandler, MessagingClient, MessagingClientFactory,
    ReadyMessage, RelayClient, RelayFactory,
};
pub use config::AppConfig;
pub use coordination::{
    Collaborators, ControlHandle, CoordinatorSnapshot, CurrentState, LifecycleCoordinator,
    LifecycleEvent, LifecycleOp, TargetState,
};
pub use error::{IoClientError, Result};
