pub mod loopback;
pub mod traits;
pub mod types;

pub use loopback::{
    LoggingMessageHandler, LoopbackMessage, LoopbackMessagingClient, LoopbackMessagingFactory,
    LoopbackRelay, LoopbackRelayFactory,
};
pub use traits::{
    IncomingMessage, MessageHandler, MessagingClient, MessagingClientFactory, RelayClient,
    RelayFactory,
};
pub use types::{BotEvent, Contact, ReadyMessage};
