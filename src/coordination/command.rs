//! Control commands: lifecycle requests sent to the task that owns the coordinator

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::coordinator::LifecycleCoordinator;
use super::state::LifecycleOp;
use crate::error::{IoClientError, Result};

type Reply = oneshot::Sender<Result<()>>;

/// Commands executed by [`run_control_loop`]
#[derive(Debug)]
pub enum ControlCommand {
    Start(Reply),
    Stop(Reply),
    Restart(Reply),
    /// Full teardown; the loop exits after answering
    Quit(Reply),
}

impl ControlCommand {
    pub fn op(&self) -> LifecycleOp {
        match self {
            ControlCommand::Start(_) => LifecycleOp::Start,
            ControlCommand::Stop(_) => LifecycleOp::Stop,
            ControlCommand::Restart(_) => LifecycleOp::Restart,
            ControlCommand::Quit(_) => LifecycleOp::Quit,
        }
    }

    fn into_reply(self) -> Reply {
        match self {
            ControlCommand::Start(reply)
            | ControlCommand::Stop(reply)
            | ControlCommand::Restart(reply)
            | ControlCommand::Quit(reply) => reply,
        }
    }
}

/// Cloneable sender side of the control channel
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlCommand>,
}

impl ControlHandle {
    pub async fn start(&self) -> Result<()> {
        self.request(ControlCommand::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.request(ControlCommand::Stop).await
    }

    pub async fn restart(&self) -> Result<()> {
        self.request(ControlCommand::Restart).await
    }

    pub async fn quit(&self) -> Result<()> {
        self.request(ControlCommand::Quit).await
    }

    async fn request(&self, command: fn(Reply) -> ControlCommand) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .await
            .map_err(|_| IoClientError::ControlChannelClosed)?;
        reply_rx
            .await
            .map_err(|_| IoClientError::ControlChannelClosed)?
    }
}

/// Create a control channel holding up to `capacity` queued commands
pub fn control_channel(capacity: usize) -> (ControlHandle, mpsc::Receiver<ControlCommand>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ControlHandle { tx }, rx)
}

/// Execute commands one at a time until a `Quit` is handled or every handle is dropped
pub async fn run_control_loop(
    coordinator: Arc<LifecycleCoordinator>,
    mut commands: mpsc::Receiver<ControlCommand>,
) {
    info!("control loop started");

    while let Some(command) = commands.recv().await {
        let op = command.op();
        debug!("control command {}", op);

        let result = match op {
            LifecycleOp::Start | LifecycleOp::Init => coordinator.start().await,
            LifecycleOp::Stop => coordinator.stop().await,
            LifecycleOp::Restart => coordinator.restart().await,
            LifecycleOp::Quit => coordinator.quit().await,
        };

        if command.into_reply().send(result).is_err() {
            warn!("control command {} finished after its caller went away", op);
        }
        if op == LifecycleOp::Quit {
            break;
        }
    }

    info!("control loop stopped");
}
