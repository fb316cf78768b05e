//! Tab runtime
//!
//! A tab is a single cooperative task. User commands, backend replies and
//! broadcasts from other tabs are all handled on it, one at a time, so the
//! controller never needs a lock.

use breakwatch_broadcast::BroadcastChannel;
use breakwatch_client::{ClientResult, StatusClient};
use breakwatch_config::DisplayConfig;
use breakwatch_store::TimerStateStore;
use breakwatch_util::{BreakError, TabId, TimeSource};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::{BreakPhase, BreakSessionController, BreakView, OutboundRequest, ServerReply, Ticket};

/// User input delivered to a tab
#[derive(Debug)]
pub enum TabCommand {
    Start,
    End,
    CancelReason,
    SubmitReason(String),
    /// Re-run load-time reconciliation, as a page reload would
    Reload,
    /// Report the current phase
    Inspect(oneshot::Sender<BreakPhase>),
    Close,
}

type Reply = (Ticket, ClientResult<ServerReply>);

/// Sends commands to a running [`Tab`]
#[derive(Clone)]
pub struct TabHandle {
    tab_id: TabId,
    commands: mpsc::UnboundedSender<TabCommand>,
}

impl TabHandle {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn send(&self, command: TabCommand) -> Result<(), BreakError> {
        self.commands
            .send(command)
            .map_err(|_| BreakError::internal(format!("tab {} is closed", self.tab_id.short())))
    }

    pub fn start(&self) -> Result<(), BreakError> {
        self.send(TabCommand::Start)
    }

    pub fn end(&self) -> Result<(), BreakError> {
        self.send(TabCommand::End)
    }

    pub fn cancel_reason(&self) -> Result<(), BreakError> {
        self.send(TabCommand::CancelReason)
    }

    pub fn submit_reason(&self, reason: impl Into<String>) -> Result<(), BreakError> {
        self.send(TabCommand::SubmitReason(reason.into()))
    }

    pub fn reload(&self) -> Result<(), BreakError> {
        self.send(TabCommand::Reload)
    }

    pub fn close(&self) -> Result<(), BreakError> {
        self.send(TabCommand::Close)
    }

    /// Ask the tab for its phase once every command sent before is handled
    pub async fn phase(&self) -> Result<BreakPhase, BreakError> {
        let (tx, rx) = oneshot::channel();
        self.send(TabCommand::Inspect(tx))?;
        rx.await
            .map_err(|_| BreakError::internal(format!("tab {} is closed", self.tab_id.short())))
    }
}

/// One tab: a controller wired to the backend, the shared store and its siblings
pub struct Tab {
    controller: BreakSessionController,
    client: Arc<dyn StatusClient>,
    broadcast: BroadcastChannel,
    commands: mpsc::UnboundedReceiver<TabCommand>,
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies: mpsc::UnboundedReceiver<Reply>,
}

impl Tab {
    /// Create a tab. Broadcasts are received from this point on.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        store: TimerStateStore,
        view: Arc<dyn BreakView>,
        client: Arc<dyn StatusClient>,
        time: Arc<dyn TimeSource>,
        display: &DisplayConfig,
    ) -> (Self, TabHandle) {
        let broadcast = BroadcastChannel::open(&store);
        let controller = BreakSessionController::new(store, view, time, display);
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (replies_tx, replies) = mpsc::unbounded_channel();

        let handle = TabHandle {
            tab_id: controller.tab_id(),
            commands: commands_tx,
        };

        let tab = Self {
            controller,
            client,
            broadcast,
            commands,
            replies_tx,
            replies,
        };

        (tab, handle)
    }

    pub fn tab_id(&self) -> TabId {
        self.controller.tab_id()
    }

    /// Load, then handle events until closed
    pub async fn run(mut self) {
        let tab_id = self.tab_id();
        info!(tab_id = %tab_id.short(), "Tab opened");

        let load = self.controller.load();
        self.dispatch(load);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(TabCommand::Close) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }

                Some((ticket, result)) = self.replies.recv() => {
                    if let Some(follow_up) = self.controller.on_reply(ticket, result) {
                        self.dispatch(follow_up);
                    }
                }

                message = self.broadcast.next() => {
                    match message {
                        Ok(message) => self.controller.on_broadcast(message),
                        Err(e) => {
                            info!(tab_id = %tab_id.short(), error = %e, "Broadcast channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!(tab_id = %tab_id.short(), phase = self.controller.phase().name(), "Tab closed");
    }

    fn handle_command(&mut self, command: TabCommand) {
        debug!(tab_id = %self.tab_id().short(), ?command, "Tab command");

        let result = match command {
            TabCommand::Start => self.controller.click_start().map(Some),
            TabCommand::End => self.controller.click_end().map(|_| None),
            TabCommand::CancelReason => self.controller.cancel_reason().map(|_| None),
            TabCommand::SubmitReason(reason) => self.controller.submit_reason(&reason).map(Some),
            TabCommand::Reload => Ok(Some(self.controller.load())),
            TabCommand::Inspect(reply) => {
                let _ = reply.send(self.controller.phase());
                Ok(None)
            }
            TabCommand::Close => Ok(None),
        };

        match result {
            Ok(Some(request)) => self.dispatch(request),
            Ok(None) => {}
            Err(e) => debug!(tab_id = %self.tab_id().short(), error = %e, "Command refused"),
        }
    }

    /// Run a backend call off the tab loop; its reply comes back through `replies`
    fn dispatch(&self, request: OutboundRequest) {
        let client = self.client.clone();
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let result = request.call.execute(client.as_ref()).await;
            let _ = replies.send((request.ticket, result));
        });
    }
}
