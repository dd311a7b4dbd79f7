//! Cloneable façade for issuing commands to a battle session.
//!
//! [`SessionHandle`] hides channel plumbing so the chat layer can forward
//! button presses from any task and stream events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use battle_core::{Action, ActionReport, CombatantId, UserId};

use super::errors::{Result, RuntimeError};
use crate::events::{BattleEvent, EventBus, Topic};
use crate::session::Command;

/// Client-facing handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Remember `target` as the enemy `user` attacks next.
    pub async fn select_target(&self, user: UserId, target: CombatantId) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::SelectTarget {
                user,
                target,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx
            .await
            .map_err(RuntimeError::ReplyChannelClosed)?
            .map_err(RuntimeError::Rejected)
    }

    /// Submit `user`'s action for the open window.
    ///
    /// The command is queued until the session collects user actions. A
    /// rejection is returned as [`RuntimeError::Rejected`]; the user may try
    /// again while the window is still open.
    pub async fn submit_action(&self, user: UserId, action: Action) -> Result<ActionReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::SubmitAction {
                user,
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx
            .await
            .map_err(RuntimeError::ReplyChannelClosed)?
            .map_err(RuntimeError::Rejected)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - Turn starts and window settles
    /// - `Topic::Action` - Resolved user and bot actions
    /// - `Topic::Outcome` - Battle end and reward payout
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use battle_runtime::Topic;
    ///
    /// let mut outcome_rx = handle.subscribe(Topic::Outcome);
    /// while let Ok(event) = outcome_rx.recv().await {
    ///     // Handle outcome events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BattleEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// True once the session stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}
