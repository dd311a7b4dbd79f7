//! Battle session: owns one [`Battle`] and drives it with real time.
//!
//! The session is the imperative shell around the pure engine. It opens a
//! timed window for users, serializes their commands into the battle one at a
//! time, lets bots act once the window settles, renders the translated log
//! through the messenger and pays rewards exactly once at the end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use battle_content::MessageCatalog;
use battle_core::{
    Action, ActionRejection, ActionReport, Battle, BattleOutcome, CloseReason, CombatantId,
    Entity, Side, TurnStart, UserId,
};

use crate::api::{
    BattleMessenger, CollaboratorKind, Localizer, Result, RuntimeError, SessionHandle, Wallet,
};
use crate::events::{ActionEvent, BattleEvent, EventBus, OutcomeEvent, TurnEvent};
use crate::timer::ActionWindowTimer;

/// Session tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Wall-clock length of one window tick.
    pub tick: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Safety stop for battles that cannot end.
    pub max_turns: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            event_buffer_size: 100,
            command_buffer_size: 32,
            max_turns: 10_000,
        }
    }
}

/// Commands that can be sent to a running session
pub(crate) enum Command {
    SelectTarget {
        user: UserId,
        target: CombatantId,
        reply: oneshot::Sender<std::result::Result<(), ActionRejection>>,
    },
    SubmitAction {
        user: UserId,
        action: Action,
        reply: oneshot::Sender<std::result::Result<ActionReport, ActionRejection>>,
    },
}

impl Command {
    fn reject(self, rejection: ActionRejection) {
        // The caller may have given up waiting; nothing to do then.
        match self {
            Command::SelectTarget { reply, .. } => {
                let _ = reply.send(Err(rejection));
            }
            Command::SubmitAction { reply, .. } => {
                let _ = reply.send(Err(rejection));
            }
        }
    }
}

/// What a finished session hands back.
#[derive(Debug)]
pub struct SessionOutcome {
    pub outcome: BattleOutcome,
    /// Entities of side A and side B, ready to be persisted.
    pub entities: [Vec<Entity>; 2],
}

pub struct BattleSession {
    battle: Battle,
    config: SessionConfig,
    messenger: Arc<dyn BattleMessenger>,
    wallet: Arc<dyn Wallet>,
    localizer: Arc<dyn Localizer>,
    commands: mpsc::Receiver<Command>,
    commands_open: bool,
    events: EventBus,
    timer: ActionWindowTimer,
    handles: Vec<UserId>,
    rewards_paid: bool,
}

impl BattleSession {
    /// Create a new session builder around an unstarted battle
    pub fn builder(battle: Battle) -> BattleSessionBuilder {
        BattleSessionBuilder::new(battle)
    }

    /// Runs the battle to its end.
    ///
    /// Collaborator failures are logged and never stop the battle. Returns
    /// the outcome together with both sides' entities.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let mut turn = self.battle.start()?;
        info!(
            first = %self.battle.current_side(),
            side_a = self.battle.roster().group(Side::A).len(),
            side_b = self.battle.roster().group(Side::B).len(),
            "battle started"
        );

        loop {
            self.flush_log().await;

            match turn {
                TurnStart::Finished(outcome) => return Ok(self.finish(outcome).await),
                TurnStart::BotsOnly { side } => self.publish_turn_started(side, Vec::new()),
                TurnStart::AwaitingUsers {
                    side,
                    eligible,
                    delay,
                } => {
                    self.publish_turn_started(side, eligible.clone());
                    self.collect_user_actions(side, eligible, delay).await;
                }
            }

            let turns = self.battle.scheduler().turns();
            if turns >= self.config.max_turns && !self.battle.is_finished() {
                warn!(turns, "battle hit the turn limit");
                return Err(RuntimeError::TurnLimitReached { turns });
            }

            let (reports, next) = self.battle.finish_turn();
            for report in reports {
                self.events.publish(BattleEvent::Action(ActionEvent {
                    report,
                    by_user: false,
                }));
            }
            turn = next;
        }
    }

    /// Keeps the window open until it expires, every user acted, or the
    /// battle ends.
    async fn collect_user_actions(&mut self, side: Side, eligible: Vec<UserId>, delay: u64) {
        for &user in &eligible {
            if let Err(err) = self.messenger.add_action_handle(user).await {
                warn!(%user, error = %err, "failed to add action handle");
            }
        }
        self.handles = eligible;
        self.timer.start(self.window_duration(delay));
        debug!(%side, delay, "action window opened");

        while self.battle.is_collecting() {
            if !self.commands_open {
                self.timer.expired().await;
                self.battle.expire_window();
                break;
            }

            tokio::select! {
                _ = self.timer.expired() => {
                    self.battle.expire_window();
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("all session handles dropped; waiting out the window");
                        self.commands_open = false;
                    }
                },
            }
        }

        self.timer.cancel();
        let reason = self
            .battle
            .window()
            .and_then(|window| window.close_reason())
            .unwrap_or(CloseReason::Finished);
        debug!(%side, ?reason, "action window settled");
        self.events
            .publish(BattleEvent::Turn(TurnEvent::WindowSettled { side, reason }));

        for user in std::mem::take(&mut self.handles) {
            self.remove_handle(user).await;
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SelectTarget {
                user,
                target,
                reply,
            } => {
                let result = self.battle.select_target(user, target);
                if let Err(rejection) = &result {
                    debug!(%user, %target, %rejection, "target selection rejected");
                }
                if reply.send(result).is_err() {
                    debug!("SelectTarget reply channel closed (caller dropped)");
                }
            }
            Command::SubmitAction {
                user,
                action,
                reply,
            } => {
                let result = self.battle.try_submit(user, action);
                match &result {
                    Ok(report) => {
                        self.events.publish(BattleEvent::Action(ActionEvent {
                            report: report.clone(),
                            by_user: true,
                        }));
                        self.flush_log().await;
                        if let Some(pos) = self.handles.iter().position(|&u| u == user) {
                            self.handles.remove(pos);
                            self.remove_handle(user).await;
                        }
                    }
                    Err(rejection) => {
                        debug!(%user, ?action, %rejection, "action rejected");
                    }
                }
                if reply.send(result).is_err() {
                    debug!("SubmitAction reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn finish(mut self, outcome: BattleOutcome) -> SessionOutcome {
        info!(
            winner = %outcome.winner,
            victory = outcome.victory,
            reward_each = outcome.reward_each,
            rounds = outcome.rounds,
            "battle finished"
        );
        self.events
            .publish(BattleEvent::Outcome(OutcomeEvent::Finished(outcome.clone())));
        self.pay_rewards(&outcome).await;
        self.flush_log().await;

        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            command.reject(ActionRejection::BattleFinished);
        }

        SessionOutcome {
            outcome,
            entities: self.battle.into_entities(),
        }
    }

    /// Credits every rewarded user once. Failures are logged, not retried.
    async fn pay_rewards(&mut self, outcome: &BattleOutcome) {
        if self.rewards_paid {
            return;
        }
        self.rewards_paid = true;

        if !outcome.victory || outcome.reward_each <= 0 {
            return;
        }
        for &user in &outcome.rewarded {
            let amount = outcome.reward_each;
            let event = match self.wallet.add_money(user, amount).await {
                Ok(()) => {
                    debug!(%user, amount, "reward paid");
                    OutcomeEvent::RewardPaid { user, amount }
                }
                Err(err) => {
                    warn!(%user, amount, error = %err, "failed to pay reward");
                    OutcomeEvent::RewardFailed { user, amount }
                }
            };
            self.events.publish(BattleEvent::Outcome(event));
        }
    }

    /// Translates and renders everything the engine logged since last time.
    async fn flush_log(&mut self) {
        let messages = self.battle.drain_log();
        if messages.is_empty() {
            return;
        }
        let text = messages
            .iter()
            .map(|message| self.localizer.translate(message.key(), &message.params()))
            .collect::<Vec<_>>()
            .join("\n");
        if let Err(err) = self.messenger.render_log(&text).await {
            warn!(error = %err, lines = messages.len(), "failed to render battle log");
        }
    }

    async fn remove_handle(&mut self, user: UserId) {
        if let Err(err) = self.messenger.remove_action_handle(user).await {
            warn!(%user, error = %err, "failed to remove action handle");
        }
    }

    fn publish_turn_started(&self, side: Side, awaiting: Vec<UserId>) {
        self.events.publish(BattleEvent::Turn(TurnEvent::Started {
            side,
            round: self.battle.round(),
            multiplier: self.battle.round_multiplier(),
            awaiting,
        }));
    }

    fn window_duration(&self, delay: u64) -> Duration {
        self.config
            .tick
            .saturating_mul(u32::try_from(delay).unwrap_or(u32::MAX))
    }
}

/// Builder for [`BattleSession`]
pub struct BattleSessionBuilder {
    battle: Battle,
    config: SessionConfig,
    messenger: Option<Arc<dyn BattleMessenger>>,
    wallet: Option<Arc<dyn Wallet>>,
    localizer: Option<Arc<dyn Localizer>>,
    events: Option<EventBus>,
}

impl BattleSessionBuilder {
    fn new(battle: Battle) -> Self {
        Self {
            battle,
            config: SessionConfig::default(),
            messenger: None,
            wallet: None,
            localizer: None,
            events: None,
        }
    }

    /// Override session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the messaging collaborator (required)
    pub fn messenger(mut self, messenger: Arc<dyn BattleMessenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Set the money collaborator (required)
    pub fn wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Set the localizer. Defaults to an empty catalog, which renders keys.
    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Publish on an existing bus instead of a fresh one.
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the session and a handle for submitting commands into it.
    pub fn build(self) -> Result<(BattleSession, SessionHandle)> {
        let messenger = self.messenger.ok_or(RuntimeError::CollaboratorNotSet {
            kind: CollaboratorKind::Messenger,
        })?;
        let wallet = self.wallet.ok_or(RuntimeError::CollaboratorNotSet {
            kind: CollaboratorKind::Wallet,
        })?;
        let localizer = self
            .localizer
            .unwrap_or_else(|| Arc::new(MessageCatalog::default()));
        let events = self
            .events
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));
        let handle = SessionHandle::new(command_tx, events.clone());

        let session = BattleSession {
            battle: self.battle,
            config: self.config,
            messenger,
            wallet,
            localizer,
            commands: command_rx,
            commands_open: true,
            events,
            timer: ActionWindowTimer::new(),
            handles: Vec::new(),
            rewards_paid: false,
        };
        Ok((session, handle))
    }
}
