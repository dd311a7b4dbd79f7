//! User action window.
//!
//! Pure decision logic for the per-turn collection window. The caller owns
//! the timer; it feeds events here and cancels the timer on
//! [`WindowDecision::Close`].

use std::collections::BTreeSet;

use crate::entity::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    TimerExpired,
    ActionAccepted(UserId),
    ActionRejected(UserId),
    BattleFinished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The countdown ran out.
    Expired,
    /// Every eligible user acted before the countdown ended.
    AllActed,
    /// An action ended the battle.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowDecision {
    KeepOpen,
    Close(CloseReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionWindow {
    eligible: BTreeSet<UserId>,
    acted: BTreeSet<UserId>,
    delay: u64,
    closed: Option<CloseReason>,
}

impl ActionWindow {
    pub fn open(eligible: impl IntoIterator<Item = UserId>, delay: u64) -> Self {
        Self {
            eligible: eligible.into_iter().collect(),
            acted: BTreeSet::new(),
            delay,
            closed: None,
        }
    }

    /// Window length in caller-defined ticks.
    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn is_open(&self) -> bool {
        self.closed.is_none()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn is_eligible(&self, user: UserId) -> bool {
        self.eligible.contains(&user)
    }

    pub fn has_acted(&self, user: UserId) -> bool {
        self.acted.contains(&user)
    }

    /// Eligible users that have not acted yet.
    pub fn pending(&self) -> impl Iterator<Item = UserId> + '_ {
        self.eligible.difference(&self.acted).copied()
    }

    /// Applies an event. Once closed, every later event keeps it closed with
    /// the original reason.
    pub fn handle(&mut self, event: WindowEvent) -> WindowDecision {
        if let Some(reason) = self.closed {
            return WindowDecision::Close(reason);
        }

        let decision = match event {
            WindowEvent::TimerExpired => WindowDecision::Close(CloseReason::Expired),
            WindowEvent::BattleFinished => WindowDecision::Close(CloseReason::Finished),
            WindowEvent::ActionRejected(_) => WindowDecision::KeepOpen,
            WindowEvent::ActionAccepted(user) => {
                if self.eligible.contains(&user) {
                    self.acted.insert(user);
                }
                if self.pending().next().is_none() {
                    WindowDecision::Close(CloseReason::AllActed)
                } else {
                    WindowDecision::KeepOpen
                }
            }
        };

        if let WindowDecision::Close(reason) = decision {
            self.closed = Some(reason);
        }
        decision
    }
}
