//! Cancellable countdown backing the per-turn action window.
//!
//! The timer only answers "has the deadline passed". Which window event wins
//! (expiry, every user acted, battle over) is decided by
//! [`battle_core::ActionWindow`].

use std::time::Duration;

use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { deadline: Instant },
    Expired,
    Cancelled,
}

#[derive(Debug)]
pub struct ActionWindowTimer {
    state: TimerState,
}

impl ActionWindowTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
        }
    }

    /// Arms the timer for `duration` from now, replacing any previous run.
    pub fn start(&mut self, duration: Duration) {
        self.state = TimerState::Running {
            deadline: Instant::now() + duration,
        };
    }

    /// Stops a running timer. Returns false if it was not running.
    pub fn cancel(&mut self) -> bool {
        if self.is_running() {
            self.state = TimerState::Cancelled;
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_expired(&self) -> bool {
        match self.state {
            TimerState::Expired => true,
            TimerState::Running { deadline } => Instant::now() >= deadline,
            _ => false,
        }
    }

    /// Time left before expiry, if running.
    pub fn remaining(&self) -> Option<Duration> {
        match self.state {
            TimerState::Running { deadline } => {
                Some(deadline.saturating_duration_since(Instant::now()))
            }
            _ => None,
        }
    }

    /// Resolves when a running timer reaches its deadline.
    ///
    /// Never resolves when the timer is idle or cancelled, so it can sit in a
    /// `select!` next to other sources. Cancel-safe.
    pub async fn expired(&mut self) {
        match self.state {
            TimerState::Running { deadline } => {
                tokio::time::sleep_until(deadline).await;
                self.state = TimerState::Expired;
            }
            TimerState::Expired => {}
            TimerState::Idle | TimerState::Cancelled => std::future::pending().await,
        }
    }
}

impl Default for ActionWindowTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expires_after_duration() {
        let mut timer = ActionWindowTimer::new();
        timer.start(Duration::from_secs(30));
        assert!(timer.is_running());
        assert!(!timer.is_expired());

        let started = Instant::now();
        timer.expired().await;

        assert_eq!(started.elapsed(), Duration::from_secs(30));
        assert!(timer.is_expired());
        assert!(!timer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let mut timer = ActionWindowTimer::new();
        timer.start(Duration::from_secs(2));
        assert!(timer.cancel());
        assert_eq!(timer.state(), TimerState::Cancelled);

        let fired = tokio::time::timeout(Duration::from_secs(10), timer.expired()).await;
        assert!(fired.is_err());
        assert!(!timer.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_deadline() {
        let mut timer = ActionWindowTimer::new();
        timer.start(Duration::from_secs(1));
        timer.start(Duration::from_secs(5));
        assert_eq!(timer.remaining(), Some(Duration::from_secs(5)));
    }
}
