//! Team turn sequencing.
//!
//! A floating speed balance decides whether the side that just acted goes
//! again:
//!
//! ```text
//! after a regular turn:  balance += (speed_a - speed_b) * factor
//! A just acted and balance >= +1  -> balance -= 1, A acts again (bonus)
//! B just acted and balance <= -1  -> balance += 1, B acts again (bonus)
//! otherwise                       -> sides swap
//! ```
//!
//! A bonus turn does not add to the balance when it completes. One round is
//! two swaps.

use crate::rng::RandomSource;

use super::Side;

/// What happened when a turn was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnTransition {
    /// The same side acts again.
    Bonus,
    /// Control passed to the other side.
    Swapped { round_advanced: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurnScheduler {
    current: Side,
    round: u32,
    round_offbeat: bool,
    speed_balance: f64,
    dont_add_speed: bool,
    turns: u64,
}

impl TurnScheduler {
    pub fn new(first: Side) -> Self {
        Self {
            current: first,
            round: 0,
            round_offbeat: false,
            speed_balance: 0.0,
            dont_add_speed: false,
            turns: 0,
        }
    }

    /// Faster group opens; an exact tie is one coin flip for the whole group.
    pub fn initial_side(speed_a: f64, speed_b: f64, rng: &mut dyn RandomSource) -> Side {
        if speed_a > speed_b {
            Side::A
        } else if speed_b > speed_a {
            Side::B
        } else if rng.coin_flip() {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn current(&self) -> Side {
        self.current
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn speed_balance(&self) -> f64 {
        self.speed_balance
    }

    /// Whether the side now acting earned this turn from the speed balance.
    pub fn is_bonus_turn(&self) -> bool {
        self.dont_add_speed
    }

    /// Number of completed turns.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Closes the current side's turn and picks who acts next.
    pub fn advance(&mut self, speed_a: f64, speed_b: f64, factor: f64) -> TurnTransition {
        self.turns += 1;

        if !self.dont_add_speed {
            self.speed_balance += (speed_a - speed_b) * factor;
        }
        self.dont_add_speed = false;

        let bonus = match self.current {
            Side::A if self.speed_balance >= 1.0 => {
                self.speed_balance -= 1.0;
                true
            }
            Side::B if self.speed_balance <= -1.0 => {
                self.speed_balance += 1.0;
                true
            }
            _ => false,
        };

        if bonus {
            self.dont_add_speed = true;
            return TurnTransition::Bonus;
        }

        self.current = self.current.opponent();
        let round_advanced = self.round_offbeat;
        if round_advanced {
            self.round += 1;
        }
        self.round_offbeat = !self.round_offbeat;
        TurnTransition::Swapped { round_advanced }
    }
}
