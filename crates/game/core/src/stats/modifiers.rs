//! Timed and persistent stat modifiers.
//!
//! A modifier lives on one of three decay clocks:
//!
//! ```text
//! per_battle = true   -> decremented once per battle entry
//! per_battle = false  -> decremented once per acting turn
//! duration   = -1     -> whole adventure, never decremented by a battle
//! ```
//!
//! Persistent modifiers are not carried at all: they are applied to the live
//! value of a persistent stat (HP/AP) the moment they are added.

use super::Stat;
use crate::error::BattleError;

/// Arithmetic operation applied by a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierOp {
    Add,
    Mult,
}

impl ModifierOp {
    pub fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            ModifierOp::Add => current + value,
            ModifierOp::Mult => current * value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: Stat,
    pub value: f64,
    pub op: ModifierOp,
    pub duration: i32,
    pub persistent: bool,
    pub per_battle: bool,
}

impl StatModifier {
    /// Duration marker for modifiers that last the whole adventure.
    pub const ADVENTURE: i32 = -1;

    /// Modifier that decays once per acting turn.
    pub fn turns(stat: Stat, value: f64, op: ModifierOp, duration: i32) -> Self {
        Self {
            stat,
            value,
            op,
            duration,
            persistent: false,
            per_battle: false,
        }
    }

    /// Modifier that decays once per battle entry.
    pub fn battles(stat: Stat, value: f64, op: ModifierOp, duration: i32) -> Self {
        Self {
            per_battle: true,
            ..Self::turns(stat, value, op, duration)
        }
    }

    /// Modifier that is never decremented by a battle.
    pub fn adventure(stat: Stat, value: f64, op: ModifierOp) -> Self {
        Self::turns(stat, value, op, Self::ADVENTURE)
    }

    /// Immediate, irreversible change to the live value of a persistent stat.
    pub fn persistent(stat: Stat, value: f64) -> Result<Self, BattleError> {
        let modifier = Self {
            persistent: true,
            ..Self::turns(stat, value, ModifierOp::Add, 0)
        };
        modifier.validate()?;
        Ok(modifier)
    }

    /// Fails if a persistent modifier targets a stat without a live value.
    pub fn validate(&self) -> Result<(), BattleError> {
        if self.persistent && !self.stat.is_persistent() {
            return Err(BattleError::NonPersistentModifier { stat: self.stat });
        }
        Ok(())
    }

    pub fn is_adventure_long(&self) -> bool {
        self.duration == Self::ADVENTURE
    }

    pub fn apply(&self, current: f64) -> f64 {
        self.op.apply(current, self.value)
    }

    /// Decrements the remaining duration. Returns false once expired.
    pub(crate) fn tick(&mut self) -> bool {
        if self.is_adventure_long() {
            return true;
        }
        if self.duration > 0 {
            self.duration -= 1;
        }
        self.duration > 0
    }
}

/// Applies `modifiers` matching `stat` to `base` in list order, then floors
/// at zero and rounds to the nearest integer.
pub fn apply_modifiers<'a>(
    stat: Stat,
    base: i64,
    modifiers: impl IntoIterator<Item = &'a StatModifier>,
) -> i64 {
    let value = modifiers
        .into_iter()
        .filter(|m| m.stat == stat)
        .fold(base as f64, |acc, m| m.apply(acc));
    value.max(0.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_apply_in_insertion_order() {
        let add_then_mult = [
            StatModifier::turns(Stat::Str, 2.0, ModifierOp::Add, 1),
            StatModifier::turns(Stat::Str, 2.0, ModifierOp::Mult, 1),
        ];
        let mult_then_add = [
            StatModifier::turns(Stat::Str, 2.0, ModifierOp::Mult, 1),
            StatModifier::turns(Stat::Str, 2.0, ModifierOp::Add, 1),
        ];

        assert_eq!(apply_modifiers(Stat::Str, 5, &add_then_mult), 14);
        assert_eq!(apply_modifiers(Stat::Str, 5, &mult_then_add), 12);
    }

    #[test]
    fn other_stats_are_ignored() {
        let modifiers = [StatModifier::turns(Stat::Def, 10.0, ModifierOp::Add, 1)];
        assert_eq!(apply_modifiers(Stat::Str, 5, &modifiers), 5);
    }

    #[test]
    fn result_is_floored_and_rounded() {
        let negative = [StatModifier::turns(Stat::Def, -50.0, ModifierOp::Add, 1)];
        assert_eq!(apply_modifiers(Stat::Def, 5, &negative), 0);

        let fractional = [StatModifier::turns(Stat::Def, 1.5, ModifierOp::Mult, 1)];
        assert_eq!(apply_modifiers(Stat::Def, 5, &fractional), 8);
    }

    #[test]
    fn persistent_modifier_requires_persistent_stat() {
        assert!(StatModifier::persistent(Stat::Hp, -5.0).is_ok());
        assert_eq!(
            StatModifier::persistent(Stat::Str, 5.0),
            Err(BattleError::NonPersistentModifier { stat: Stat::Str })
        );
    }

    #[test]
    fn adventure_modifiers_never_expire() {
        let mut modifier = StatModifier::adventure(Stat::Spd, 1.0, ModifierOp::Add);
        for _ in 0..10 {
            assert!(modifier.tick());
        }
        assert_eq!(modifier.duration, StatModifier::ADVENTURE);
    }
}
