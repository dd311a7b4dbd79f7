//! Attack resolution.
//!
//! RNG draw order per attack:
//!
//! ```text
//! 1. evasion  (target EVA)  -> evaded: stop, nothing else is drawn
//! 2. crit     (attacker CRIT)
//! 3. vamp     (attacker VAMP)
//! 4. counter  (target CONT) -> only if the target survived and this is not
//!                              already a counter; the counter attack then
//!                              draws its own evasion/crit/vamp
//! ```

use bitflags::bitflags;

use crate::rng::RandomSource;
use crate::stats::Stat;

use super::{CombatantId, Roster};

/// Base damage of an attack: `round((atk * 4 + 8) / (def * 1.5 + 6))`, at least 1.
pub fn calculate_damage(attack: f64, defense: f64) -> i64 {
    let attack = attack.max(0.0);
    let defense = defense.max(0.0);
    let damage = (attack * 4.0 + 8.0) / (defense * 1.5 + 6.0);
    (damage.round() as i64).max(1)
}

bitflags! {
    /// Outcome markers of a single attack.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HitFlags: u8 {
        const EVADED = 1 << 0;
        const CRIT = 1 << 1;
        const VAMP = 1 << 2;
        const COUNTER = 1 << 3;
        const KILLED = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackResult {
    pub attacker: CombatantId,
    pub target: CombatantId,
    /// Damage of the hit after crit and round multiplier; `None` when evaded.
    pub damage: Option<i64>,
    /// HP the target actually lost, at most its remaining HP.
    pub hp_lost: i64,
    /// HP restored to the attacker by vamp.
    pub healed: i64,
    pub flags: HitFlags,
    /// The target's counter-attack, if one triggered.
    pub counter: Option<Box<AttackResult>>,
}

impl AttackResult {
    fn evaded(attacker: CombatantId, target: CombatantId, flags: HitFlags) -> Self {
        Self {
            attacker,
            target,
            damage: None,
            hp_lost: 0,
            healed: 0,
            flags: flags | HitFlags::EVADED,
            counter: None,
        }
    }

    pub fn is_evaded(&self) -> bool {
        self.flags.contains(HitFlags::EVADED)
    }

    pub fn is_crit(&self) -> bool {
        self.flags.contains(HitFlags::CRIT)
    }

    pub fn is_counter(&self) -> bool {
        self.flags.contains(HitFlags::COUNTER)
    }

    pub fn killed(&self) -> bool {
        self.flags.contains(HitFlags::KILLED)
    }
}

/// Resolves a basic attack of `attacker` against `target`.
///
/// Returns `None` if either id is missing or both are the same combatant.
pub fn resolve_attack(
    roster: &mut Roster,
    attacker: CombatantId,
    target: CombatantId,
    multiplier: i64,
    rng: &mut dyn RandomSource,
) -> Option<AttackResult> {
    strike(roster, attacker, target, multiplier, rng, false)
}

fn strike(
    roster: &mut Roster,
    attacker_id: CombatantId,
    target_id: CombatantId,
    multiplier: i64,
    rng: &mut dyn RandomSource,
    is_counter: bool,
) -> Option<AttackResult> {
    let (attacker, target) = roster.pair_mut(attacker_id, target_id)?;
    let base_flags = if is_counter {
        HitFlags::COUNTER
    } else {
        HitFlags::empty()
    };

    if rng.chance(target.get_stat(Stat::Eva)) {
        return Some(AttackResult::evaded(attacker_id, target_id, base_flags));
    }

    let mut flags = base_flags;
    let mut damage = calculate_damage(attacker.get_stat(Stat::Str), target.get_stat(Stat::Def));

    if rng.chance(attacker.get_stat(Stat::Crit)) {
        damage *= 2;
        flags |= HitFlags::CRIT;
    }

    damage *= multiplier.max(1);

    let mut healed = 0;
    if rng.chance(attacker.get_stat(Stat::Vamp)) {
        healed = attacker.heal(damage.min(attacker.missing_hp()));
        flags |= HitFlags::VAMP;
    }

    let hp_lost = target.take_damage(damage);
    let target_survived = target.is_alive();
    if !target_survived {
        flags |= HitFlags::KILLED;
    }

    let counters = target_survived && !is_counter && rng.chance(target.get_stat(Stat::Cont));
    let counter = if counters {
        strike(roster, target_id, attacker_id, multiplier, rng, true).map(Box::new)
    } else {
        None
    };

    Some(AttackResult {
        attacker: attacker_id,
        target: target_id,
        damage: Some(damage),
        hp_lost,
        healed,
        flags,
        counter,
    })
}
