use crate::battle::{BattleEntity, BattleMessage, CombatantId, Roster};
use crate::stats::{ModifierOp, Stat};

use super::AbilityId;

/// Battle view handed to ability hooks.
///
/// Every helper that changes HP or stats also records the matching log entry.
pub struct AbilityContext<'a> {
    roster: &'a mut Roster,
    log: &'a mut Vec<BattleMessage>,
    ability: &'a AbilityId,
    caster: CombatantId,
    target: CombatantId,
    round_multiplier: i64,
}

impl<'a> AbilityContext<'a> {
    pub(crate) fn new(
        roster: &'a mut Roster,
        log: &'a mut Vec<BattleMessage>,
        ability: &'a AbilityId,
        caster: CombatantId,
        target: CombatantId,
        round_multiplier: i64,
    ) -> Self {
        Self {
            roster,
            log,
            ability,
            caster,
            target,
            round_multiplier,
        }
    }

    pub fn caster(&self) -> &BattleEntity {
        &self.roster[self.caster]
    }

    pub fn target(&self) -> &BattleEntity {
        &self.roster[self.target]
    }

    pub fn caster_id(&self) -> CombatantId {
        self.caster
    }

    pub fn target_id(&self) -> CombatantId {
        self.target
    }

    pub fn round_multiplier(&self) -> i64 {
        self.round_multiplier
    }

    /// Deals damage to the target. Returns the damage actually taken.
    pub fn damage_target(&mut self, amount: i64) -> i64 {
        let target = &mut self.roster[self.target];
        if target.is_dead() {
            return 0;
        }
        let dealt = target.take_damage(amount);
        let name = target.name().to_owned();
        let died = target.is_dead();

        self.log.push(BattleMessage::AbilityDamage {
            target: name.clone(),
            ability: self.ability.clone(),
            damage: dealt,
        });
        if died {
            self.log.push(BattleMessage::Died { name });
        }
        dealt
    }

    pub fn heal_target(&mut self, amount: i64) -> i64 {
        self.heal(self.target, amount)
    }

    pub fn heal_caster(&mut self, amount: i64) -> i64 {
        self.heal(self.caster, amount)
    }

    fn heal(&mut self, id: CombatantId, amount: i64) -> i64 {
        let member = &mut self.roster[id];
        if member.is_dead() {
            return 0;
        }
        let healed = member.heal(amount);
        self.log.push(BattleMessage::AbilityHealed {
            target: member.name().to_owned(),
            ability: self.ability.clone(),
            amount: healed,
        });
        healed
    }

    /// Adds a modifier to the target that decays with its own turns.
    pub fn add_target_modifier(&mut self, stat: Stat, value: f64, op: ModifierOp, turns: i32) {
        let target = &mut self.roster[self.target];
        target.add_turn_modifier(stat, value, op, turns);
        self.log.push(BattleMessage::AbilityBuff {
            target: target.name().to_owned(),
            ability: self.ability.clone(),
            stat,
        });
    }

    pub fn log(&mut self, message: BattleMessage) {
        self.log.push(message);
    }
}
