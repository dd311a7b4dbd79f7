//! Built-in abilities.

use crate::battle::calculate_damage;
use crate::stats::{ModifierOp, Stat};

use super::{AbilityContext, AbilityEffect, AbilityTarget};

/// Heavy blow: 1.5x STR against DEF.
#[derive(Clone, Copy, Debug, Default)]
pub struct Strike;

impl AbilityEffect for Strike {
    fn id(&self) -> &'static str {
        "strike"
    }

    fn cost(&self) -> i64 {
        2
    }

    fn on_use(&self, ctx: &mut AbilityContext<'_>) {
        let damage = calculate_damage(
            ctx.caster().get_stat(Stat::Str) * 1.5,
            ctx.target().get_stat(Stat::Def),
        );
        ctx.damage_target(damage * ctx.round_multiplier());
    }
}

/// Damage over time, scaled by the caster's STR.
#[derive(Clone, Copy, Debug, Default)]
pub struct Poison;

impl AbilityEffect for Poison {
    fn id(&self) -> &'static str {
        "poison"
    }

    fn cost(&self) -> i64 {
        3
    }

    fn duration(&self) -> i32 {
        3
    }

    fn on_turn(&self, ctx: &mut AbilityContext<'_>) {
        let damage = 1 + ctx.caster().raw_stat(Stat::Str) / 4;
        ctx.damage_target(damage * ctx.round_multiplier());
    }
}

/// Restores 30% of the target's max HP.
#[derive(Clone, Copy, Debug, Default)]
pub struct Heal;

impl AbilityEffect for Heal {
    fn id(&self) -> &'static str {
        "heal"
    }

    fn cost(&self) -> i64 {
        3
    }

    fn target(&self) -> AbilityTarget {
        AbilityTarget::Ally
    }

    fn on_use(&self, ctx: &mut AbilityContext<'_>) {
        let amount = (ctx.target().max_hp() as f64 * 0.3).round() as i64;
        ctx.heal_target(amount);
    }
}

/// Target loses its next turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stun;

impl AbilityEffect for Stun {
    fn id(&self) -> &'static str {
        "stun"
    }

    fn cost(&self) -> i64 {
        4
    }

    fn duration(&self) -> i32 {
        1
    }

    fn stuns(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Shield;

impl Shield {
    const TURNS: i32 = 3;
}

impl AbilityEffect for Shield {
    fn id(&self) -> &'static str {
        "shield"
    }

    fn cost(&self) -> i64 {
        2
    }

    fn duration(&self) -> i32 {
        Self::TURNS
    }

    fn target(&self) -> AbilityTarget {
        AbilityTarget::Ally
    }

    fn on_start(&self, ctx: &mut AbilityContext<'_>) {
        ctx.add_target_modifier(Stat::Def, 1.5, ModifierOp::Mult, Self::TURNS);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Haste;

impl Haste {
    const TURNS: i32 = 2;
}

impl AbilityEffect for Haste {
    fn id(&self) -> &'static str {
        "haste"
    }

    fn cost(&self) -> i64 {
        2
    }

    fn duration(&self) -> i32 {
        Self::TURNS
    }

    fn target(&self) -> AbilityTarget {
        AbilityTarget::Ally
    }

    fn on_start(&self, ctx: &mut AbilityContext<'_>) {
        ctx.add_target_modifier(Stat::Spd, 10.0, ModifierOp::Add, Self::TURNS);
    }
}

/// Plain hit that heals the caster by the damage dealt.
#[derive(Clone, Copy, Debug, Default)]
pub struct Drain;

impl AbilityEffect for Drain {
    fn id(&self) -> &'static str {
        "drain"
    }

    fn cost(&self) -> i64 {
        3
    }

    fn on_use(&self, ctx: &mut AbilityContext<'_>) {
        let damage = calculate_damage(
            ctx.caster().get_stat(Stat::Str),
            ctx.target().get_stat(Stat::Def),
        );
        let dealt = ctx.damage_target(damage * ctx.round_multiplier());
        if dealt > 0 {
            ctx.heal_caster(dealt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityId;
    use crate::battle::{BattleEntity, BattleGroup, BattleMessage, CombatantId, Roster, Side};
    use crate::entity::Entity;

    const CASTER: CombatantId = CombatantId::new(Side::A, 0);
    const TARGET: CombatantId = CombatantId::new(Side::B, 0);

    fn roster() -> Roster {
        let mut caster = Entity::enemy("mage", "Mage", 0)
            .with_stat(Stat::Hp, 40)
            .with_stat(Stat::Str, 10);
        caster.reset();
        let mut target = Entity::enemy("golem", "Golem", 0)
            .with_stat(Stat::Hp, 60)
            .with_stat(Stat::Def, 4);
        target.reset();

        let mut a = BattleGroup::new(Side::A);
        a.add_member(BattleEntity::new(caster));
        let mut b = BattleGroup::new(Side::B);
        b.add_member(BattleEntity::new(target));
        Roster::new(a, b)
    }

    fn run(
        roster: &mut Roster,
        effect: &dyn AbilityEffect,
        target: CombatantId,
        multiplier: i64,
        hook: fn(&dyn AbilityEffect, &mut AbilityContext<'_>),
    ) -> Vec<BattleMessage> {
        let mut log = Vec::new();
        let id = AbilityId::new(effect.id());
        let mut ctx = AbilityContext::new(roster, &mut log, &id, CASTER, target, multiplier);
        hook(effect, &mut ctx);
        log
    }

    #[test]
    fn strike_scales_strength_and_round() {
        let mut roster = roster();
        run(&mut roster, &Strike, TARGET, 2, |e, ctx| e.on_use(ctx));

        // round((15*4+8)/(4*1.5+6)) = round(5.67) = 6, x2
        assert_eq!(roster[TARGET].hp(), 48);
    }

    #[test]
    fn poison_ticks_from_caster_strength() {
        let mut roster = roster();
        let log = run(&mut roster, &Poison, TARGET, 1, |e, ctx| e.on_turn(ctx));

        assert_eq!(roster[TARGET].hp(), 57);
        assert_eq!(
            log,
            vec![BattleMessage::AbilityDamage {
                target: "Golem".into(),
                ability: AbilityId::from("poison"),
                damage: 3,
            }]
        );
    }

    #[test]
    fn heal_restores_thirty_percent_clamped() {
        let mut roster = roster();
        roster[CASTER].take_damage(5);
        run(&mut roster, &Heal, CASTER, 1, |e, ctx| e.on_use(ctx));
        assert_eq!(roster[CASTER].hp(), 40);

        roster[CASTER].take_damage(30);
        run(&mut roster, &Heal, CASTER, 1, |e, ctx| e.on_use(ctx));
        assert_eq!(roster[CASTER].hp(), 22);
    }

    #[test]
    fn shield_multiplies_defense_for_its_turns() {
        let mut roster = roster();
        run(&mut roster, &Shield, TARGET, 1, |e, ctx| e.on_start(ctx));
        assert_eq!(roster[TARGET].raw_stat(Stat::Def), 6);

        for _ in 0..3 {
            roster[TARGET].step_turn_modifiers();
        }
        assert_eq!(roster[TARGET].raw_stat(Stat::Def), 4);
    }

    #[test]
    fn drain_heals_caster_by_damage_dealt() {
        let mut roster = roster();
        roster[CASTER].take_damage(10);
        run(&mut roster, &Drain, TARGET, 1, |e, ctx| e.on_use(ctx));

        // round((10*4+8)/(4*1.5+6)) = 4
        assert_eq!(roster[TARGET].hp(), 56);
        assert_eq!(roster[CASTER].hp(), 34);
    }

    #[test]
    fn dead_targets_take_no_further_damage() {
        let mut roster = roster();
        roster[TARGET].take_damage(60);
        let log = run(&mut roster, &Drain, TARGET, 1, |e, ctx| e.on_use(ctx));

        assert!(log.is_empty());
        assert_eq!(roster[CASTER].hp(), 40);
    }
}
