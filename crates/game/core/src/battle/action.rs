use crate::ability::AbilityId;

use super::{AttackResult, CombatantId};

/// What a combatant does with its turn slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Attack,
    /// Cast the ability equipped in the given slot.
    UseAbility(usize),
    Wait,
}

/// Effects of a resolved action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    pub actor: CombatantId,
    pub action: Action,
    pub target: Option<CombatantId>,
    pub attack: Option<AttackResult>,
    pub ability: Option<AbilityId>,
    /// The action ended the battle.
    pub finished: bool,
}

/// Battle state exposed to bot strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleActionData {
    pub me: CombatantId,
    pub round_multiplier: i64,
    /// Living candidate targets with the number of times each was already
    /// targeted this turn, in group order.
    pub target_counts: Vec<(CombatantId, u32)>,
    /// Ability the strategy wants cast regardless of slot availability.
    pub forced_ability: Option<AbilityId>,
}

impl BattleActionData {
    /// Candidate with the lowest focus count; the first seen wins ties.
    pub fn least_focused(&self) -> Option<CombatantId> {
        self.target_counts
            .iter()
            .fold(None, |best: Option<(CombatantId, u32)>, &(id, count)| match best {
                Some((_, best_count)) if best_count <= count => best,
                _ => Some((id, count)),
            })
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::Side;

    #[test]
    fn least_focused_prefers_first_on_ties() {
        let a = CombatantId::new(Side::A, 0);
        let b = CombatantId::new(Side::A, 1);
        let c = CombatantId::new(Side::A, 2);
        let mut data = BattleActionData {
            me: CombatantId::new(Side::B, 0),
            round_multiplier: 1,
            target_counts: vec![(a, 1), (b, 0), (c, 0)],
            forced_ability: None,
        };
        assert_eq!(data.least_focused(), Some(b));

        data.target_counts = vec![(a, 2), (b, 2)];
        assert_eq!(data.least_focused(), Some(a));

        data.target_counts.clear();
        assert_eq!(data.least_focused(), None);
    }
}
