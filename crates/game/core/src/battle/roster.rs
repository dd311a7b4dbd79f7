use std::ops::{Index, IndexMut};

use super::{BattleEntity, BattleGroup, CombatantId, Side};

/// Both groups of a battle, addressable by [`CombatantId`].
#[derive(Debug)]
pub struct Roster {
    groups: [BattleGroup; 2],
}

impl Roster {
    pub fn new(a: BattleGroup, b: BattleGroup) -> Self {
        Self { groups: [a, b] }
    }

    pub fn group(&self, side: Side) -> &BattleGroup {
        &self.groups[side.index()]
    }

    pub fn group_mut(&mut self, side: Side) -> &mut BattleGroup {
        &mut self.groups[side.index()]
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut BattleGroup> {
        self.groups.iter_mut()
    }

    pub fn get(&self, id: CombatantId) -> Option<&BattleEntity> {
        self.group(id.side).get(id.index)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut BattleEntity> {
        self.group_mut(id.side).get_mut(id.index)
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.get(id).is_some()
    }

    /// Two distinct combatants borrowed mutably at once.
    pub fn pair_mut(
        &mut self,
        first: CombatantId,
        second: CombatantId,
    ) -> Option<(&mut BattleEntity, &mut BattleEntity)> {
        if first == second {
            return None;
        }

        if first.side == second.side {
            let members = self.group_mut(first.side).members_mut();
            let (low, high) = (first.index.min(second.index), first.index.max(second.index));
            if high >= members.len() {
                return None;
            }
            let (head, tail) = members.split_at_mut(high);
            let (lo, hi) = (&mut head[low], &mut tail[0]);
            return Some(if first.index < second.index {
                (lo, hi)
            } else {
                (hi, lo)
            });
        }

        let [a, b] = &mut self.groups;
        let (first_group, second_group) = match first.side {
            Side::A => (a, b),
            Side::B => (b, a),
        };
        Some((
            first_group.get_mut(first.index)?,
            second_group.get_mut(second.index)?,
        ))
    }

    /// Living combatants on `side`, in group order.
    pub fn living(&self, side: Side) -> Vec<CombatantId> {
        self.group(side)
            .members()
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_alive())
            .map(|(index, _)| CombatantId::new(side, index))
            .collect()
    }

    /// Combatant controlled by `user`, if any.
    pub fn find_user(&self, user: crate::entity::UserId) -> Option<CombatantId> {
        [Side::A, Side::B].into_iter().find_map(|side| {
            self.group(side)
                .members()
                .iter()
                .position(|member| member.is_controlled_by(user))
                .map(|index| CombatantId::new(side, index))
        })
    }

    /// Side with no living members, if any. When both are wiped, `acting`
    /// is the survivor of the tie and its opponent is reported.
    pub fn wiped_side(&self, acting: Side) -> Option<Side> {
        let opponent = acting.opponent();
        if self.group(opponent).alive_count() == 0 {
            Some(opponent)
        } else if self.group(acting).alive_count() == 0 {
            Some(acting)
        } else {
            None
        }
    }

    pub fn into_groups(self) -> [BattleGroup; 2] {
        self.groups
    }
}

impl Index<CombatantId> for Roster {
    type Output = BattleEntity;

    fn index(&self, id: CombatantId) -> &BattleEntity {
        &self.group(id.side).members()[id.index]
    }
}

impl IndexMut<CombatantId> for Roster {
    fn index_mut(&mut self, id: CombatantId) -> &mut BattleEntity {
        &mut self.group_mut(id.side).members_mut()[id.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, UserId};
    use crate::stats::Stat;

    fn member(name: &str) -> BattleEntity {
        let mut entity = Entity::enemy(name, name, 0).with_stat(Stat::Hp, 10);
        entity.reset();
        BattleEntity::new(entity)
    }

    fn roster() -> Roster {
        let mut a = BattleGroup::new(Side::A);
        a.add_member(member("a0"));
        a.add_member(member("a1"));
        let mut user = Entity::user(UserId(3), "Rin");
        user.reset();
        a.add_member(BattleEntity::new(user));
        let mut b = BattleGroup::new(Side::B);
        b.add_member(member("b0"));
        Roster::new(a, b)
    }

    #[test]
    fn pair_mut_preserves_argument_order() {
        let mut roster = roster();
        let a0 = CombatantId::new(Side::A, 0);
        let a1 = CombatantId::new(Side::A, 1);
        let b0 = CombatantId::new(Side::B, 0);

        let (x, y) = roster.pair_mut(a1, a0).unwrap();
        assert_eq!((x.name(), y.name()), ("a1", "a0"));

        let (x, y) = roster.pair_mut(b0, a1).unwrap();
        assert_eq!((x.name(), y.name()), ("b0", "a1"));

        assert!(roster.pair_mut(a0, a0).is_none());
        assert!(roster.pair_mut(a0, CombatantId::new(Side::A, 9)).is_none());
    }

    #[test]
    fn living_skips_dead_members() {
        let mut roster = roster();
        roster[CombatantId::new(Side::A, 1)].take_damage(10);

        assert_eq!(
            roster.living(Side::A),
            vec![CombatantId::new(Side::A, 0), CombatantId::new(Side::A, 2)]
        );
        assert_eq!(roster.find_user(UserId(3)), Some(CombatantId::new(Side::A, 2)));
        assert_eq!(roster.find_user(UserId(4)), None);
    }

    #[test]
    fn opponent_wipe_is_reported_before_own_wipe() {
        let mut roster = roster();
        assert_eq!(roster.wiped_side(Side::A), None);

        roster[CombatantId::new(Side::B, 0)].take_damage(10);
        for index in 0..3 {
            roster[CombatantId::new(Side::A, index)].take_damage(100);
        }
        assert_eq!(roster.wiped_side(Side::A), Some(Side::B));
        assert_eq!(roster.wiped_side(Side::B), Some(Side::A));
    }
}
