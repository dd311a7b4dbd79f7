//! Battle state machine.
//!
//! ```text
//! Ready ──start──▶ turn start ──▶ AwaitingUsers ──window closes──▶ BotsActing
//!                     ▲                                                 │
//!                     └──────────────── advance (swap / bonus) ◀────────┘
//!              any wipe at any point ──▶ Finished
//! ```
//!
//! Turn start, for every living member of the acting side: AP regen, turn
//! modifier step, ability instance tick. Users then act through
//! [`Battle::try_submit`] while the window is open; bots act in group order
//! once it closes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::ability::{AbilityContext, AbilityId, AbilityInstance, AbilityRegistry, AbilityTarget};
use crate::ai::{BotAi, DefaultAi};
use crate::config::BattleConfig;
use crate::entity::{Entity, UserId};
use crate::error::{ActionRejection, BattleError};
use crate::rng::RandomSource;

use super::{
    Action, ActionReport, ActionWindow, AttackResult, BattleActionData, BattleGroup,
    BattleMessage, CombatantId, Roster, Side, TurnScheduler, TurnTransition, WindowDecision,
    WindowEvent, resolve_attack,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    /// Built, not started.
    Ready,
    /// Users of the acting side may submit actions.
    AwaitingUsers,
    /// The window is closed; bots of the acting side act next.
    BotsActing,
    Finished,
}

/// What the caller must do at the start of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnStart {
    /// Open a window of `delay` ticks for `eligible` users.
    AwaitingUsers {
        side: Side,
        eligible: Vec<UserId>,
        delay: u64,
    },
    /// Nobody to wait for; resolve bots right away.
    BotsOnly { side: Side },
    Finished(BattleOutcome),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleOutcome {
    pub winner: Side,
    /// True when the winning side has users.
    pub victory: bool,
    /// Money owed to each rewarded user.
    pub reward_each: i64,
    pub rewarded: Vec<UserId>,
    pub rounds: u32,
}

pub struct Battle {
    roster: Roster,
    scheduler: TurnScheduler,
    phase: BattlePhase,
    config: BattleConfig,
    registry: Arc<AbilityRegistry>,
    rng: Box<dyn RandomSource + Send>,
    window: Option<ActionWindow>,
    focus: BTreeMap<CombatantId, u32>,
    stunned: BTreeSet<CombatantId>,
    log: Vec<BattleMessage>,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    /// Builds a battle between two groups. Both must have at least one member.
    pub fn new(
        a: BattleGroup,
        b: BattleGroup,
        registry: Arc<AbilityRegistry>,
        config: BattleConfig,
        rng: impl RandomSource + Send + 'static,
    ) -> Result<Self, BattleError> {
        for group in [&a, &b] {
            if group.is_empty() {
                return Err(BattleError::EmptyGroup { side: group.side() });
            }
        }

        Ok(Self {
            roster: Roster::new(a, b),
            scheduler: TurnScheduler::new(Side::A),
            phase: BattlePhase::Ready,
            config,
            registry,
            rng: Box::new(rng),
            window: None,
            focus: BTreeMap::new(),
            stunned: BTreeSet::new(),
            log: Vec::new(),
            outcome: None,
        })
    }

    /// Loads both groups, decides who opens and starts the first turn.
    pub fn start(&mut self) -> Result<TurnStart, BattleError> {
        if self.phase != BattlePhase::Ready {
            return Err(BattleError::AlreadyStarted);
        }

        for group in self.roster.groups_mut() {
            group.load(&self.config);
        }

        let first = TurnScheduler::initial_side(
            self.roster.group(Side::A).get_speed(),
            self.roster.group(Side::B).get_speed(),
            self.rng.as_mut(),
        );
        self.scheduler = TurnScheduler::new(first);
        self.log.push(BattleMessage::BattleStarted { first });

        Ok(self.begin_turn())
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    /// True while user submissions are accepted.
    pub fn is_collecting(&self) -> bool {
        self.phase == BattlePhase::AwaitingUsers
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn current_side(&self) -> Side {
        self.scheduler.current()
    }

    pub fn round(&self) -> u32 {
        self.scheduler.round()
    }

    pub fn round_multiplier(&self) -> i64 {
        self.config.round_multiplier(self.scheduler.round())
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn window(&self) -> Option<&ActionWindow> {
        self.window.as_ref()
    }

    /// Takes the log entries recorded since the last drain.
    pub fn drain_log(&mut self) -> Vec<BattleMessage> {
        std::mem::take(&mut self.log)
    }

    /// Remembers `target` as the user's preferred enemy.
    pub fn select_target(&mut self, user: UserId, target: CombatantId) -> Result<(), ActionRejection> {
        if self.is_finished() {
            return Err(ActionRejection::BattleFinished);
        }
        let actor = self
            .roster
            .find_user(user)
            .ok_or(ActionRejection::NotEligible)?;
        if !self.is_valid_enemy(actor, target) {
            return Err(ActionRejection::InvalidTarget);
        }
        self.roster[actor].set_last_target(Some(target));
        Ok(())
    }

    /// Submits a user action for the current window.
    ///
    /// A rejection leaves every piece of state untouched and the window open,
    /// so the user may try again before it closes.
    pub fn try_submit(&mut self, user: UserId, action: Action) -> Result<ActionReport, ActionRejection> {
        let actor = self.check_user(user)?;

        match self.perform(actor, action, None) {
            Ok(report) => {
                if let Some(window) = self.window.as_mut() {
                    let decision = window.handle(WindowEvent::ActionAccepted(user));
                    if decision != WindowDecision::KeepOpen && !self.is_finished() {
                        self.phase = BattlePhase::BotsActing;
                    }
                }
                Ok(report)
            }
            Err(rejection) => {
                if let Some(window) = self.window.as_mut() {
                    window.handle(WindowEvent::ActionRejected(user));
                }
                Err(rejection)
            }
        }
    }

    /// [`Battle::try_submit`] with the reason dropped: `None` means the
    /// attempt had no effect.
    pub fn submit_action(&mut self, user: UserId, action: Action) -> Option<ActionReport> {
        self.try_submit(user, action).ok()
    }

    /// Closes the user window because its countdown ran out.
    pub fn expire_window(&mut self) -> WindowDecision {
        let Some(window) = self.window.as_mut() else {
            return WindowDecision::KeepOpen;
        };
        let decision = window.handle(WindowEvent::TimerExpired);
        if self.phase == BattlePhase::AwaitingUsers {
            self.phase = BattlePhase::BotsActing;
        }
        decision
    }

    /// Lets every living, unstunned bot of the acting side act, in group
    /// order, stopping as soon as the battle ends.
    pub fn resolve_bots(&mut self) -> Vec<ActionReport> {
        if self.phase == BattlePhase::AwaitingUsers {
            self.expire_window();
        }
        if self.phase != BattlePhase::BotsActing {
            return Vec::new();
        }

        let side = self.scheduler.current();
        let mut reports = Vec::new();
        for index in 0..self.roster.group(side).members().len() {
            let id = CombatantId::new(side, index);
            let member = &self.roster[id];
            if member.is_dead() || member.is_user() || self.stunned.contains(&id) {
                continue;
            }

            if let Some(report) = self.bot_act(id) {
                let finished = report.finished;
                reports.push(report);
                if finished {
                    break;
                }
            }
        }
        reports
    }

    /// Resolves remaining bots, then hands the turn to whoever acts next.
    pub fn finish_turn(&mut self) -> (Vec<ActionReport>, TurnStart) {
        let reports = self.resolve_bots();
        (reports, self.advance_turn())
    }

    /// Drives the battle without user input until it ends or `max_turns`
    /// turns have passed. User windows are treated as expired.
    pub fn run_until_finished(&mut self, max_turns: u64) -> Result<Option<BattleOutcome>, BattleError> {
        if self.phase == BattlePhase::Ready {
            self.start()?;
        }
        while !self.is_finished() && self.scheduler.turns() < max_turns {
            self.finish_turn();
        }
        Ok(self.outcome.clone())
    }

    /// Returns both groups' entities, with battle-only modifiers removed and
    /// HP and AP clamped to the maxima that remain.
    pub fn into_entities(self) -> [Vec<Entity>; 2] {
        self.roster.into_groups().map(|group| {
            let mut entities = group.into_entities();
            for entity in &mut entities {
                entity.clear_turn_modifiers();
                entity.clamp_persistent_values();
            }
            entities
        })
    }

    fn advance_turn(&mut self) -> TurnStart {
        if let Some(outcome) = &self.outcome {
            return TurnStart::Finished(outcome.clone());
        }

        let multiplier = self.round_multiplier();
        let transition = self.scheduler.advance(
            self.roster.group(Side::A).get_speed(),
            self.roster.group(Side::B).get_speed(),
            self.config.speed_balance_factor,
        );
        if let TurnTransition::Swapped { round_advanced: true } = transition {
            let next = self.round_multiplier();
            if next > multiplier {
                self.log
                    .push(BattleMessage::MultiplierIncreased { multiplier: next });
            }
        }
        self.begin_turn()
    }

    fn begin_turn(&mut self) -> TurnStart {
        let side = self.scheduler.current();
        self.window = None;
        self.focus.clear();
        self.stunned.clear();

        if self.scheduler.is_bonus_turn() {
            self.log.push(BattleMessage::BonusTurn { side });
        } else {
            self.log.push(BattleMessage::TurnStarted {
                side,
                round: self.scheduler.round(),
            });
        }

        for index in 0..self.roster.group(side).members().len() {
            let id = CombatantId::new(side, index);
            if self.roster[id].is_dead() {
                continue;
            }
            let member = &mut self.roster[id];
            member.regen_ap(self.config.ap_regen);
            member.step_turn_modifiers();
            let was_stunned = member.is_stunned();

            self.tick_instances(id);

            let member = &self.roster[id];
            if was_stunned && member.is_alive() {
                self.stunned.insert(id);
                self.log.push(BattleMessage::Stunned {
                    name: member.name().to_owned(),
                });
            }
        }

        if let Some(outcome) = self.check_finished() {
            return TurnStart::Finished(outcome);
        }

        let mut eligible = Vec::new();
        for id in self.roster.living(side) {
            if self.roster[id].last_target().is_some_and(|t| !self.is_valid_enemy(id, t)) {
                self.roster[id].set_last_target(None);
            }
            if let Some(user) = self.roster[id].user() {
                if !self.stunned.contains(&id) {
                    eligible.push(user);
                }
            }
        }

        if eligible.is_empty() {
            self.phase = BattlePhase::BotsActing;
            return TurnStart::BotsOnly { side };
        }

        let delay = self.config.window_delay(eligible.len());
        self.window = Some(ActionWindow::open(eligible.iter().copied(), delay));
        self.phase = BattlePhase::AwaitingUsers;
        TurnStart::AwaitingUsers {
            side,
            eligible,
            delay,
        }
    }

    /// Fires `on_turn` for every instance on `id`, expiring finished ones.
    fn tick_instances(&mut self, id: CombatantId) {
        let multiplier = self.round_multiplier();
        let registry = Arc::clone(&self.registry);
        let mut kept = Vec::new();

        let instances = self.roster[id].take_instances();
        for mut instance in instances {
            if self.roster[id].is_dead() {
                break;
            }
            let Some(effect) = registry.get(&instance.ability) else {
                continue;
            };

            let ability = instance.ability.clone();
            let mut ctx = AbilityContext::new(
                &mut self.roster,
                &mut self.log,
                &ability,
                instance.caster,
                id,
                multiplier,
            );
            effect.on_turn(&mut ctx);
            instance.remaining -= 1;
            if instance.remaining > 0 {
                kept.push(instance);
                continue;
            }

            effect.on_end(&mut ctx);
            let target = ctx.target().name().to_owned();
            ctx.log(BattleMessage::AbilityEnded {
                target,
                ability: ability.clone(),
            });
        }

        let member = &mut self.roster[id];
        if member.is_dead() {
            member.clear_instances();
        } else {
            member.restore_instances(kept);
        }
    }

    fn check_user(&self, user: UserId) -> Result<CombatantId, ActionRejection> {
        match self.phase {
            BattlePhase::Finished => return Err(ActionRejection::BattleFinished),
            BattlePhase::AwaitingUsers => {}
            BattlePhase::Ready | BattlePhase::BotsActing => {
                return Err(ActionRejection::NotAcceptingActions);
            }
        }

        let actor = self
            .roster
            .find_user(user)
            .ok_or(ActionRejection::NotEligible)?;
        if actor.side != self.scheduler.current() {
            return Err(ActionRejection::NotYourTurn);
        }
        if self.roster[actor].is_dead() {
            return Err(ActionRejection::ActorDead);
        }
        if self.stunned.contains(&actor) {
            return Err(ActionRejection::Stunned);
        }

        let window = self
            .window
            .as_ref()
            .ok_or(ActionRejection::NotAcceptingActions)?;
        if !window.is_eligible(user) {
            return Err(ActionRejection::NotEligible);
        }
        if window.has_acted(user) {
            return Err(ActionRejection::AlreadyActed);
        }
        Ok(actor)
    }

    fn bot_act(&mut self, id: CombatantId) -> Option<ActionReport> {
        let mut ai: Box<dyn BotAi> = self.roster[id]
            .take_ai()
            .unwrap_or_else(|| Box::new(DefaultAi));

        let target_counts = self
            .roster
            .living(id.side.opponent())
            .into_iter()
            .map(|target| (target, self.focus.get(&target).copied().unwrap_or(0)))
            .collect();
        let mut data = BattleActionData {
            me: id,
            round_multiplier: self.round_multiplier(),
            target_counts,
            forced_ability: None,
        };

        let choice = ai.decide(&self.roster[id], &mut data);
        self.roster[id].restore_ai(ai);

        if let Some(ability) = data.forced_ability {
            let slot = self.roster[id]
                .entity()
                .abilities()
                .iter()
                .position(|equipped| *equipped == ability)
                .unwrap_or(self.roster[id].entity().abilities().len());
            let action = Action::UseAbility(slot);
            if let Ok(report) = self.cast(id, action, ability, choice.target) {
                return Some(report);
            }
        }

        self.perform(id, choice.action, choice.target)
            .or_else(|_| self.perform(id, Action::Attack, None))
            .or_else(|_| self.perform(id, Action::Wait, None))
            .ok()
    }

    fn perform(
        &mut self,
        actor: CombatantId,
        action: Action,
        chosen: Option<CombatantId>,
    ) -> Result<ActionReport, ActionRejection> {
        match action {
            Action::Wait => {
                self.log.push(BattleMessage::Waited {
                    name: self.roster[actor].name().to_owned(),
                });
                Ok(self.report(actor, action, None, None, None))
            }
            Action::Attack => {
                let target = self
                    .enemy_target(actor, chosen)
                    .ok_or(ActionRejection::InvalidTarget)?;
                let multiplier = self.round_multiplier();
                let result =
                    resolve_attack(&mut self.roster, actor, target, multiplier, self.rng.as_mut())
                        .ok_or(ActionRejection::InvalidTarget)?;

                self.log_attack(&result);
                *self.focus.entry(target).or_insert(0) += 1;
                Ok(self.report(actor, action, Some(target), Some(result), None))
            }
            Action::UseAbility(slot) => {
                let ability = self.roster[actor]
                    .entity()
                    .ability(slot)
                    .cloned()
                    .ok_or(ActionRejection::InvalidAbilitySlot { slot })?;
                self.cast(actor, action, ability, chosen)
            }
        }
    }

    fn cast(
        &mut self,
        actor: CombatantId,
        action: Action,
        ability: AbilityId,
        chosen: Option<CombatantId>,
    ) -> Result<ActionReport, ActionRejection> {
        let registry = Arc::clone(&self.registry);
        let effect = registry
            .get(&ability)
            .ok_or_else(|| ActionRejection::UnknownAbility(ability.clone()))?;

        let available = self.roster[actor].ap();
        if available < effect.cost() {
            return Err(ActionRejection::InsufficientAp {
                required: effect.cost(),
                available,
            });
        }

        let target = match effect.target() {
            AbilityTarget::Ally => actor,
            AbilityTarget::Enemy => self
                .enemy_target(actor, chosen)
                .ok_or(ActionRejection::InvalidTarget)?,
        };

        self.roster[actor].spend_ap(effect.cost());
        self.log.push(BattleMessage::AbilityUsed {
            caster: self.roster[actor].name().to_owned(),
            target: self.roster[target].name().to_owned(),
            ability: ability.clone(),
        });

        let multiplier = self.round_multiplier();
        let attaches = {
            let mut ctx = AbilityContext::new(
                &mut self.roster,
                &mut self.log,
                &ability,
                actor,
                target,
                multiplier,
            );
            effect.on_use(&mut ctx);
            let attaches = effect.duration() > 0 && ctx.target().is_alive();
            if attaches {
                effect.on_start(&mut ctx);
            }
            attaches
        };

        if attaches {
            self.roster[target].attach(AbilityInstance {
                ability: ability.clone(),
                caster: actor,
                remaining: effect.duration(),
                stuns: effect.stuns(),
            });
        }
        if target.side != actor.side {
            *self.focus.entry(target).or_insert(0) += 1;
        }

        Ok(self.report(actor, action, Some(target), None, Some(ability)))
    }

    fn report(
        &mut self,
        actor: CombatantId,
        action: Action,
        target: Option<CombatantId>,
        attack: Option<AttackResult>,
        ability: Option<AbilityId>,
    ) -> ActionReport {
        let finished = self.check_finished().is_some();
        ActionReport {
            actor,
            action,
            target,
            attack,
            ability,
            finished,
        }
    }

    /// Sticky target if still valid, then the requested one, then the first
    /// living enemy. The choice is remembered.
    fn enemy_target(&mut self, actor: CombatantId, chosen: Option<CombatantId>) -> Option<CombatantId> {
        let remembered = self.roster[actor].last_target();
        let target = chosen
            .filter(|&t| self.is_valid_enemy(actor, t))
            .or(remembered.filter(|&t| self.is_valid_enemy(actor, t)))
            .or_else(|| self.roster.living(actor.side.opponent()).first().copied())?;

        if self.roster[actor].is_user() {
            self.roster[actor].set_last_target(Some(target));
        }
        Some(target)
    }

    fn is_valid_enemy(&self, actor: CombatantId, target: CombatantId) -> bool {
        target.side != actor.side && self.roster.get(target).is_some_and(|t| t.is_alive())
    }

    fn log_attack(&mut self, result: &AttackResult) {
        let attacker = self.roster[result.attacker].name().to_owned();
        let target = self.roster[result.target].name().to_owned();

        match (result.damage, result.is_counter()) {
            (None, false) => self.log.push(BattleMessage::Evaded { attacker, target }),
            (None, true) => self.log.push(BattleMessage::CounterEvaded { attacker, target }),
            (Some(damage), counter) => {
                let crit = result.is_crit();
                self.log.push(if counter {
                    BattleMessage::Countered { attacker: attacker.clone(), target: target.clone(), damage, crit }
                } else {
                    BattleMessage::Attacked { attacker: attacker.clone(), target: target.clone(), damage, crit }
                });
                if result.healed > 0 {
                    self.log.push(BattleMessage::Vamped {
                        attacker,
                        amount: result.healed,
                    });
                }
                if result.killed() {
                    self.log.push(BattleMessage::Died { name: target });
                }
            }
        }

        if let Some(counter) = &result.counter {
            self.log_attack(counter);
        }
    }

    /// Detects a wipe and settles the outcome exactly once.
    fn check_finished(&mut self) -> Option<BattleOutcome> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }

        let loser = self.roster.wiped_side(self.scheduler.current())?;
        let winner = loser.opponent();
        let winners = self.roster.group(winner);
        let rewarded = winners.users();
        let victory = !rewarded.is_empty();
        let reward_each = if victory {
            self.roster.group(loser).defeated_bot_money() / rewarded.len() as i64
        } else {
            0
        };

        let outcome = BattleOutcome {
            winner,
            victory,
            reward_each,
            rewarded: if victory { rewarded } else { Vec::new() },
            rounds: self.scheduler.round(),
        };

        if let Some(window) = self.window.as_mut() {
            window.handle(WindowEvent::BattleFinished);
        }
        self.phase = BattlePhase::Finished;
        self.log.push(if victory {
            BattleMessage::Victory { reward_each }
        } else {
            BattleMessage::Defeat
        });
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }
}
