//! Deterministic turn-based battle engine.
//!
//! `battle-core` defines the canonical combat rules (stats, entities,
//! abilities, bot strategies and the battle state machine) as pure APIs with
//! no I/O, clocks or logging. All randomness flows through
//! [`rng::RandomSource`], and all battle state mutation flows through
//! [`battle::Battle`]; the runtime crate drives it with real timers.
pub mod ability;
pub mod ai;
pub mod battle;
pub mod config;
pub mod entity;
pub mod error;
pub mod rng;
pub mod stats;

pub use ability::{
    AbilityContext, AbilityEffect, AbilityId, AbilityInstance, AbilityRegistry, AbilityTarget,
};
pub use ai::{AbilityAi, AbilityRule, AiSpec, BotAi, BotChoice, DefaultAi};
pub use battle::{
    Action, ActionReport, ActionWindow, AttackResult, Battle, BattleActionData, BattleEntity,
    BattleGroup, BattleMessage, BattleOutcome, BattlePhase, CloseReason, CombatantId, HitFlags,
    Roster, Side, TurnScheduler, TurnStart, TurnTransition, WindowDecision, WindowEvent,
    calculate_damage, resolve_attack,
};
pub use config::BattleConfig;
pub use entity::{AbilitySlots, Entity, EntityKind, UserId};
pub use error::{ActionRejection, BattleError};
pub use rng::{PcgRng, RandomSource, SequenceRng};
pub use stats::{ModifierOp, Stat, StatKind, StatModifier, StatTransform, apply_modifiers};
