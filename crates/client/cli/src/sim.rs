//! One simulated battle: a user party driven by an autopilot against
//! content enemies.
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use battle_content::{ContentFactory, GameContentRegistry};
use battle_core::{
    Action, ActionRejection, Battle, BattleGroup, CombatantId, Entity, PcgRng, RandomSource, Side,
    UserId,
};
use battle_runtime::{
    BattleEvent, BattleMessenger, BattleSession, MemoryWallet, RuntimeError, SessionConfig,
    SessionHandle, SessionOutcome, Topic, TurnEvent,
};

use crate::config::{EnemySource, SimConfig};
use crate::logging;
use crate::party;

/// Prints the battle log to stdout.
struct ConsoleMessenger;

#[async_trait]
impl BattleMessenger for ConsoleMessenger {
    async fn render_log(&self, text: &str) -> battle_runtime::Result<()> {
        println!("{text}");
        Ok(())
    }

    async fn add_action_handle(&self, user: UserId) -> battle_runtime::Result<()> {
        tracing::debug!(%user, "action controls shown");
        Ok(())
    }

    async fn remove_action_handle(&self, user: UserId) -> battle_runtime::Result<()> {
        tracing::debug!(%user, "action controls hidden");
        Ok(())
    }
}

pub async fn run(config: &SimConfig) -> Result<()> {
    let registry = ContentFactory::new(&config.content_dir)
        .build_registry()
        .with_context(|| format!("Failed to load content from {}", config.content_dir.display()))?;
    tracing::debug!(
        templates = ?registry.template_ids().collect::<Vec<_>>(),
        "content loaded"
    );

    let save_dir = config.save_dir.clone().unwrap_or_else(logging::data_dir);
    let members = party::load_or_recruit(&save_dir, &config.party)?;
    let users: Vec<UserId> = members.iter().filter_map(Entity::user_id).collect();

    let mut party_group = BattleGroup::new(Side::A);
    for member in members {
        tracing::info!(name = member.name(), power = member.power_level(), "party member ready");
        party_group.add_entity(member);
    }

    let mut spawn_rng = PcgRng::seeded(config.seed.rotate_left(17));
    let enemies = spawn_enemies(&registry, &config.enemies, &mut spawn_rng)?;
    let enemy_count = enemies.len();

    let battle = Battle::new(
        party_group,
        enemies,
        registry.abilities(),
        registry.config().clone(),
        PcgRng::seeded(config.seed),
    )?;

    let wallet = Arc::new(MemoryWallet::new());
    let (session, handle) = BattleSession::builder(battle)
        .config(SessionConfig {
            tick: config.tick,
            ..SessionConfig::default()
        })
        .messenger(Arc::new(ConsoleMessenger))
        .wallet(wallet.clone())
        .localizer(Arc::new(registry.messages().clone()))
        .build()?;

    let pilot = spawn_autopilot(handle, enemy_count, config.seed);
    let SessionOutcome { outcome, entities } = session.run().await?;
    pilot.abort();

    let [party_members, _] = entities;
    party::save(&save_dir, &party_members)?;

    tracing::info!(
        victory = outcome.victory,
        rounds = outcome.rounds,
        reward_each = outcome.reward_each,
        "simulation finished"
    );
    for user in users {
        println!("{user}: {} coins", wallet.balance(user));
    }
    Ok(())
}

fn spawn_enemies(
    registry: &GameContentRegistry,
    source: &EnemySource,
    rng: &mut dyn RandomSource,
) -> Result<BattleGroup> {
    match source {
        EnemySource::Templates(ids) => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            Ok(registry.spawn_group(Side::B, &ids)?)
        }
        EnemySource::Pool { name, count } => {
            let mut group = BattleGroup::new(Side::B);
            for _ in 0..*count {
                let spawned = registry.spawn_from_pool(name, rng)?;
                group.add_bot(spawned.entity, spawned.ai);
            }
            Ok(group)
        }
    }
}

/// Answers every user window with a random target and action.
fn spawn_autopilot(handle: SessionHandle, enemy_count: usize, seed: u64) -> JoinHandle<()> {
    let mut turns = handle.subscribe(Topic::Turn);
    let mut rng = PcgRng::seeded(seed.wrapping_add(1));

    tokio::spawn(async move {
        loop {
            let awaiting = match turns.recv().await {
                Ok(BattleEvent::Turn(TurnEvent::Started { awaiting, .. })) => awaiting,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "autopilot fell behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            for user in awaiting {
                let target = CombatantId::new(Side::B, rng.index(enemy_count));
                if let Err(err) = handle.select_target(user, target).await {
                    tracing::debug!(%user, error = %err, "target kept");
                }

                let action = pick_action(&mut rng);
                match handle.submit_action(user, action).await {
                    Ok(_) => {}
                    Err(RuntimeError::Rejected(rejection)) if rejection.is_retryable() => {
                        let _ = handle.submit_action(user, Action::Attack).await;
                    }
                    Err(RuntimeError::Rejected(ActionRejection::BattleFinished)) => return,
                    Err(err) => tracing::debug!(%user, error = %err, "submission dropped"),
                }
            }
        }
    })
}

fn pick_action(rng: &mut dyn RandomSource) -> Action {
    let roll = rng.next_f64();
    if roll < 0.3 {
        Action::UseAbility(0)
    } else if roll < 0.4 {
        Action::UseAbility(1)
    } else {
        Action::Attack
    }
}
