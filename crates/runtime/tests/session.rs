use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use battle_content::MessageCatalog;
use battle_core::{
    AbilityRegistry, Action, ActionRejection, Battle, BattleConfig, BattleGroup, CloseReason,
    Entity, SequenceRng, Side, Stat, UserId,
};
use battle_runtime::{
    BattleEvent, BattleMessenger, BattleSession, MemoryWallet, OutcomeEvent, Result,
    RuntimeError, SessionConfig, Topic, TurnEvent, Wallet,
};
use tokio::time::Instant;

const HERO: UserId = UserId(7);
const SIDEKICK: UserId = UserId(8);
const NEVER: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Log(String),
    AddHandle(UserId),
    RemoveHandle(UserId),
}

#[derive(Default)]
struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
}

impl RecordingMessenger {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn log_text(&self) -> String {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Log(text) => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl BattleMessenger for RecordingMessenger {
    async fn render_log(&self, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Log(text.to_owned()));
        Ok(())
    }

    async fn add_action_handle(&self, user: UserId) -> Result<()> {
        self.calls.lock().unwrap().push(Call::AddHandle(user));
        Ok(())
    }

    async fn remove_action_handle(&self, user: UserId) -> Result<()> {
        self.calls.lock().unwrap().push(Call::RemoveHandle(user));
        Ok(())
    }
}

struct BrokenWallet;

#[async_trait]
impl Wallet for BrokenWallet {
    async fn get_money(&self, _user: UserId) -> Result<i64> {
        Err(RuntimeError::wallet("offline"))
    }

    async fn add_money(&self, _user: UserId, _amount: i64) -> Result<()> {
        Err(RuntimeError::wallet("offline"))
    }
}

fn hero() -> Entity {
    user(HERO, "Hero")
}

fn user(id: UserId, name: &str) -> Entity {
    Entity::user(id, name)
        .with_stat(Stat::Hp, 50)
        .with_stat(Stat::Str, 10)
        .with_stat(Stat::Def, 5)
        .with_stat(Stat::Spd, 5)
}

fn battle(user: Entity, bot: Entity) -> Battle {
    party_battle(vec![user], bot)
}

fn party_battle(users: Vec<Entity>, bot: Entity) -> Battle {
    let mut a = BattleGroup::new(Side::A);
    for user in users {
        a.add_entity(user);
    }
    let mut b = BattleGroup::new(Side::B);
    b.add_entity(bot);
    Battle::new(
        a,
        b,
        Arc::new(AbilityRegistry::standard()),
        BattleConfig::default(),
        SequenceRng::constant(NEVER),
    )
    .unwrap()
}

fn dummy() -> Entity {
    Entity::enemy("dummy", "Dummy", 100)
        .with_stat(Stat::Hp, 1)
        .with_stat(Stat::Spd, 1)
}

#[tokio::test(start_paused = true)]
async fn user_kill_pays_reward_once() {
    let messenger = Arc::new(RecordingMessenger::default());
    let wallet = Arc::new(MemoryWallet::new().with_balance(HERO, 25));
    let (session, handle) = BattleSession::builder(battle(hero(), dummy()))
        .messenger(messenger.clone())
        .wallet(wallet.clone())
        .build()
        .unwrap();
    let mut outcomes = handle.subscribe(Topic::Outcome);

    let task = tokio::spawn(session.run());
    let report = handle.submit_action(HERO, Action::Attack).await.unwrap();
    assert!(report.finished);

    let finished = task.await.unwrap().unwrap();
    assert_eq!(finished.outcome.winner, Side::A);
    assert!(finished.outcome.victory);
    assert_eq!(wallet.get_money(HERO).await.unwrap(), 125);

    assert!(matches!(
        outcomes.recv().await.unwrap(),
        BattleEvent::Outcome(OutcomeEvent::Finished(_))
    ));
    assert_eq!(
        outcomes.recv().await.unwrap(),
        BattleEvent::Outcome(OutcomeEvent::RewardPaid {
            user: HERO,
            amount: 100
        })
    );
    assert!(outcomes.try_recv().is_err());

    let calls = messenger.calls();
    assert_eq!(calls.iter().filter(|c| **c == Call::AddHandle(HERO)).count(), 1);
    assert_eq!(calls.iter().filter(|c| **c == Call::RemoveHandle(HERO)).count(), 1);
    assert!(messenger.log_text().contains("battle.victory"));

    let [users, bots] = finished.entities;
    assert_eq!(users.len(), 1);
    assert_eq!(bots[0].get_persistent_value(Stat::Hp), 0);
}

#[tokio::test(start_paused = true)]
async fn expired_window_lets_bots_act() {
    let brute = Entity::enemy("brute", "Brute", 5)
        .with_stat(Stat::Hp, 100)
        .with_stat(Stat::Str, 50)
        .with_stat(Stat::Spd, 1);
    let wallet = Arc::new(MemoryWallet::new());
    let (session, handle) = BattleSession::builder(battle(hero(), brute))
        .messenger(Arc::new(RecordingMessenger::default()))
        .wallet(wallet.clone())
        .build()
        .unwrap();
    let mut turns = handle.subscribe(Topic::Turn);

    let started = Instant::now();
    let finished = session.run().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(finished.outcome.winner, Side::B);
    assert!(!finished.outcome.victory);
    assert_eq!(wallet.balance(HERO), 0);

    assert!(matches!(
        turns.recv().await.unwrap(),
        BattleEvent::Turn(TurnEvent::Started { side: Side::A, ref awaiting, .. }) if awaiting == &vec![HERO]
    ));
    assert_eq!(
        turns.recv().await.unwrap(),
        BattleEvent::Turn(TurnEvent::WindowSettled {
            side: Side::A,
            reason: CloseReason::Expired,
        })
    );
    drop(handle);
}

#[tokio::test(start_paused = true)]
async fn window_closes_early_once_every_user_acted() {
    let config = SessionConfig::default();
    let party = vec![hero(), user(SIDEKICK, "Sidekick")];
    let (session, handle) = BattleSession::builder(party_battle(party, dummy()))
        .config(config.clone())
        .messenger(Arc::new(RecordingMessenger::default()))
        .wallet(Arc::new(MemoryWallet::new()))
        .build()
        .unwrap();
    let mut turns = handle.subscribe(Topic::Turn);

    let started = Instant::now();
    let task = tokio::spawn(session.run());

    assert!(matches!(
        turns.recv().await.unwrap(),
        BattleEvent::Turn(TurnEvent::Started { side: Side::A, ref awaiting, .. })
            if awaiting == &vec![HERO, SIDEKICK]
    ));
    handle.submit_action(HERO, Action::Wait).await.unwrap();
    handle.submit_action(SIDEKICK, Action::Wait).await.unwrap();

    assert_eq!(
        turns.recv().await.unwrap(),
        BattleEvent::Turn(TurnEvent::WindowSettled {
            side: Side::A,
            reason: CloseReason::AllActed,
        })
    );
    let multi_player_window = config.tick * BattleConfig::default().multi_player_delay as u32;
    assert!(started.elapsed() < multi_player_window);

    let report = handle.submit_action(HERO, Action::Attack).await.unwrap();
    assert!(report.finished);
    assert!(task.await.unwrap().unwrap().outcome.victory);
}

#[tokio::test(start_paused = true)]
async fn rejected_action_keeps_window_open() {
    let (session, handle) = BattleSession::builder(battle(hero(), dummy()))
        .messenger(Arc::new(RecordingMessenger::default()))
        .wallet(Arc::new(MemoryWallet::new()))
        .build()
        .unwrap();
    let mut turns = handle.subscribe(Topic::Turn);
    let task = tokio::spawn(session.run());

    let err = handle
        .submit_action(HERO, Action::UseAbility(5))
        .await
        .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&ActionRejection::InvalidAbilitySlot { slot: 5 })
    );

    let report = handle.submit_action(HERO, Action::Attack).await.unwrap();
    assert!(report.finished);
    task.await.unwrap().unwrap();

    turns.recv().await.unwrap();
    assert_eq!(
        turns.recv().await.unwrap(),
        BattleEvent::Turn(TurnEvent::WindowSettled {
            side: Side::A,
            reason: CloseReason::Finished,
        })
    );
    assert!(matches!(
        handle.submit_action(HERO, Action::Attack).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

#[tokio::test(start_paused = true)]
async fn log_is_translated_through_the_localizer() {
    let messenger = Arc::new(RecordingMessenger::default());
    let catalog = MessageCatalog::new().with("battle.victory", "Victory! Everyone gets {reward}.");
    let (session, handle) = BattleSession::builder(battle(hero(), dummy()))
        .messenger(messenger.clone())
        .wallet(Arc::new(MemoryWallet::new()))
        .localizer(Arc::new(catalog))
        .build()
        .unwrap();

    let task = tokio::spawn(session.run());
    handle.submit_action(HERO, Action::Attack).await.unwrap();
    task.await.unwrap().unwrap();

    assert!(messenger.log_text().contains("Victory! Everyone gets 100."));
}

#[tokio::test(start_paused = true)]
async fn wallet_failure_does_not_fail_the_battle() {
    let (session, handle) = BattleSession::builder(battle(hero(), dummy()))
        .messenger(Arc::new(RecordingMessenger::default()))
        .wallet(Arc::new(BrokenWallet))
        .build()
        .unwrap();
    let mut outcomes = handle.subscribe(Topic::Outcome);

    let task = tokio::spawn(session.run());
    handle.submit_action(HERO, Action::Attack).await.unwrap();
    let finished = task.await.unwrap().unwrap();

    assert!(finished.outcome.victory);
    outcomes.recv().await.unwrap();
    assert_eq!(
        outcomes.recv().await.unwrap(),
        BattleEvent::Outcome(OutcomeEvent::RewardFailed {
            user: HERO,
            amount: 100
        })
    );
}

#[test]
fn builder_requires_collaborators() {
    let result = BattleSession::builder(battle(hero(), dummy()))
        .wallet(Arc::new(MemoryWallet::new()))
        .config(SessionConfig::default())
        .build();
    assert!(matches!(
        result,
        Err(RuntimeError::CollaboratorNotSet { .. })
    ));
}
