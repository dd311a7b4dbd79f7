//! Asynchronous abstractions over the chat platform.
//!
//! A session never talks to the platform directly. Hosts plug in
//! [`BattleMessenger`] for output, [`Wallet`] for user money, and
//! [`Localizer`] for turning logical battle messages into text.
use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use battle_content::MessageCatalog;
use battle_core::UserId;

use super::errors::{Result, RuntimeError};

/// Output side of a battle: the rendered log and per-user action controls.
#[async_trait]
pub trait BattleMessenger: Send + Sync {
    /// Publishes a chunk of translated battle log.
    async fn render_log(&self, text: &str) -> Result<()>;

    /// Shows the action controls for `user` while their window is open.
    async fn add_action_handle(&self, user: UserId) -> Result<()>;

    /// Hides the action controls for `user`.
    async fn remove_action_handle(&self, user: UserId) -> Result<()>;
}

/// Money held by users.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn get_money(&self, user: UserId) -> Result<i64>;

    async fn add_money(&self, user: UserId, amount: i64) -> Result<()>;
}

/// Renders a message key with named parameters.
pub trait Localizer: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

impl Localizer for MessageCatalog {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        MessageCatalog::translate(self, key, params)
    }
}

/// A messenger that drops everything. Useful for headless battles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMessenger;

#[async_trait]
impl BattleMessenger for NullMessenger {
    async fn render_log(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn add_action_handle(&self, _user: UserId) -> Result<()> {
        Ok(())
    }

    async fn remove_action_handle(&self, _user: UserId) -> Result<()> {
        Ok(())
    }
}

/// In-process wallet keyed by user.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    balances: Mutex<BTreeMap<UserId, i64>>,
}

impl MemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, user: UserId, amount: i64) -> Self {
        if let Ok(mut balances) = self.balances.lock() {
            balances.insert(user, amount);
        }
        self
    }

    /// Current balance, zero for unknown users.
    pub fn balance(&self, user: UserId) -> i64 {
        self.balances
            .lock()
            .map(|balances| balances.get(&user).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl Wallet for MemoryWallet {
    async fn get_money(&self, user: UserId) -> Result<i64> {
        Ok(self.balance(user))
    }

    async fn add_money(&self, user: UserId, amount: i64) -> Result<()> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|_| RuntimeError::wallet("balance lock poisoned"))?;
        *balances.entry(user).or_insert(0) += amount;
        Ok(())
    }
}
