/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Number of full rounds after which the round damage multiplier grows by one.
    pub increase_every: u32,
    /// Action window length (in caller-defined ticks) when one user may act.
    pub single_player_delay: u64,
    /// Action window length (in caller-defined ticks) when several users may act.
    pub multi_player_delay: u64,
    /// Minimum HP on battle entry, as a percentage of max HP.
    pub entry_hp_floor_percent: i64,
    /// Weight of the group speed difference added to the speed balance per turn.
    pub speed_balance_factor: f64,
    /// AP regenerated by every living member of the acting team at turn start.
    pub ap_regen: i64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of equipped ability slots per entity.
    pub const MAX_ABILITY_SLOTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const INCREASE_EVERY: u32 = 8;
    pub const SINGLE_PLAYER_DELAY: u64 = 300;
    pub const MULTI_PLAYER_DELAY: u64 = 20;
    pub const ENTRY_HP_FLOOR_PERCENT: i64 = 10;
    pub const SPEED_BALANCE_FACTOR: f64 = 0.5;
    pub const AP_REGEN: i64 = 1;

    pub fn new() -> Self {
        Self {
            increase_every: Self::INCREASE_EVERY,
            single_player_delay: Self::SINGLE_PLAYER_DELAY,
            multi_player_delay: Self::MULTI_PLAYER_DELAY,
            entry_hp_floor_percent: Self::ENTRY_HP_FLOOR_PERCENT,
            speed_balance_factor: Self::SPEED_BALANCE_FACTOR,
            ap_regen: Self::AP_REGEN,
        }
    }

    /// Window length for a turn with `eligible_users` users able to act.
    pub fn window_delay(&self, eligible_users: usize) -> u64 {
        if eligible_users <= 1 {
            self.single_player_delay
        } else {
            self.multi_player_delay
        }
    }

    /// Damage multiplier for the given round: `round / increase_every + 1`.
    pub fn round_multiplier(&self, round: u32) -> i64 {
        let every = self.increase_every.max(1);
        i64::from(round / every) + 1
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
