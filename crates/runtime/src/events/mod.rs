//! Topic-based event bus for battle session events.
//!
//! Events are published to specific topics, and observers subscribe only to
//! the topics they need.

mod bus;
mod types;

pub use bus::{BattleEvent, EventBus, Topic};
pub use types::{ActionEvent, OutcomeEvent, TurnEvent};
