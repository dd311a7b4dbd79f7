//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ActionEvent, OutcomeEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Turn starts and window settles
    Turn,
    /// Resolved actions
    Action,
    /// Battle end and reward payout
    Outcome,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    Turn(TurnEvent),
    Action(ActionEvent),
    Outcome(OutcomeEvent),
}

impl BattleEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BattleEvent::Turn(_) => Topic::Turn,
            BattleEvent::Action(_) => Topic::Action,
            BattleEvent::Outcome(_) => Topic::Outcome,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Cloning shares the underlying channels.
#[derive(Clone)]
pub struct EventBus {
    turn: broadcast::Sender<BattleEvent>,
    action: broadcast::Sender<BattleEvent>,
    outcome: broadcast::Sender<BattleEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turn: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
            outcome: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<BattleEvent> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Outcome => &self.outcome,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: BattleEvent) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BattleEvent> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic, in request order.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> Vec<(Topic, broadcast::Receiver<BattleEvent>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("turn_subscribers", &self.turn.receiver_count())
            .field("action_subscribers", &self.action.receiver_count())
            .field("outcome_subscribers", &self.outcome.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TurnEvent;
    use battle_core::{CloseReason, Side};

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turns = bus.subscribe(Topic::Turn);
        let mut outcomes = bus.subscribe(Topic::Outcome);

        let event = BattleEvent::Turn(TurnEvent::WindowSettled {
            side: Side::A,
            reason: CloseReason::Expired,
        });
        bus.publish(event.clone());

        assert_eq!(turns.try_recv().unwrap(), event);
        assert!(outcomes.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(BattleEvent::Turn(TurnEvent::WindowSettled {
            side: Side::B,
            reason: CloseReason::AllActed,
        }));
    }
}
