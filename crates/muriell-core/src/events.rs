use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::activity::{ActivityReport, UsageLog};
use crate::habit::HabitTracker;
use crate::reputation::ReputationState;
use crate::storage::{HABITS_KEY, STATS_KEY, TASKS_KEY, USAGE_KEY};
use crate::task::TaskLedger;

/// Every state change in a session produces an Event.
/// Each one carries the full snapshot of the part it changed, so a consumer
/// can persist it without reading back into the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        task_id: String,
        tasks: TaskLedger,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        tasks: TaskLedger,
        reputation: ReputationState,
        at: DateTime<Utc>,
    },
    ViolationRecorded {
        reputation: ReputationState,
        at: DateTime<Utc>,
    },
    ActivityObserved {
        report: ActivityReport,
        usage: UsageLog,
        at: DateTime<Utc>,
    },
    HabitToggled {
        section_id: String,
        habit_id: String,
        habits: HabitTracker,
        at: DateTime<Utc>,
    },
    /// Level, streak or reset changes made outside the reward paths.
    ReputationChanged {
        reputation: ReputationState,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TaskAdded { at, .. }
            | Event::TaskCompleted { at, .. }
            | Event::ViolationRecorded { at, .. }
            | Event::ActivityObserved { at, .. }
            | Event::HabitToggled { at, .. }
            | Event::ReputationChanged { at, .. } => *at,
        }
    }

    /// Storage keys and values this event should be written under.
    pub fn persisted_snapshots(&self) -> Result<Vec<(&'static str, serde_json::Value)>, serde_json::Error> {
        let mut out = Vec::with_capacity(2);
        match self {
            Event::TaskAdded { tasks, .. } => {
                out.push((TASKS_KEY, serde_json::to_value(tasks)?));
            }
            Event::TaskCompleted {
                tasks, reputation, ..
            } => {
                out.push((TASKS_KEY, serde_json::to_value(tasks)?));
                out.push((STATS_KEY, serde_json::to_value(reputation)?));
            }
            Event::ViolationRecorded { reputation, .. }
            | Event::ReputationChanged { reputation, .. } => {
                out.push((STATS_KEY, serde_json::to_value(reputation)?));
            }
            Event::ActivityObserved { usage, .. } => {
                out.push((USAGE_KEY, serde_json::to_value(usage)?));
            }
            Event::HabitToggled { habits, .. } => {
                out.push((HABITS_KEY, serde_json::to_value(habits)?));
            }
        }
        Ok(out)
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Publishing half of the session's state-change channel.
///
/// Publishing never blocks. Once the consumer is gone, events are dropped
/// with a debug log.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Option<mpsc::UnboundedSender<Event>>,
}

impl EventBus {
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A bus with no consumer.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, event: Event) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(err) = tx.send(event) {
            tracing::debug!("event dropped, no consumer: {:?}", err.0.at());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_completion_persists_tasks_and_stats() {
        let event = Event::TaskCompleted {
            task_id: "1".into(),
            tasks: TaskLedger::new(),
            reputation: ReputationState::seed(),
            at: Utc::now(),
        };
        let keys: Vec<_> = event
            .persisted_snapshots()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![TASKS_KEY, STATS_KEY]);
    }

    #[test]
    fn serialized_event_is_tagged() {
        let event = Event::ViolationRecorded {
            reputation: ReputationState::seed(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ViolationRecorded");
        assert_eq!(json["reputation"]["rageMeter"], 35);
    }

    #[test]
    fn publish_after_receiver_dropped_is_silent() {
        let (bus, rx) = EventBus::channel();
        drop(rx);
        bus.publish(Event::ReputationChanged {
            reputation: ReputationState::zero(),
            at: Utc::now(),
        });
    }

    #[test]
    fn published_events_arrive_in_order() {
        let (bus, mut rx) = EventBus::channel();
        for level in 1..=3 {
            bus.publish(Event::ReputationChanged {
                reputation: ReputationState::zero().with_level(level),
                at: Utc::now(),
            });
        }
        drop(bus);
        let mut levels = Vec::new();
        while let Ok(Event::ReputationChanged { reputation, .. }) = rx.try_recv() {
            levels.push(reputation.level);
        }
        assert_eq!(levels, vec![1, 2, 3]);
    }
}
