//! User session: the owned state object behind every operation.
//!
//! All state lives in one [`SessionState`] behind a single mutex. Each
//! operation is a full read-modify-write under that lock and publishes its
//! [`Event`] before releasing it, so snapshots reach the channel in the
//! order they were taken. The notification sink is called after the lock
//! is released. Neither side effect can fail the operation.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::activity::{ActivityReport, DomainUsage, UsageLog};
use crate::checkin::accountability_nudge;
use crate::error::{Result, StorageError};
use crate::events::{Event, EventBus};
use crate::habit::{Habit, HabitTracker};
use crate::mood::{classify, Mood};
use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::reputation::ReputationState;
use crate::storage::{load_typed, KvStore, HABITS_KEY, STATS_KEY, TASKS_KEY, USAGE_KEY};
use crate::task::{NewTask, Task, TaskLedger};

/// Everything a session owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub reputation: ReputationState,
    pub tasks: TaskLedger,
    pub habits: HabitTracker,
    pub usage: UsageLog,
}

impl SessionState {
    /// Starting state for a brand-new user.
    pub fn seed() -> Self {
        Self {
            reputation: ReputationState::seed(),
            tasks: TaskLedger::seed(),
            habits: HabitTracker::seed(),
            usage: UsageLog::new(),
        }
    }

    /// Mood for the stored reputation.
    pub fn mood(&self) -> Mood {
        classify(&self.reputation)
    }

    /// Write every part of the state to `store`.
    pub fn persist_to(&self, store: &dyn KvStore) -> Result<(), StorageError> {
        let encode = |key: &str, value: serde_json::Result<serde_json::Value>| {
            value.map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
        };
        store.save(STATS_KEY, &encode(STATS_KEY, serde_json::to_value(self.reputation))?)?;
        store.save(TASKS_KEY, &encode(TASKS_KEY, serde_json::to_value(&self.tasks))?)?;
        store.save(HABITS_KEY, &encode(HABITS_KEY, serde_json::to_value(&self.habits))?)?;
        store.save(USAGE_KEY, &encode(USAGE_KEY, serde_json::to_value(&self.usage))?)?;
        Ok(())
    }

    /// True when any part of the state is missing from `store`.
    pub fn is_incomplete_in(store: &dyn KvStore) -> Result<bool, StorageError> {
        for key in [STATS_KEY, TASKS_KEY, HABITS_KEY, USAGE_KEY] {
            if store.load(key)?.is_none() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Result of feeding one activity report into the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub usage: DomainUsage,
    /// Set when the report counted as a violation
    pub reputation: Option<ReputationState>,
}

/// Shared handle over one user's state. Safe to use from many threads.
pub struct Session {
    state: Mutex<SessionState>,
    events: EventBus,
    sink: Arc<dyn NotificationSink>,
}

impl Session {
    /// Wrap `state` without touching any store.
    pub fn new(state: SessionState, events: EventBus, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            state: Mutex::new(state),
            events,
            sink,
        }
    }

    /// Rebuild a session from persisted snapshots.
    ///
    /// Missing keys fall back to the seed state. Corrupt or unreadable
    /// values are logged and fall back too, so a damaged store never
    /// prevents a session from starting.
    pub fn restore(store: &dyn KvStore, events: EventBus, sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(load_state(store), events, sink)
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Current reputation.
    pub fn reputation(&self) -> ReputationState {
        self.lock().reputation
    }

    /// Mood for the current reputation. Recomputed on every call.
    pub fn mood(&self) -> Mood {
        self.lock().mood()
    }

    /// Validate and add a pending task.
    pub fn add_task(&self, new_task: NewTask) -> Result<Task> {
        let task = {
            let mut state = self.lock();
            let task = state.tasks.add_task(new_task)?.clone();
            self.events.publish(Event::TaskAdded {
                task_id: task.id.clone(),
                tasks: state.tasks.clone(),
                at: Utc::now(),
            });
            task
        };
        tracing::debug!(id = %task.id, title = %task.title, "task added");
        Ok(task)
    }

    /// Complete a pending task and apply the completion reward.
    pub fn complete_task(&self, id: &str) -> Result<(Task, ReputationState)> {
        let (task, reputation) = {
            let mut state = self.lock();
            let task = state.tasks.complete_task(id)?.clone();
            state.reputation = state.reputation.apply_task_completion();
            self.events.publish(Event::TaskCompleted {
                task_id: task.id.clone(),
                tasks: state.tasks.clone(),
                reputation: state.reputation,
                at: Utc::now(),
            });
            (task, state.reputation)
        };
        tracing::debug!(
            id = %task.id,
            xp = reputation.xp,
            discipline = reputation.discipline_score,
            rage = reputation.rage_meter,
            "task completed"
        );
        Ok((task, reputation))
    }

    /// Apply an externally reported violation and warn the user.
    pub fn record_violation(&self) -> ReputationState {
        let reputation = {
            let mut state = self.lock();
            state.reputation = state.reputation.apply_violation();
            self.events.publish(Event::ViolationRecorded {
                reputation: state.reputation,
                at: Utc::now(),
            });
            state.reputation
        };
        tracing::debug!(
            rage = reputation.rage_meter,
            shame = reputation.shame_points,
            discipline = reputation.discipline_score,
            "violation recorded"
        );
        self.send(&Notification::violation_warning());
        reputation
    }

    /// Count a minute of observed activity. A `wasted` report is also a
    /// violation.
    pub fn observe_activity(&self, report: ActivityReport) -> Observation {
        let usage = {
            let mut state = self.lock();
            let usage = state.usage.record(&report).clone();
            self.events.publish(Event::ActivityObserved {
                report: report.clone(),
                usage: state.usage.clone(),
                at: Utc::now(),
            });
            usage
        };

        let reputation = report
            .status
            .is_violation()
            .then(|| self.record_violation());
        Observation { usage, reputation }
    }

    /// Flip a habit. Does not touch reputation.
    pub fn toggle_habit(&self, section_id: &str, habit_id: &str) -> Result<Habit> {
        let habit = {
            let mut state = self.lock();
            let habit = state.habits.toggle_habit(section_id, habit_id)?.clone();
            self.events.publish(Event::HabitToggled {
                section_id: section_id.to_string(),
                habit_id: habit_id.to_string(),
                habits: state.habits.clone(),
                at: Utc::now(),
            });
            habit
        };
        tracing::debug!(
            section = section_id,
            habit = habit_id,
            completed = habit.completed,
            streak = habit.streak,
            "habit toggled"
        );
        Ok(habit)
    }

    /// Stage a new level. Zero is lifted to 1.
    pub fn set_level(&self, level: u32) -> ReputationState {
        self.update_reputation(|r| r.with_level(level))
    }

    /// Overwrite the streak counter.
    pub fn set_streak(&self, streak: u32) -> ReputationState {
        self.update_reputation(|r| r.with_streak(streak))
    }

    /// Return every metric to its zero value.
    pub fn reset_reputation(&self) -> ReputationState {
        self.update_reputation(ReputationState::reset)
    }

    /// Send an accountability nudge if there is pending work.
    pub fn check_in<R: Rng>(&self, rng: &mut R) -> Option<Notification> {
        let pending = self.lock().tasks.pending_count();
        let nudge = accountability_nudge(pending, rng)?;
        self.send(&nudge);
        Some(nudge)
    }

    fn update_reputation(&self, f: impl FnOnce(ReputationState) -> ReputationState) -> ReputationState {
        let mut state = self.lock();
        state.reputation = f(state.reputation);
        self.events.publish(Event::ReputationChanged {
            reputation: state.reputation,
            at: Utc::now(),
        });
        state.reputation
    }

    fn send(&self, notification: &Notification) {
        match self.sink.notify(notification) {
            Ok(()) => {}
            Err(NotifyError::PermissionDenied) => {
                tracing::debug!("notifications disabled, skipped");
            }
            Err(err) => tracing::warn!("notification not delivered: {err}"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every mutation is a single assignment of a fully built value, so
        // the state is consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_state(store: &dyn KvStore) -> SessionState {
    let seed = SessionState::seed();
    SessionState {
        reputation: load_or(store, STATS_KEY, seed.reputation).normalized(),
        tasks: load_or(store, TASKS_KEY, seed.tasks),
        habits: load_or(store, HABITS_KEY, seed.habits),
        usage: load_or(store, USAGE_KEY, seed.usage),
    }
}

fn load_or<T: serde::de::DeserializeOwned>(store: &dyn KvStore, key: &str, fallback: T) -> T {
    match load_typed(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => fallback,
        Err(err) => {
            tracing::warn!(key, "ignoring stored snapshot: {err}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, LedgerError, ValidationError};
    use crate::notify::{GatedSink, NullSink, RecordingSink};
    use crate::storage::MemoryStore;

    fn session_with(state: SessionState) -> (Session, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = Session::new(state, EventBus::detached(), sink.clone());
        (session, sink)
    }

    #[test]
    fn completing_a_task_rewards_reputation() {
        let (session, _) = session_with(SessionState::seed());
        let id = session.add_task(NewTask::new("Ship it")).unwrap().id;
        let (task, rep) = session.complete_task(&id).unwrap();
        assert_eq!(task.status, crate::task::TaskStatus::Completed);
        assert_eq!(rep.xp, 500);
        assert_eq!(rep.discipline_score, 84);
        assert_eq!(rep.rage_meter, 30);
    }

    #[test]
    fn unknown_task_leaves_reputation_untouched() {
        let (session, _) = session_with(SessionState::seed());
        let before = session.reputation();
        let err = session.complete_task("nope").unwrap_err();
        assert!(matches!(err, CoreError::Ledger(LedgerError::TaskNotFound(_))));
        assert_eq!(session.reputation(), before);
    }

    #[test]
    fn recompleting_grants_nothing() {
        let (session, _) = session_with(SessionState::seed());
        let id = session.add_task(NewTask::new("once")).unwrap().id;
        session.complete_task(&id).unwrap();
        let after_first = session.reputation();
        assert!(session.complete_task(&id).is_err());
        assert_eq!(session.reputation(), after_first);
    }

    #[test]
    fn empty_title_is_a_validation_error() {
        let (session, _) = session_with(SessionState::default());
        let err = session.add_task(NewTask::new("")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyField(_))
        ));
        assert!(session.snapshot().tasks.is_empty());
    }

    #[test]
    fn violation_notifies_user() {
        let (session, sink) = session_with(SessionState::seed());
        session.record_violation();
        assert_eq!(sink.sent(), vec![Notification::violation_warning()]);
    }

    #[test]
    fn failing_sink_does_not_block_violation() {
        let sink = Arc::new(GatedSink::new(RecordingSink::new(), false));
        let session = Session::new(SessionState::seed(), EventBus::detached(), sink);
        let rep = session.record_violation();
        assert_eq!(rep.rage_meter, 50);
        assert_eq!(session.reputation(), rep);
    }

    #[test]
    fn wasted_activity_is_a_violation() {
        use crate::activity::ActivityStatus;
        let (session, sink) = session_with(SessionState::seed());
        let obs = session.observe_activity(ActivityReport::new(
            Some("youtube.com".into()),
            ActivityStatus::Wasted,
        ));
        assert_eq!(obs.usage.minutes, 1);
        assert_eq!(obs.reputation.unwrap().shame_points, 130);
        assert_eq!(sink.sent().len(), 1);

        let obs = session.observe_activity(ActivityReport::new(
            Some("github.com".into()),
            ActivityStatus::Productive,
        ));
        assert!(obs.reputation.is_none());
        assert_eq!(session.reputation().shame_points, 130);
    }

    #[test]
    fn habit_toggle_does_not_touch_reputation() {
        let (session, _) = session_with(SessionState::seed());
        let before = session.reputation();
        let habit = session.toggle_habit("body", "h1").unwrap();
        assert!(habit.completed);
        assert_eq!(habit.streak, 13);
        assert_eq!(session.reputation(), before);
    }

    #[test]
    fn check_in_only_with_pending_tasks() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg64::seed_from_u64(1);
        let (session, sink) = session_with(SessionState::default());
        assert!(session.check_in(&mut rng).is_none());
        session.add_task(NewTask::new("pending")).unwrap();
        assert!(session.check_in(&mut rng).is_some());
        assert_eq!(sink.sent().len(), 1);
    }

    #[test]
    fn mood_follows_reputation() {
        let (session, _) = session_with(SessionState::seed());
        assert_eq!(session.mood(), Mood::Calm);
        session.record_violation();
        assert_eq!(session.mood(), Mood::Annoyed);
    }

    #[test]
    fn persisted_state_restores_identically() {
        let store = MemoryStore::new();
        assert!(SessionState::is_incomplete_in(&store).unwrap());
        let state = SessionState::seed();
        state.persist_to(&store).unwrap();
        assert!(!SessionState::is_incomplete_in(&store).unwrap());
        let session = Session::restore(&store, EventBus::detached(), Arc::new(RecordingSink::new()));
        assert_eq!(session.snapshot(), state);
    }

    #[test]
    fn restore_falls_back_on_corrupt_snapshot() {
        let store = MemoryStore::new();
        store
            .save(STATS_KEY, &serde_json::json!({"xp": -1}))
            .unwrap();
        let session = Session::restore(&store, EventBus::detached(), Arc::new(RecordingSink::new()));
        assert_eq!(session.reputation(), ReputationState::seed());
        assert_eq!(session.snapshot().habits, HabitTracker::seed());
    }

    #[test]
    fn restore_keeps_counters_when_a_meter_is_out_of_range() {
        let store = MemoryStore::new();
        store
            .save(
                STATS_KEY,
                &serde_json::json!({
                    "xp": 1200,
                    "level": 9,
                    "streak": 2,
                    "rageMeter": 300,
                    "shamePoints": 75,
                    "disciplineScore": -5
                }),
            )
            .unwrap();
        let session = Session::restore(&store, EventBus::detached(), Arc::new(NullSink));
        let rep = session.reputation();
        assert_eq!(rep.xp, 1200);
        assert_eq!(rep.shame_points, 75);
        assert_eq!(rep.rage_meter, 100);
        assert_eq!(rep.discipline_score, 0);
        assert_eq!(session.mood(), Mood::Rage);
    }
}
