//! # Muriell Core Library
//!
//! This library provides the core logic for Muriell, a gamified focus
//! accountability assistant. The CLI (and any GUI) is a thin layer over the
//! same [`Session`].
//!
//! ## Architecture
//!
//! - **Reputation**: xp, level, streak, rage meter, shame points and
//!   discipline score, with clamped update rules
//! - **Tasks**: a ledger of commitments with a one-way `pending -> completed`
//!   state machine
//! - **Habits**: daily toggles with per-habit streaks, grouped into sections
//! - **Mood**: a pure classification of the current reputation
//! - **Session**: owns the state, publishes an [`Event`] per change and sends
//!   best-effort notifications
//! - **Storage**: SQLite key-value snapshots written behind the session, and
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`Session`]: owned state and the operations on it
//! - [`ReputationState`]: reward and penalty rules
//! - [`PersistenceWorker`]: drains session events into a [`KvStore`]
//! - [`Config`]: application configuration management

pub mod activity;
pub mod checkin;
pub mod error;
pub mod events;
pub mod habit;
pub mod mood;
pub mod notify;
pub mod reputation;
pub mod session;
pub mod storage;
pub mod task;

pub use activity::{ActivityReport, ActivityStatus, DomainUsage, UsageLog, UsageTotals};
pub use checkin::{accountability_nudge, run_checkins, CheckinPolicy};
pub use error::{ConfigError, CoreError, LedgerError, StorageError, ValidationError};
pub use events::{Event, EventBus, EventReceiver};
pub use habit::{Habit, HabitSection, HabitTracker};
pub use mood::{classify, Mood};
pub use notify::{GatedSink, Notification, NotificationSink, NotifyError, NullSink, RecordingSink, TracingSink};
pub use reputation::ReputationState;
pub use session::{Observation, Session, SessionState};
pub use storage::{Config, KvStore, MemoryStore, PersistenceWorker, SqliteStore};
pub use task::{NewTask, Task, TaskLedger, TaskStatus, TaskType};
