//! Task types and the task ledger.
//!
//! Status follows a single one-way transition:
//!
//!   PENDING ─────────> COMPLETED
//!
//! `Overdue` and `Missed` are part of the vocabulary (and deserialize from
//! stored data) but no ledger operation moves a task into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{LedgerError, ValidationError};

/// Outcome text written on every new task.
pub const DEFAULT_OUTCOME: &str = "Added to your list";

/// Task status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Initial state
    #[default]
    Pending,
    /// Terminal
    Completed,
    Overdue,
    Missed,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        matches!((self, to), (TaskStatus::Pending, TaskStatus::Completed))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Missed => "missed",
        };
        f.write_str(s)
    }
}

/// Kind of commitment a task represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Focus,
    Habit,
    Discipline,
}

impl std::str::FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(TaskType::Focus),
            "habit" => Ok(TaskType::Habit),
            "discipline" => Ok(TaskType::Discipline),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("expected focus, habit or discipline, got '{other}'"),
            }),
        }
    }
}

/// A tracked commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, never reused
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
    /// Virtual stake. Display-only, never settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake_amount: Option<f64>,
    pub deadline: DateTime<Utc>,
    /// Free-form annotation, not validated against status
    pub outcome: String,
}

/// Input for [`TaskLedger::add_task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub stake_amount: Option<f64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            task_type: TaskType::default(),
            stake_amount: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn stake(mut self, amount: f64) -> Self {
        self.stake_amount = Some(amount);
        self
    }

    /// Reject input that would break a task invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title".to_string()));
        }
        if let Some(stake) = self.stake_amount {
            if !stake.is_finite() || stake < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "stakeAmount".to_string(),
                    message: format!("must be a non-negative number, got {stake}"),
                });
            }
        }
        Ok(())
    }
}

/// Ordered task collection, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLedger {
    tasks: Vec<Task>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with the starter task a new user sees.
    pub fn seed() -> Self {
        Self {
            tasks: vec![Task {
                id: Uuid::new_v4().to_string(),
                title: "Study: OS Architecture".to_string(),
                description: "Review Module 4 and draw diagrams.".to_string(),
                task_type: TaskType::Focus,
                status: TaskStatus::Pending,
                stake_amount: Some(20.0),
                deadline: Utc::now(),
                outcome: "Active".to_string(),
            }],
        }
    }

    /// Validate and prepend a new pending task.
    pub fn add_task(&mut self, new_task: NewTask) -> Result<&Task, ValidationError> {
        self.add_task_at(new_task, Utc::now())
    }

    /// Same as [`add_task`](Self::add_task) with an explicit creation time.
    pub fn add_task_at(
        &mut self,
        new_task: NewTask,
        now: DateTime<Utc>,
    ) -> Result<&Task, ValidationError> {
        new_task.validate()?;
        let task = Task {
            id: self.fresh_id(),
            title: new_task.title,
            description: new_task.description,
            task_type: new_task.task_type,
            status: TaskStatus::Pending,
            stake_amount: new_task.stake_amount,
            deadline: now,
            outcome: DEFAULT_OUTCOME.to_string(),
        };
        self.tasks.insert(0, task);
        Ok(&self.tasks[0])
    }

    /// Move a pending task to completed.
    pub fn complete_task(&mut self, id: &str) -> Result<&Task, LedgerError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LedgerError::TaskNotFound(id.to_string()))?;

        if !task.status.can_transition_to(&TaskStatus::Completed) {
            return Err(LedgerError::InvalidTransition {
                id: id.to_string(),
                from: task.status,
                to: TaskStatus::Completed,
            });
        }
        task.status = TaskStatus::Completed;
        Ok(&*task)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in display order (most recent first).
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .count()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
