//! Task management commands for CLI.

use clap::Subcommand;
use muriell_core::{Config, NewTask, TaskStatus, TaskType};
use serde_json::json;

use super::context::Context;
use super::print_json;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new pending task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long, default_value = "")]
        description: String,
        /// focus, habit or discipline
        #[arg(long = "type", default_value = "focus")]
        task_type: TaskType,
        /// Virtual stake attached to the task
        #[arg(long)]
        stake: Option<f64>,
    },
    /// List tasks, most recent first
    List {
        /// Only pending tasks
        #[arg(long)]
        pending: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Complete a pending task
    Complete {
        /// Task ID
        id: String,
    },
}

pub async fn run(action: TaskAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;

    match action {
        TaskAction::Add {
            title,
            description,
            task_type,
            stake,
        } => {
            let new_task = NewTask {
                title,
                description,
                task_type,
                stake_amount: stake,
            };
            let task = ctx.session.add_task(new_task)?;
            print_json(&task)?;
        }
        TaskAction::List { pending } => {
            let state = ctx.session.snapshot();
            let tasks: Vec<_> = state
                .tasks
                .iter()
                .filter(|t| !pending || t.status == TaskStatus::Pending)
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Get { id } => {
            let state = ctx.session.snapshot();
            let task = state.tasks.get(&id).ok_or(format!("Task not found: {id}"))?;
            print_json(task)?;
        }
        TaskAction::Complete { id } => {
            let (task, reputation) = ctx.session.complete_task(&id)?;
            print_json(&json!({ "task": task, "reputation": reputation }))?;
        }
    }

    ctx.finish().await
}
