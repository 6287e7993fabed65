use clap::Subcommand;
use muriell_core::Config;
use serde_json::json;

use super::context::Context;
use super::print_json;

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habit sections with progress
    List,
    /// Flip a habit's completion
    Toggle {
        /// Section ID (e.g. "body")
        section: String,
        /// Habit ID (e.g. "h1")
        habit: String,
    },
}

pub async fn run(action: HabitAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;

    match action {
        HabitAction::List => {
            let habits = ctx.session.snapshot().habits;
            print_json(&json!({
                "sections": habits.sections(),
                "completed": habits.completed_count(),
                "total": habits.total_count(),
            }))?;
        }
        HabitAction::Toggle { section, habit } => {
            let habit = ctx.session.toggle_habit(&section, &habit)?;
            print_json(&habit)?;
        }
    }

    ctx.finish().await
}
