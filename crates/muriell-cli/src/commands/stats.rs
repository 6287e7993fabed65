use clap::Subcommand;
use muriell_core::{Config, Mood, ReputationState};
use serde::Serialize;

use super::context::Context;
use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current reputation and mood
    Show,
    /// Set the level
    Level {
        level: u32,
    },
    /// Set the streak counter
    Streak {
        streak: u32,
    },
    /// Reset every counter to zero
    Reset,
}

#[derive(Serialize)]
struct StatsView {
    #[serde(flatten)]
    reputation: ReputationState,
    mood: Mood,
}

impl From<ReputationState> for StatsView {
    fn from(reputation: ReputationState) -> Self {
        Self {
            mood: muriell_core::classify(&reputation),
            reputation,
        }
    }
}

pub async fn run(action: StatsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;

    let reputation = match action {
        StatsAction::Show => ctx.session.reputation(),
        StatsAction::Level { level } => ctx.session.set_level(level),
        StatsAction::Streak { streak } => ctx.session.set_streak(streak),
        StatsAction::Reset => ctx.session.reset_reputation(),
    };
    print_json(&StatsView::from(reputation))?;

    ctx.finish().await
}
