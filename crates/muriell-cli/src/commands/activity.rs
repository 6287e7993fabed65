//! Violation and activity-feed commands.

use muriell_core::{ActivityReport, ActivityStatus, Config};
use serde_json::json;

use super::context::Context;
use super::print_json;

pub async fn violation(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;
    let reputation = ctx.session.record_violation();
    print_json(&json!({
        "reputation": reputation,
        "mood": ctx.session.mood(),
    }))?;
    ctx.finish().await
}

pub async fn observe(
    status: ActivityStatus,
    site: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;
    let observation = ctx.session.observe_activity(ActivityReport::new(site, status));
    print_json(&observation)?;
    ctx.finish().await
}

pub async fn usage(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(config)?;
    let usage = ctx.session.snapshot().usage;
    print_json(&json!({
        "usage": usage.entries(),
        "totals": usage.totals(),
    }))?;
    ctx.finish().await
}
