use std::sync::Arc;

use muriell_core::{run_checkins, Config, TracingSink};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::context::Context;
use super::print_json;

pub async fn run(watch: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::from_entropy();

    if !watch {
        let ctx = Context::open(config)?;
        let nudge = ctx.session.check_in(&mut rng);
        print_json(&nudge)?;
        return ctx.finish().await;
    }

    if !config.checkin.enabled {
        return Err("check-ins are disabled (checkin.enabled = false)".into());
    }
    // Watch mode runs unattended, so nudges go through the log.
    let ctx = Context::open_with_sink(config, TracingSink)?;
    tracing::info!(
        interval_minutes = config.checkin.interval_minutes,
        "watching for pending tasks"
    );
    // Check-ins never mutate state, so nothing is left unpersisted when the
    // process is interrupted.
    let session = Arc::new(ctx.session);
    run_checkins(session, config.checkin.clone(), rng).await;
    Ok(())
}
