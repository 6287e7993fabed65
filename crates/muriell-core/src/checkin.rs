//! Periodic accountability check-ins.
//!
//! While the user has pending tasks, a nudge goes out every
//! `interval_minutes`. The message is picked at random from a fixed set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::notify::Notification;
use crate::session::Session;

pub const CHECKIN_TITLE: &str = "MURIELL CHECK-IN";

pub const CHECKIN_MESSAGES: [&str; 4] = [
    "Still here? Good. Now finish your work.",
    "You're getting distracted. Get back to it.",
    "I see those unfinished tasks. They won't do themselves.",
    "Stop making excuses and start working.",
];

/// Check-in schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

fn default_true() -> bool {
    true
}
fn default_interval_minutes() -> u64 {
    10
}

impl Default for CheckinPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl CheckinPolicy {
    /// Tick period. Zero minutes is lifted to one.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

/// Build a nudge when there is pending work.
pub fn accountability_nudge<R: Rng>(pending: usize, rng: &mut R) -> Option<Notification> {
    if pending == 0 {
        return None;
    }
    let body = CHECKIN_MESSAGES[rng.gen_range(0..CHECKIN_MESSAGES.len())];
    Some(Notification::new(CHECKIN_TITLE, body))
}

/// Drive check-ins until the session is dropped elsewhere and the task is
/// aborted. Returns immediately when the policy is disabled.
pub async fn run_checkins<R: Rng + Send>(session: Arc<Session>, policy: CheckinPolicy, mut rng: R) {
    if !policy.enabled {
        return;
    }
    let mut ticker = tokio::time::interval(policy.interval());
    // The first tick completes immediately; skip it so the first nudge
    // lands one full interval after start.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        session.check_in(&mut rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use crate::events::EventBus;
    use crate::notify::RecordingSink;
    use crate::session::SessionState;
    use crate::task::NewTask;

    #[test]
    fn no_nudge_without_pending_tasks() {
        let mut rng = Pcg64::seed_from_u64(7);
        assert!(accountability_nudge(0, &mut rng).is_none());
    }

    #[test]
    fn nudge_uses_a_known_message() {
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..20 {
            let n = accountability_nudge(3, &mut rng).unwrap();
            assert_eq!(n.title, CHECKIN_TITLE);
            assert!(CHECKIN_MESSAGES.contains(&n.body.as_str()));
        }
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = accountability_nudge(1, &mut Pcg64::seed_from_u64(42));
        let b = accountability_nudge(1, &mut Pcg64::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn interval_defaults_to_ten_minutes() {
        assert_eq!(CheckinPolicy::default().interval(), Duration::from_secs(600));
        let zero = CheckinPolicy {
            enabled: true,
            interval_minutes: 0,
        };
        assert_eq!(zero.interval(), Duration::from_secs(60));
    }

    fn watched_session() -> (Arc<Session>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = Session::new(SessionState::default(), EventBus::detached(), sink.clone());
        (Arc::new(session), sink)
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_nudges_once_per_interval_while_tasks_are_pending() {
        let (session, sink) = watched_session();
        let id = session.add_task(NewTask::new("Revise notes")).unwrap().id;
        let policy = CheckinPolicy::default();
        let interval = policy.interval();

        let handle = tokio::spawn(run_checkins(
            Arc::clone(&session),
            policy,
            Pcg64::seed_from_u64(1),
        ));
        settle().await;
        assert!(sink.sent().is_empty(), "first tick must be skipped");

        tokio::time::advance(interval).await;
        settle().await;
        assert_eq!(sink.sent().len(), 1);

        tokio::time::advance(interval / 2).await;
        settle().await;
        assert_eq!(sink.sent().len(), 1);

        tokio::time::advance(interval / 2).await;
        settle().await;
        assert_eq!(sink.sent().len(), 2);
        assert_eq!(sink.sent()[1].title, CHECKIN_TITLE);

        session.complete_task(&id).unwrap();
        tokio::time::advance(interval).await;
        settle().await;
        assert_eq!(sink.sent().len(), 2);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_loop_returns_immediately() {
        let (session, sink) = watched_session();
        session.add_task(NewTask::new("pending")).unwrap();
        let policy = CheckinPolicy {
            enabled: false,
            ..CheckinPolicy::default()
        };
        let finished = tokio::time::timeout(
            Duration::from_secs(3600),
            run_checkins(session, policy, Pcg64::seed_from_u64(1)),
        )
        .await;
        assert!(finished.is_ok());
        assert!(sink.sent().is_empty());
    }
}
