//! Gamified reputation metrics.
//!
//! A [`ReputationState`] is a small `Copy` value. Every mutator takes the
//! current snapshot by value and returns the next one, re-establishing the
//! range invariants before it returns:
//!
//! - `0 <= rage_meter <= 100`
//! - `0 <= discipline_score <= 100`
//! - `xp`, `shame_points` and `streak` are unsigned

use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound for the rage meter and the discipline score.
pub const METER_MAX: u8 = 100;

/// XP granted for completing a task.
pub const TASK_COMPLETION_XP: u64 = 50;
/// Discipline gained for completing a task.
pub const TASK_COMPLETION_DISCIPLINE: u8 = 2;
/// Rage relieved by completing a task.
pub const TASK_COMPLETION_RAGE_RELIEF: u8 = 5;

/// Rage added by a violation.
pub const VIOLATION_RAGE: u8 = 15;
/// Shame points added by a violation.
pub const VIOLATION_SHAME: u64 = 10;
/// Discipline lost on a violation.
pub const VIOLATION_DISCIPLINE_PENALTY: u8 = 5;

/// Numeric gamification metrics for one user session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationState {
    pub xp: u64,
    /// Staged value; there is no automatic level-up rule.
    pub level: u32,
    /// Consecutive-day engagement counter. Never decays on its own.
    pub streak: u32,
    #[serde(deserialize_with = "clamped_meter")]
    pub rage_meter: u8,
    pub shame_points: u64,
    #[serde(deserialize_with = "clamped_meter")]
    pub discipline_score: u8,
}

/// Accepts any stored number for a meter and clamps it into `[0, 100]`,
/// so one bad meter does not discard the rest of the snapshot.
fn clamped_meter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.clamp(0.0, f64::from(METER_MAX)).round() as u8)
}

impl ReputationState {
    /// Starting metrics for a brand-new user.
    pub fn seed() -> Self {
        Self {
            xp: 450,
            level: 4,
            streak: 7,
            rage_meter: 35,
            shame_points: 120,
            discipline_score: 82,
        }
    }

    /// All counters at zero, level 1.
    pub fn zero() -> Self {
        Self {
            xp: 0,
            level: 1,
            streak: 0,
            rage_meter: 0,
            shame_points: 0,
            discipline_score: 0,
        }
    }

    /// Clamp both meters into `[0, 100]`.
    ///
    /// Values loaded from storage may have been written by something else, so
    /// this runs after every deserialization.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.rage_meter = self.rage_meter.min(METER_MAX);
        self.discipline_score = self.discipline_score.min(METER_MAX);
        self.level = self.level.max(1);
        self
    }

    /// Reward for completing a task.
    #[must_use]
    pub fn apply_task_completion(self) -> Self {
        Self {
            xp: self.xp.saturating_add(TASK_COMPLETION_XP),
            discipline_score: self
                .discipline_score
                .saturating_add(TASK_COMPLETION_DISCIPLINE)
                .min(METER_MAX),
            rage_meter: self.rage_meter.saturating_sub(TASK_COMPLETION_RAGE_RELIEF),
            ..self
        }
    }

    /// Penalty for an externally reported violation.
    #[must_use]
    pub fn apply_violation(self) -> Self {
        Self {
            rage_meter: self.rage_meter.saturating_add(VIOLATION_RAGE).min(METER_MAX),
            shame_points: self.shame_points.saturating_add(VIOLATION_SHAME),
            discipline_score: self
                .discipline_score
                .saturating_sub(VIOLATION_DISCIPLINE_PENALTY),
            ..self
        }
    }

    /// Set the level. Zero is lifted to 1.
    #[must_use]
    pub fn with_level(self, level: u32) -> Self {
        Self {
            level: level.max(1),
            ..self
        }
    }

    /// Set the streak counter.
    #[must_use]
    pub fn with_streak(self, streak: u32) -> Self {
        Self { streak, ..self }
    }

    /// Explicit reset. The only path on which xp decreases.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::zero()
    }

    /// True when both meters are in range and the level is at least 1.
    pub fn is_valid(&self) -> bool {
        self.rage_meter <= METER_MAX && self.discipline_score <= METER_MAX && self.level >= 1
    }
}

impl Default for ReputationState {
    fn default() -> Self {
        Self::seed()
    }
}
