//! Assistant mood derived from the current reputation snapshot.
//!
//! Mood is recomputed on demand and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reputation::ReputationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    /// Reserved for presentation; never produced by [`classify`].
    Sarcastic,
    Annoyed,
    /// Reserved for presentation; never produced by [`classify`].
    Disappointed,
    Rage,
    Proud,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mood::Calm => "calm",
            Mood::Sarcastic => "sarcastic",
            Mood::Annoyed => "annoyed",
            Mood::Disappointed => "disappointed",
            Mood::Rage => "rage",
            Mood::Proud => "proud",
        };
        f.write_str(s)
    }
}

/// Map a reputation snapshot to a mood. First matching rule wins.
pub fn classify(state: &ReputationState) -> Mood {
    if state.discipline_score > 90 && state.rage_meter < 20 {
        Mood::Proud
    } else if state.rage_meter > 80 {
        Mood::Rage
    } else if state.rage_meter > 40 {
        Mood::Annoyed
    } else {
        Mood::Calm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(discipline: u8, rage: u8) -> ReputationState {
        ReputationState {
            discipline_score: discipline,
            rage_meter: rage,
            ..ReputationState::zero()
        }
    }

    #[test]
    fn fixtures() {
        assert_eq!(classify(&with(95, 10)), Mood::Proud);
        assert_eq!(classify(&with(10, 90)), Mood::Rage);
        assert_eq!(classify(&with(50, 50)), Mood::Annoyed);
        assert_eq!(classify(&with(50, 10)), Mood::Calm);
    }

    #[test]
    fn high_discipline_does_not_mask_rage() {
        assert_eq!(classify(&with(95, 85)), Mood::Rage);
        assert_eq!(classify(&with(95, 20)), Mood::Calm);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify(&with(90, 0)), Mood::Calm);
        assert_eq!(classify(&with(0, 80)), Mood::Annoyed);
        assert_eq!(classify(&with(0, 81)), Mood::Rage);
        assert_eq!(classify(&with(0, 40)), Mood::Calm);
        assert_eq!(classify(&with(0, 41)), Mood::Annoyed);
    }

    #[test]
    fn total_over_the_whole_domain() {
        for d in 0..=100u8 {
            for r in 0..=100u8 {
                let mood = classify(&with(d, r));
                assert!(matches!(
                    mood,
                    Mood::Proud | Mood::Rage | Mood::Annoyed | Mood::Calm
                ));
            }
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Rage).unwrap(), "\"rage\"");
        assert_eq!(Mood::Proud.to_string(), "proud");
    }
}
