//! Daily habits grouped into display sections.
//!
//! Habit toggles are fully reversible on `completed`. The streak moves with
//! them and is floored at zero. Habits do not feed reputation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A repeatable daily habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
}

impl Habit {
    pub fn new(id: impl Into<String>, title: impl Into<String>, streak: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            streak,
            last_completed: None,
        }
    }

    fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if self.completed == completed {
            return;
        }
        self.completed = completed;
        if completed {
            self.streak = self.streak.saturating_add(1);
            self.last_completed = Some(now);
        } else {
            self.streak = self.streak.saturating_sub(1);
        }
    }
}

/// Labelled group of habits. Display grouping only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    pub habits: Vec<Habit>,
}

/// Owns the habit sections of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitTracker {
    sections: Vec<HabitSection>,
}

impl HabitTracker {
    pub fn new(sections: Vec<HabitSection>) -> Self {
        Self { sections }
    }

    /// Starter sections for a new user.
    pub fn seed() -> Self {
        let mut exercise = Habit::new("h2", "Exercise", 5);
        exercise.completed = true;
        Self::new(vec![
            HabitSection {
                id: "body".to_string(),
                title: "Fitness & Health".to_string(),
                icon: "Dumbbell".to_string(),
                habits: vec![Habit::new("h1", "Wake Up Early", 12), exercise],
            },
            HabitSection {
                id: "mind".to_string(),
                title: "Mental Focus".to_string(),
                icon: "Brain".to_string(),
                habits: vec![Habit::new("h4", "Meditation", 3)],
            },
        ])
    }

    /// Flip a habit's completion.
    pub fn toggle_habit(&mut self, section_id: &str, habit_id: &str) -> Result<&Habit, LedgerError> {
        self.toggle_habit_at(section_id, habit_id, Utc::now())
    }

    pub fn toggle_habit_at(
        &mut self,
        section_id: &str,
        habit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&Habit, LedgerError> {
        let habit = self.habit_mut(section_id, habit_id)?;
        let target = !habit.completed;
        habit.set_completed(target, now);
        Ok(&*habit)
    }

    /// Set completion explicitly. Setting the current value changes nothing.
    pub fn set_completed(
        &mut self,
        section_id: &str,
        habit_id: &str,
        completed: bool,
    ) -> Result<&Habit, LedgerError> {
        let habit = self.habit_mut(section_id, habit_id)?;
        habit.set_completed(completed, Utc::now());
        Ok(&*habit)
    }

    pub fn sections(&self) -> &[HabitSection] {
        &self.sections
    }

    pub fn habit(&self, section_id: &str, habit_id: &str) -> Option<&Habit> {
        self.sections
            .iter()
            .find(|s| s.id == section_id)?
            .habits
            .iter()
            .find(|h| h.id == habit_id)
    }

    pub fn completed_count(&self) -> usize {
        self.habits().filter(|h| h.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.habits().count()
    }

    fn habits(&self) -> impl Iterator<Item = &Habit> {
        self.sections.iter().flat_map(|s| s.habits.iter())
    }

    fn habit_mut(&mut self, section_id: &str, habit_id: &str) -> Result<&mut Habit, LedgerError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| LedgerError::SectionNotFound(section_id.to_string()))?;
        section
            .habits
            .iter_mut()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| LedgerError::HabitNotFound {
                section_id: section_id.to_string(),
                habit_id: habit_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(streak: u32, completed: bool) -> HabitTracker {
        let mut habit = Habit::new("h", "Read", streak);
        habit.completed = completed;
        HabitTracker::new(vec![HabitSection {
            id: "s".into(),
            title: "Section".into(),
            icon: String::new(),
            habits: vec![habit],
        }])
    }

    #[test]
    fn toggle_on_increments_streak() {
        let mut tracker = tracker_with(3, false);
        let habit = tracker.toggle_habit("s", "h").unwrap();
        assert!(habit.completed);
        assert_eq!(habit.streak, 4);
        assert!(habit.last_completed.is_some());
    }

    #[test]
    fn toggle_off_decrements_streak() {
        let mut tracker = tracker_with(3, true);
        let habit = tracker.toggle_habit("s", "h").unwrap();
        assert!(!habit.completed);
        assert_eq!(habit.streak, 2);
    }

    #[test]
    fn toggle_off_floors_at_zero() {
        let mut tracker = tracker_with(0, true);
        assert_eq!(tracker.toggle_habit("s", "h").unwrap().streak, 0);
    }

    #[test]
    fn double_toggle_round_trips() {
        let mut tracker = tracker_with(0, false);
        tracker.toggle_habit("s", "h").unwrap();
        let habit = tracker.toggle_habit("s", "h").unwrap();
        assert!(!habit.completed);
        assert_eq!(habit.streak, 0);
    }

    #[test]
    fn setting_same_value_is_noop() {
        let mut tracker = tracker_with(4, false);
        let habit = tracker.set_completed("s", "h", false).unwrap();
        assert_eq!(habit.streak, 4);
        assert!(!habit.completed);
    }

    #[test]
    fn unknown_ids_are_not_found_and_leave_state_alone() {
        let mut tracker = tracker_with(1, false);
        let before = tracker.clone();
        assert!(matches!(
            tracker.toggle_habit("nope", "h"),
            Err(LedgerError::SectionNotFound(_))
        ));
        assert!(matches!(
            tracker.toggle_habit("s", "nope"),
            Err(LedgerError::HabitNotFound { .. })
        ));
        assert_eq!(tracker, before);
    }

    #[test]
    fn seed_progress_counts() {
        let tracker = HabitTracker::seed();
        assert_eq!(tracker.total_count(), 3);
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.habit("body", "h1").unwrap().streak, 12);
    }
}
