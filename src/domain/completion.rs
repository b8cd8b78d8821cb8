//! Completion records, one per checked-off day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CompletionId, HabitId};

/// A single day-mark belonging to exactly one habit.
///
/// The `date` field is a day identity: time of day is discarded when the
/// completion is created, so equality on `date` is equality of calendar
/// days. A habit never holds two completions with the same date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Unique identifier for this completion.
    pub id: CompletionId,
    /// Which habit this completion belongs to. Navigational only; the
    /// habit owns the completion, not the other way around.
    pub habit_id: HabitId,
    /// The day this completion marks.
    pub date: NaiveDate,
}

impl Completion {
    /// Create a completion marking `date` for the given habit.
    pub fn new(habit_id: HabitId, date: NaiveDate) -> Self {
        Self {
            id: CompletionId::new(),
            habit_id,
            date,
        }
    }

    /// Rebuild a completion from stored data (used when loading from the
    /// database).
    pub fn from_existing(id: CompletionId, habit_id: HabitId, date: NaiveDate) -> Self {
        Self { id, habit_id, date }
    }
}
