//! Coordination layer between the entities and their callers.
//!
//! [`HabitListManager`] drives the full collection; [`HabitDetailManager`]
//! is a per-habit editing session. Both route day toggles through the one
//! shared algorithm in this module so signal and invariant behavior cannot
//! drift between them.

pub mod detail;
pub mod list;

pub use detail::HabitDetailManager;
pub use list::HabitListManager;

use chrono::NaiveDate;

use crate::calendar::WeekCalendar;
use crate::domain::{Completion, Habit};
use crate::storage::HabitRepository;

/// User-visible message recorded when a save fails.
pub(crate) const SAVE_ERROR_MESSAGE: &str = "Unable to save. Please try again.";
/// User-visible message recorded when loading the collection fails.
pub(crate) const LOAD_ERROR_MESSAGE: &str = "Unable to load habits. Please try again.";

/// What a toggle did, from the caller's point of view.
///
/// `GoalAchieved` replaces `DayChecked` exactly when the check moved the
/// week from under the target to at-or-over it; checking further days in
/// an already-met week reports plain `DayChecked` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleSignal {
    DayChecked,
    DayUnchecked,
    GoalAchieved,
}

/// Feedback collaborator the managers emit toggle signals through.
///
/// The shell decides what a signal means (haptics, sound, a printed line);
/// the managers never depend on the effect. Injected rather than global so
/// the managers stay testable.
pub trait FeedbackSink {
    fn emit(&self, signal: ToggleSignal);
}

/// A sink that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn emit(&self, _signal: ToggleSignal) {}
}

/// Toggle the completion state of `day` for one habit.
///
/// Computes goal state before touching anything, then either removes the
/// existing completion or creates one; the two branches are exclusive on
/// existence, so a day can never end up with two marks and toggling twice
/// restores the original existence. The matching storage operation is
/// staged on `repo`; committing is the caller's job.
pub(crate) fn toggle_day<R: HabitRepository>(
    habit: &mut Habit,
    day: NaiveDate,
    calendar: &WeekCalendar,
    repo: &mut R,
) -> ToggleSignal {
    let was_goal_met = habit.is_goal_met_for_week(day, calendar);

    if let Some(existing) = habit.completion_for(day, calendar) {
        let completion_id = existing.id.clone();
        habit.completions.retain(|c| c.id != completion_id);
        repo.delete_completion(&completion_id);
        tracing::debug!("Unchecked {} for habit {}", day, habit.id);
        ToggleSignal::DayUnchecked
    } else {
        let completion = Completion::new(habit.id.clone(), day);
        repo.insert_completion(&completion);
        habit.completions.push(completion);
        tracing::debug!("Checked {} for habit {}", day, habit.id);

        let is_goal_met_now =
            habit.completion_count_for_week(day, calendar) >= habit.target_per_week as usize;

        if !was_goal_met && is_goal_met_now {
            ToggleSignal::GoalAchieved
        } else {
            ToggleSignal::DayChecked
        }
    }
}
