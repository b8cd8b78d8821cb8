//! Per-habit editing session.

use chrono::NaiveDate;

use crate::calendar::WeekCalendar;
use crate::domain::{Habit, HabitId};
use crate::manager::{toggle_day, FeedbackSink, ToggleSignal, SAVE_ERROR_MESSAGE};
use crate::storage::HabitRepository;

/// Editing session bound to one habit.
///
/// Edits go into a buffer and only reach the habit on an explicit
/// [`save_changes`](Self::save_changes), so an invalid or half-finished
/// edit is never persisted and discarding is just resetting the buffer.
///
/// Name uniqueness inside the session is checked against a snapshot of the
/// other habits' names taken when the session opened; the collection
/// cannot change underneath an open session in the single-writer model.
pub struct HabitDetailManager<'a, R: HabitRepository, F: FeedbackSink> {
    habit: &'a mut Habit,
    peers: Vec<(HabitId, String)>,
    repo: &'a mut R,
    feedback: &'a F,
    calendar: WeekCalendar,
    edited_name: String,
    edited_target_per_week: u8,
    edited_color_index: usize,
    on_delete: Option<Box<dyn FnOnce() + 'a>>,
    last_error: Option<String>,
}

impl<'a, R: HabitRepository, F: FeedbackSink> HabitDetailManager<'a, R, F> {
    /// Open a session on `habit`. `peers` are the ids and names of every
    /// other habit in the collection, used for uniqueness checks.
    pub fn new(
        habit: &'a mut Habit,
        peers: Vec<(HabitId, String)>,
        repo: &'a mut R,
        feedback: &'a F,
        calendar: WeekCalendar,
    ) -> Self {
        let edited_name = habit.name.clone();
        let edited_target_per_week = habit.target_per_week;
        let edited_color_index = habit.color_index;

        Self {
            habit,
            peers,
            repo,
            feedback,
            calendar,
            edited_name,
            edited_target_per_week,
            edited_color_index,
            on_delete: None,
            last_error: None,
        }
    }

    /// Attach a callback run after the habit is deleted, for the caller to
    /// navigate away from the now-gone habit.
    pub fn with_on_delete(mut self, callback: impl FnOnce() + 'a) -> Self {
        self.on_delete = Some(Box::new(callback));
        self
    }

    pub fn habit(&self) -> &Habit {
        self.habit
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // Edit buffer.

    pub fn edited_name(&self) -> &str {
        &self.edited_name
    }

    pub fn set_edited_name(&mut self, name: impl Into<String>) {
        self.edited_name = name.into();
    }

    pub fn edited_target_per_week(&self) -> u8 {
        self.edited_target_per_week
    }

    pub fn set_edited_target_per_week(&mut self, target: u8) {
        self.edited_target_per_week = target;
    }

    pub fn edited_color_index(&self) -> usize {
        self.edited_color_index
    }

    pub fn set_edited_color_index(&mut self, color_index: usize) {
        self.edited_color_index = color_index;
    }

    // Validation predicates.

    pub fn has_unsaved_changes(&self) -> bool {
        self.edited_name != self.habit.name
            || self.edited_target_per_week != self.habit.target_per_week
            || self.edited_color_index != self.habit.color_index
    }

    pub fn is_name_valid(&self) -> bool {
        Habit::validate_name(&self.edited_name).is_valid()
    }

    /// Whether the buffered name collides with another habit's name,
    /// comparing trimmed lowercased forms.
    pub fn is_name_unique(&self) -> bool {
        let normalized = self.edited_name.trim().to_lowercase();
        !self
            .peers
            .iter()
            .any(|(_, name)| name.trim().to_lowercase() == normalized)
    }

    pub fn is_target_valid(&self) -> bool {
        (1..=7).contains(&self.edited_target_per_week)
    }

    /// A save is allowed only for a changed, fully valid buffer.
    pub fn can_save(&self) -> bool {
        self.has_unsaved_changes()
            && self.is_name_valid()
            && self.is_name_unique()
            && self.is_target_valid()
    }

    // Week data for the bound habit.

    pub fn week_dates(&self, date: NaiveDate) -> [NaiveDate; 7] {
        self.calendar.dates_in_week(date)
    }

    pub fn completion_count(&self, date: NaiveDate) -> usize {
        self.habit.completion_count_for_week(date, &self.calendar)
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.habit.is_completed_on(date, &self.calendar)
    }

    pub fn is_goal_met(&self, date: NaiveDate) -> bool {
        self.habit.is_goal_met_for_week(date, &self.calendar)
    }

    // Actions.

    /// Toggle `day` for the bound habit, emitting feedback and saving.
    pub fn toggle_completion(&mut self, day: NaiveDate) -> ToggleSignal {
        let signal = toggle_day(self.habit, day, &self.calendar, self.repo);
        self.feedback.emit(signal);
        self.commit();
        signal
    }

    /// Write the buffer into the habit and persist it. Does nothing and
    /// returns false unless [`can_save`](Self::can_save) holds.
    pub fn save_changes(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }

        // can_save vouched for the buffer, so the setters cannot reject.
        if self.habit.rename(&self.edited_name).is_err() {
            return false;
        }
        if self
            .habit
            .set_target_per_week(self.edited_target_per_week)
            .is_err()
        {
            return false;
        }
        self.habit.set_color_index(self.edited_color_index);
        // The stored name is the trimmed form; mirror it in the buffer.
        self.edited_name = self.habit.name.clone();

        self.repo.update_habit(self.habit);
        self.commit();
        true
    }

    /// Throw away buffered edits and reload the habit's current values.
    pub fn discard_changes(&mut self) {
        self.edited_name = self.habit.name.clone();
        self.edited_target_per_week = self.habit.target_per_week;
        self.edited_color_index = self.habit.color_index;
    }

    /// Delete the bound habit (cascading to its completions), then run the
    /// on-delete callback. Consumes the session; the collection should be
    /// refetched afterwards.
    pub fn delete(mut self) {
        tracing::debug!("Deleting habit: {} ({})", self.habit.name, self.habit.id);
        self.repo.delete_habit(&self.habit.id);
        self.commit();

        if let Some(callback) = self.on_delete.take() {
            callback();
        }
    }

    fn commit(&mut self) {
        if let Err(error) = self.repo.save() {
            tracing::warn!("Save failed: {}", error);
            self.last_error = Some(SAVE_ERROR_MESSAGE.to_string());
        }
    }
}
