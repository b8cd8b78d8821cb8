//! Manager for the ordered habit collection.

use chrono::{NaiveDate, Utc};

use crate::calendar::WeekCalendar;
use crate::domain::{is_name_unique, DomainError, Habit, HabitColor, HabitId};
use crate::manager::{
    toggle_day, FeedbackSink, HabitDetailManager, ToggleSignal, LOAD_ERROR_MESSAGE,
    SAVE_ERROR_MESSAGE,
};
use crate::storage::HabitRepository;

/// Owns the habit list and keeps it consistent under insert, delete,
/// reorder and toggle, persisting through the repository it was given.
///
/// All mutations run on the caller's single thread of control; the manager
/// holds no locks. Persistence failures are surfaced through
/// [`HabitListManager::last_error`] and never roll back in-memory state.
pub struct HabitListManager<R: HabitRepository, F: FeedbackSink> {
    repo: R,
    feedback: F,
    calendar: WeekCalendar,
    habits: Vec<Habit>,
    current_date: NaiveDate,
    last_error: Option<String>,
}

impl<R: HabitRepository, F: FeedbackSink> HabitListManager<R, F> {
    /// Build a manager and load the collection. A failed initial load
    /// leaves the list empty with [`last_error`](Self::last_error) set.
    pub fn new(repo: R, feedback: F, calendar: WeekCalendar) -> Self {
        let mut manager = Self {
            repo,
            feedback,
            calendar,
            habits: Vec::new(),
            current_date: Utc::now().date_naive(),
            last_error: None,
        };
        manager.fetch_habits();
        manager
    }

    /// The collection in display order.
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn calendar(&self) -> &WeekCalendar {
        &self.calendar
    }

    /// The most recent user-facing failure message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Reload the collection from the repository.
    ///
    /// On failure the previous list is cleared rather than shown stale,
    /// and a user-facing message is recorded.
    pub fn fetch_habits(&mut self) {
        match self.repo.fetch_habits() {
            Ok(habits) => {
                self.habits = habits;
            }
            Err(error) => {
                tracing::warn!("Failed to load habits: {}", error);
                self.last_error = Some(LOAD_ERROR_MESSAGE.to_string());
                self.habits.clear();
            }
        }
    }

    /// Create a habit and append it to the collection.
    ///
    /// Rejects before mutating anything when the name is invalid or taken
    /// or the target is out of range. When no color is supplied the next
    /// palette entry is assigned by position; the sort order continues the
    /// current sequence.
    pub fn add_habit(
        &mut self,
        name: &str,
        target_per_week: u8,
        color_index: Option<usize>,
    ) -> Result<HabitId, DomainError> {
        let validation = Habit::validate_name(name);
        if !validation.is_valid() {
            return Err(validation.into_error());
        }
        if !self.is_habit_name_unique(&validation.trimmed, None) {
            return Err(DomainError::DuplicateName(validation.trimmed));
        }

        let color_index = color_index.unwrap_or(self.habits.len() % HabitColor::ALL.len());
        let sort_order = self
            .habits
            .iter()
            .map(|h| h.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let habit = Habit::new(name, target_per_week, color_index, sort_order)?;
        let habit_id = habit.id.clone();
        tracing::debug!("Adding habit: {} ({})", habit.name, habit.id);

        self.repo.insert_habit(&habit);
        self.habits.push(habit);
        if self.commit() {
            self.fetch_habits();
        }

        Ok(habit_id)
    }

    /// Remove a habit and all its completions. Unknown ids are a no-op.
    pub fn delete_habit(&mut self, habit_id: &HabitId) {
        let Some(index) = self.habits.iter().position(|h| &h.id == habit_id) else {
            return;
        };

        let habit = self.habits.remove(index);
        tracing::debug!("Deleting habit: {} ({})", habit.name, habit.id);
        self.repo.delete_habit(habit_id);
        if self.commit() {
            self.fetch_habits();
        }
    }

    /// Move the habit at `from` so it ends up at position `to`, then
    /// re-encode positions into contiguous sort orders. Only habits whose
    /// sort order actually changed are written back.
    pub fn move_habit(&mut self, from: usize, to: usize) {
        if from >= self.habits.len() || from == to {
            return;
        }

        let habit = self.habits.remove(from);
        let to = to.min(self.habits.len());
        self.habits.insert(to, habit);

        for (position, habit) in self.habits.iter_mut().enumerate() {
            if habit.sort_order != position as i64 {
                habit.sort_order = position as i64;
                self.repo.update_habit(habit);
            }
        }
        self.commit();
    }

    /// Toggle `day` for the given habit, emitting the resulting feedback
    /// signal. Returns `None` (and does nothing) when the habit is gone,
    /// so a delete racing a toggle stays harmless.
    pub fn toggle_completion(&mut self, habit_id: &HabitId, day: NaiveDate) -> Option<ToggleSignal> {
        let habit = self.habits.iter_mut().find(|h| &h.id == habit_id)?;

        let signal = toggle_day(habit, day, &self.calendar, &mut self.repo);
        self.feedback.emit(signal);
        self.commit();
        Some(signal)
    }

    /// Whether `name` is free in the collection, excluding the given habit
    /// from the comparison.
    pub fn is_habit_name_unique(&self, name: &str, excluding: Option<&HabitId>) -> bool {
        is_name_unique(&self.habits, name, excluding)
    }

    /// The 7 days of the week containing the current date.
    pub fn week_dates(&self) -> [NaiveDate; 7] {
        self.calendar.dates_in_week(self.current_date)
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn set_current_date(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// Re-anchor the week view on today, for callers coming back to the
    /// list after time has passed.
    pub fn refresh_current_date(&mut self) {
        self.current_date = Utc::now().date_naive();
    }

    /// Open an editing session for one habit. The session borrows the
    /// habit in place, so collection operations wait until it is dropped;
    /// call [`fetch_habits`](Self::fetch_habits) afterwards if the session
    /// deleted the habit.
    pub fn detail(&mut self, habit_id: &HabitId) -> Option<HabitDetailManager<'_, R, F>> {
        let peers: Vec<(HabitId, String)> = self
            .habits
            .iter()
            .filter(|h| &h.id != habit_id)
            .map(|h| (h.id.clone(), h.name.clone()))
            .collect();
        let index = self.habits.iter().position(|h| &h.id == habit_id)?;

        Some(HabitDetailManager::new(
            &mut self.habits[index],
            peers,
            &mut self.repo,
            &self.feedback,
            self.calendar,
        ))
    }

    /// Commit staged repository work, recording the user-facing message on
    /// failure. In-memory state is intentionally left as mutated.
    fn commit(&mut self) -> bool {
        match self.repo.save() {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!("Save failed: {}", error);
                self.last_error = Some(SAVE_ERROR_MESSAGE.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::NoFeedback;
    use crate::storage::{MemoryRepository, StorageError};
    use chrono::Weekday;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manager() -> HabitListManager<MemoryRepository, NoFeedback> {
        HabitListManager::new(
            MemoryRepository::new(),
            NoFeedback,
            WeekCalendar::new(Weekday::Mon),
        )
    }

    /// Records every emitted signal through a shared handle.
    #[derive(Clone, Default)]
    struct RecordingFeedback(Rc<RefCell<Vec<ToggleSignal>>>);

    impl FeedbackSink for RecordingFeedback {
        fn emit(&self, signal: ToggleSignal) {
            self.0.borrow_mut().push(signal);
        }
    }

    /// Repository wrapper that fails on demand.
    struct FlakyRepository {
        inner: MemoryRepository,
        fail_fetch: bool,
        fail_save: bool,
    }

    impl FlakyRepository {
        fn new(fail_fetch: bool, fail_save: bool) -> Self {
            Self {
                inner: MemoryRepository::new(),
                fail_fetch,
                fail_save,
            }
        }
    }

    impl HabitRepository for FlakyRepository {
        fn fetch_habits(&self) -> Result<Vec<Habit>, StorageError> {
            if self.fail_fetch {
                return Err(StorageError::Connection("store offline".to_string()));
            }
            self.inner.fetch_habits()
        }

        fn insert_habit(&mut self, habit: &Habit) {
            self.inner.insert_habit(habit);
        }

        fn update_habit(&mut self, habit: &Habit) {
            self.inner.update_habit(habit);
        }

        fn delete_habit(&mut self, habit_id: &HabitId) {
            self.inner.delete_habit(habit_id);
        }

        fn insert_completion(&mut self, completion: &crate::domain::Completion) {
            self.inner.insert_completion(completion);
        }

        fn delete_completion(&mut self, completion_id: &crate::domain::CompletionId) {
            self.inner.delete_completion(completion_id);
        }

        fn save(&mut self) -> Result<(), StorageError> {
            if self.fail_save {
                return Err(StorageError::Connection("store offline".to_string()));
            }
            self.inner.save()
        }
    }

    #[test]
    fn test_add_habit_assigns_color_and_sort_order() {
        let mut manager = manager();

        manager.add_habit("Run", 3, None).unwrap();
        manager.add_habit("Read", 2, None).unwrap();
        manager.add_habit("Stretch", 5, Some(6)).unwrap();

        let habits = manager.habits();
        assert_eq!(habits[0].color_index, 0);
        assert_eq!(habits[1].color_index, 1);
        assert_eq!(habits[2].color_index, 6);
        assert_eq!(habits[0].sort_order, 0);
        assert_eq!(habits[1].sort_order, 1);
        assert_eq!(habits[2].sort_order, 2);
    }

    #[test]
    fn test_add_habit_rejects_duplicate_names() {
        let mut manager = manager();
        manager.add_habit("Run", 3, None).unwrap();
        manager.add_habit("Read", 3, None).unwrap();

        // Case-insensitive collision.
        assert_eq!(
            manager.add_habit("run", 3, None),
            Err(DomainError::DuplicateName("run".to_string()))
        );
        assert_eq!(manager.habits().len(), 2);

        // Trimmed non-colliding name is stored trimmed.
        manager.add_habit(" Swim ", 3, None).unwrap();
        assert_eq!(manager.habits()[2].name, "Swim");
    }

    #[test]
    fn test_add_habit_rejects_invalid_input_without_mutation() {
        let mut manager = manager();
        assert!(manager.add_habit("   ", 3, None).is_err());
        assert!(manager.add_habit("Run", 0, None).is_err());
        assert!(manager.add_habit("Run", 8, None).is_err());
        assert!(manager.habits().is_empty());
    }

    #[test]
    fn test_delete_habit_removes_with_completions() {
        let mut manager = manager();
        let id = manager.add_habit("Run", 3, None).unwrap();
        manager.toggle_completion(&id, date(2024, 1, 8));
        manager.toggle_completion(&id, date(2024, 1, 9));
        manager.toggle_completion(&id, date(2024, 1, 10));

        manager.delete_habit(&id);
        assert!(manager.habits().is_empty());
        // Refetch confirms nothing lingers in the store.
        manager.fetch_habits();
        assert!(manager.habits().is_empty());
    }

    #[test]
    fn test_delete_unknown_habit_is_noop() {
        let mut manager = manager();
        manager.add_habit("Run", 3, None).unwrap();
        manager.delete_habit(&HabitId::new());
        assert_eq!(manager.habits().len(), 1);
    }

    #[test]
    fn test_move_habit_reencodes_sort_orders() {
        let mut manager = manager();
        manager.add_habit("A", 3, None).unwrap();
        manager.add_habit("B", 3, None).unwrap();
        manager.add_habit("C", 3, None).unwrap();

        manager.move_habit(0, 2);

        let names: Vec<&str> = manager.habits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
        let orders: Vec<i64> = manager.habits().iter().map(|h| h.sort_order).collect();
        assert_eq!(orders, [0, 1, 2]);

        // The new order survives a round trip through the store.
        manager.fetch_habits();
        let names: Vec<&str> = manager.habits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn test_move_habit_out_of_bounds_is_noop() {
        let mut manager = manager();
        manager.add_habit("A", 3, None).unwrap();
        manager.move_habit(5, 0);
        assert_eq!(manager.habits()[0].name, "A");
    }

    #[test]
    fn test_toggle_emits_signals_through_sink() {
        let feedback = RecordingFeedback::default();
        let mut manager = HabitListManager::new(
            MemoryRepository::new(),
            feedback.clone(),
            WeekCalendar::new(Weekday::Mon),
        );
        let id = manager.add_habit("Run", 2, None).unwrap();

        manager.toggle_completion(&id, date(2024, 1, 8));
        manager.toggle_completion(&id, date(2024, 1, 9));
        manager.toggle_completion(&id, date(2024, 1, 10));
        manager.toggle_completion(&id, date(2024, 1, 10));

        assert_eq!(
            *feedback.0.borrow(),
            vec![
                ToggleSignal::DayChecked,
                ToggleSignal::GoalAchieved,
                ToggleSignal::DayChecked,
                ToggleSignal::DayUnchecked,
            ]
        );
    }

    #[test]
    fn test_toggle_unknown_habit_is_noop() {
        let mut manager = manager();
        assert_eq!(manager.toggle_completion(&HabitId::new(), date(2024, 1, 8)), None);
    }

    #[test]
    fn test_fetch_failure_clears_list_and_reports() {
        let manager = HabitListManager::new(
            FlakyRepository::new(true, false),
            NoFeedback,
            WeekCalendar::new(Weekday::Mon),
        );
        assert!(manager.habits().is_empty());
        assert_eq!(manager.last_error(), Some(LOAD_ERROR_MESSAGE));
    }

    #[test]
    fn test_save_failure_reports_without_reverting() {
        let mut manager = HabitListManager::new(
            FlakyRepository::new(false, true),
            NoFeedback,
            WeekCalendar::new(Weekday::Mon),
        );

        manager.add_habit("Run", 3, None).unwrap();
        assert_eq!(manager.last_error(), Some(SAVE_ERROR_MESSAGE));
        // The in-memory habit stays despite the failed save.
        assert_eq!(manager.habits().len(), 1);
    }

    #[test]
    fn test_week_dates_follow_current_date() {
        let mut manager = manager();
        manager.set_current_date(date(2024, 1, 10));

        let days = manager.week_dates();
        assert_eq!(days[0], date(2024, 1, 8));
        assert_eq!(days[6], date(2024, 1, 14));
    }
}
