//! Habit entity: a named recurring goal with a weekly completion target.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::WeekCalendar;
use crate::domain::{Completion, DomainError, HabitColor, HabitId};

/// Longest allowed habit name, counted after trimming.
pub const MAX_NAME_LEN: usize = 50;

/// Valid weekly targets. A habit must be completable within one week.
pub const MIN_TARGET_PER_WEEK: u8 = 1;
pub const MAX_TARGET_PER_WEEK: u8 = 7;

/// A habit the user wants to complete a set number of times per week.
///
/// The habit owns its completions: deleting a habit deletes every
/// completion it holds. At most one completion exists per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier, assigned at creation, never changed.
    pub id: HabitId,
    /// Display name. Trimmed, non-empty, at most `MAX_NAME_LEN` chars,
    /// unique across the collection ignoring case.
    pub name: String,
    /// Completions per week required for the goal to count as met.
    pub target_per_week: u8,
    /// Palette index; resolved modulo the palette size for display.
    pub color_index: usize,
    /// When this habit was created. Secondary sort key.
    pub created_at: DateTime<Utc>,
    /// Manual display position. Primary sort key.
    pub sort_order: i64,
    /// Every completion belonging to this habit.
    pub completions: Vec<Completion>,
}

impl Habit {
    /// Create a new habit, validating and trimming the name and checking
    /// the weekly target.
    pub fn new(
        name: &str,
        target_per_week: u8,
        color_index: usize,
        sort_order: i64,
    ) -> Result<Self, DomainError> {
        let validation = Self::validate_name(name);
        if !validation.is_valid() {
            return Err(validation.into_error());
        }
        Self::validate_target(target_per_week)?;

        Ok(Self {
            id: HabitId::new(),
            name: validation.trimmed,
            target_per_week,
            color_index,
            created_at: Utc::now(),
            sort_order,
            completions: Vec::new(),
        })
    }

    /// Rebuild a habit from stored data. Assumes the fields were validated
    /// when first written; used by the storage layer.
    pub fn from_existing(
        id: HabitId,
        name: String,
        target_per_week: u8,
        color_index: usize,
        created_at: DateTime<Utc>,
        sort_order: i64,
        completions: Vec<Completion>,
    ) -> Self {
        Self {
            id,
            name,
            target_per_week,
            color_index,
            created_at,
            sort_order,
            completions,
        }
    }

    /// The display color for this habit.
    pub fn color(&self) -> HabitColor {
        HabitColor::from_index(self.color_index)
    }

    /// Rename the habit. Rejects an invalid name without touching state;
    /// the stored name is the trimmed form.
    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        let validation = Self::validate_name(name);
        if !validation.is_valid() {
            return Err(validation.into_error());
        }
        self.name = validation.trimmed;
        Ok(())
    }

    /// Change the weekly target. Out-of-range values are rejected without
    /// mutating state.
    pub fn set_target_per_week(&mut self, target: u8) -> Result<(), DomainError> {
        Self::validate_target(target)?;
        self.target_per_week = target;
        Ok(())
    }

    pub fn set_color_index(&mut self, color_index: usize) {
        self.color_index = color_index;
    }

    // Week-scoped queries. All of these share the same week-boundary math,
    // so any two dates in one week see identical results.

    /// Completions whose day falls inside the week containing `date`.
    pub fn completions_for_week(
        &self,
        date: NaiveDate,
        calendar: &WeekCalendar,
    ) -> Vec<&Completion> {
        let (start, end) = calendar.week_range(date);
        self.completions
            .iter()
            .filter(|completion| completion.date >= start && completion.date < end)
            .collect()
    }

    /// Number of completions inside the week containing `date`.
    pub fn completion_count_for_week(&self, date: NaiveDate, calendar: &WeekCalendar) -> usize {
        self.completions_for_week(date, calendar).len()
    }

    /// Whether a completion exists for the same calendar day as `date`.
    pub fn is_completed_on(&self, date: NaiveDate, _calendar: &WeekCalendar) -> bool {
        self.completions
            .iter()
            .any(|completion| completion.date == date)
    }

    /// The completion marking the same calendar day as `date`, if any.
    pub fn completion_for(&self, date: NaiveDate, _calendar: &WeekCalendar) -> Option<&Completion> {
        self.completions
            .iter()
            .find(|completion| completion.date == date)
    }

    /// Whether the weekly goal is met for the week containing `date`.
    ///
    /// A week can hold more completions than the target, for instance when
    /// the target was lowered after days were checked; the goal stays met.
    pub fn is_goal_met_for_week(&self, date: NaiveDate, calendar: &WeekCalendar) -> bool {
        self.completion_count_for_week(date, calendar) >= self.target_per_week as usize
    }

    // Validation helpers.

    /// Validate a raw habit name, reporting each rule separately.
    pub fn validate_name(raw: &str) -> NameValidation {
        let trimmed = raw.trim().to_string();
        NameValidation {
            is_non_empty: !trimmed.is_empty(),
            is_within_length: trimmed.chars().count() <= MAX_NAME_LEN,
            trimmed,
        }
    }

    fn validate_target(target: u8) -> Result<(), DomainError> {
        if !(MIN_TARGET_PER_WEEK..=MAX_TARGET_PER_WEEK).contains(&target) {
            return Err(DomainError::InvalidTarget(target));
        }
        Ok(())
    }
}

/// Outcome of validating a raw habit name against the two name rules.
///
/// Uniqueness is a collection-level concern and checked separately, see
/// [`is_name_unique`].
#[derive(Debug, Clone)]
pub struct NameValidation {
    /// The name with leading and trailing whitespace removed. This is the
    /// form that gets stored and compared.
    pub trimmed: String,
    pub is_non_empty: bool,
    pub is_within_length: bool,
}

impl NameValidation {
    pub fn is_valid(&self) -> bool {
        self.is_non_empty && self.is_within_length
    }

    pub(crate) fn into_error(self) -> DomainError {
        if !self.is_non_empty {
            DomainError::InvalidName("name cannot be empty".to_string())
        } else {
            DomainError::InvalidName(format!(
                "name cannot be longer than {} characters",
                MAX_NAME_LEN
            ))
        }
    }
}

/// Whether `name` is free within `habits`, comparing trimmed lowercased
/// forms. `excluding` skips the habit currently being edited, so saving a
/// habit under its own name never reads as a collision.
pub fn is_name_unique(habits: &[Habit], name: &str, excluding: Option<&HabitId>) -> bool {
    let normalized = name.trim().to_lowercase();
    !habits.iter().any(|habit| {
        if excluding == Some(&habit.id) {
            return false;
        }
        habit.name.trim().to_lowercase() == normalized
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_with_completions(target: u8, days: &[NaiveDate]) -> Habit {
        let mut habit = Habit::new("Read", target, 0, 0).unwrap();
        for day in days {
            habit
                .completions
                .push(Completion::new(habit.id.clone(), *day));
        }
        habit
    }

    #[test]
    fn test_create_valid_habit() {
        let habit = Habit::new("  Morning Run  ", 3, 2, 5).unwrap();
        assert_eq!(habit.name, "Morning Run");
        assert_eq!(habit.target_per_week, 3);
        assert_eq!(habit.sort_order, 5);
        assert_eq!(habit.color(), HabitColor::Lime);
        assert!(habit.completions.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Habit::new("   ", 3, 0, 0).is_err());
    }

    #[test]
    fn test_overlong_name_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(Habit::new(&long, 3, 0, 0).is_err());
        // Exactly at the limit is fine.
        let at_limit = "x".repeat(MAX_NAME_LEN);
        assert!(Habit::new(&at_limit, 3, 0, 0).is_ok());
    }

    #[test]
    fn test_target_out_of_range_rejected() {
        assert!(Habit::new("Run", 0, 0, 0).is_err());
        assert!(Habit::new("Run", 8, 0, 0).is_err());
        assert!(Habit::new("Run", 1, 0, 0).is_ok());
        assert!(Habit::new("Run", 7, 0, 0).is_ok());
    }

    #[test]
    fn test_set_target_rejects_without_mutation() {
        let mut habit = Habit::new("Run", 3, 0, 0).unwrap();
        assert!(habit.set_target_per_week(0).is_err());
        assert_eq!(habit.target_per_week, 3);
        assert!(habit.set_target_per_week(9).is_err());
        assert_eq!(habit.target_per_week, 3);
        habit.set_target_per_week(7).unwrap();
        assert_eq!(habit.target_per_week, 7);
    }

    #[test]
    fn test_rename_trims_and_rejects_invalid() {
        let mut habit = Habit::new("Run", 3, 0, 0).unwrap();
        habit.rename("  Swim  ").unwrap();
        assert_eq!(habit.name, "Swim");

        assert!(habit.rename("").is_err());
        assert_eq!(habit.name, "Swim");
    }

    #[test]
    fn test_week_queries() {
        let calendar = WeekCalendar::new(Weekday::Mon);
        // Week of Mon 2024-01-08 .. Sun 2024-01-14.
        let habit = habit_with_completions(
            3,
            &[
                date(2024, 1, 8),
                date(2024, 1, 10),
                date(2024, 1, 14),
                date(2024, 1, 15), // following week
            ],
        );

        let reference = date(2024, 1, 10);
        assert_eq!(habit.completion_count_for_week(reference, &calendar), 3);
        assert!(habit.is_completed_on(date(2024, 1, 10), &calendar));
        assert!(!habit.is_completed_on(date(2024, 1, 9), &calendar));
        assert!(habit.completion_for(date(2024, 1, 14), &calendar).is_some());
        assert!(habit.completion_for(date(2024, 1, 9), &calendar).is_none());
        assert!(habit.is_goal_met_for_week(reference, &calendar));

        // The next week only has one completion so far.
        assert_eq!(
            habit.completion_count_for_week(date(2024, 1, 15), &calendar),
            1
        );
        assert!(!habit.is_goal_met_for_week(date(2024, 1, 15), &calendar));
    }

    #[test]
    fn test_goal_stays_met_beyond_target() {
        let calendar = WeekCalendar::new(Weekday::Mon);
        let mut habit = habit_with_completions(
            2,
            &[date(2024, 1, 8), date(2024, 1, 9), date(2024, 1, 10)],
        );
        assert!(habit.is_goal_met_for_week(date(2024, 1, 8), &calendar));

        // Lowering the target below the count keeps the goal met.
        habit.set_target_per_week(1).unwrap();
        assert!(habit.is_goal_met_for_week(date(2024, 1, 8), &calendar));
    }

    #[test]
    fn test_name_uniqueness_is_case_insensitive_and_trimmed() {
        let habits = vec![
            Habit::new("Run", 3, 0, 0).unwrap(),
            Habit::new("Read", 3, 1, 1).unwrap(),
        ];

        assert!(!is_name_unique(&habits, "run", None));
        assert!(!is_name_unique(&habits, "  READ  ", None));
        assert!(is_name_unique(&habits, "Swim", None));

        // A habit never collides with itself while being edited.
        let own_id = habits[0].id.clone();
        assert!(is_name_unique(&habits, "Run", Some(&own_id)));
        assert!(!is_name_unique(&habits, "Read", Some(&own_id)));
    }

    #[test]
    fn test_validate_name_reports_rules() {
        let empty = Habit::validate_name("   ");
        assert!(!empty.is_non_empty);
        assert!(!empty.is_valid());

        let long = Habit::validate_name(&"y".repeat(60));
        assert!(long.is_non_empty);
        assert!(!long.is_within_length);
        assert!(!long.is_valid());

        let ok = Habit::validate_name("  Stretch  ");
        assert!(ok.is_valid());
        assert_eq!(ok.trimmed, "Stretch");
    }
}
