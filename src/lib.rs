//! Weekly habit tracking.
//!
//! Habits declare how many times per week they should be completed; days
//! are checked off one at a time and week state (completion count, goal
//! met) is derived on demand from current entity state, never cached.
//!
//! The crate is organized in three layers:
//!
//! - [`calendar`]: pure week and day arithmetic, parameterized by the
//!   first day of the week.
//! - [`domain`]: the [`Habit`] and [`Completion`] entities with their
//!   validation rules and week-scoped queries.
//! - [`manager`]: [`HabitListManager`] for the ordered collection and
//!   [`HabitDetailManager`] for per-habit editing sessions, persisting
//!   through the [`storage::HabitRepository`] boundary and reporting
//!   toggle feedback through an injected [`FeedbackSink`].
//!
//! Mutations are single-threaded by design; persistence is synchronous
//! and failures are surfaced to the caller rather than retried.

pub mod calendar;
pub mod domain;
pub mod manager;
pub mod storage;

pub use calendar::{WeekCalendar, WeekdayStyle};
pub use domain::{
    is_name_unique, Completion, CompletionId, DomainError, Habit, HabitColor, HabitId,
    NameValidation, MAX_NAME_LEN, MAX_TARGET_PER_WEEK, MIN_TARGET_PER_WEEK,
};
pub use manager::{FeedbackSink, HabitDetailManager, HabitListManager, NoFeedback, ToggleSignal};
pub use storage::{HabitRepository, MemoryRepository, SqliteRepository, StorageError};
