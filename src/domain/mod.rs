//! Core entities and their validation rules.
//!
//! A [`Habit`] owns its [`Completion`]s and answers week-scoped queries
//! built on [`crate::calendar::WeekCalendar`]. Validation failures leave
//! the entity untouched.

pub mod completion;
pub mod habit;
pub mod types;

pub use completion::*;
pub use habit::*;
pub use types::*;

use thiserror::Error;

/// Errors raised by entity validation. Always raised before any mutation;
/// the caller's state is untouched when one of these comes back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidName(String),

    #[error("A habit named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Weekly target must be between 1 and 7, got {0}")]
    InvalidTarget(u8),
}
