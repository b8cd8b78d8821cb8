//! Persistence boundary for habits and completions.
//!
//! Managers stage entity changes against a [`HabitRepository`] and commit
//! them with [`HabitRepository::save`]. A failed save never rolls back the
//! in-memory entities; staged operations are kept so a later save can
//! still converge the durable store.

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use thiserror::Error;

use crate::domain::{Completion, CompletionId, Habit, HabitId};

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),
}

/// A staged change waiting for the next [`HabitRepository::save`].
#[derive(Debug, Clone)]
pub(crate) enum PendingOp {
    InsertHabit(Habit),
    UpdateHabit(Habit),
    DeleteHabit(HabitId),
    InsertCompletion(Completion),
    DeleteCompletion(CompletionId),
}

/// Contract the managers persist through.
///
/// Insert/update/delete calls stage work and cannot fail; `save` commits
/// everything staged since the last successful save in one step. Deleting
/// a habit cascades to all completions it owns. Implementations may back
/// this with any store; [`SqliteRepository`] is the durable one and
/// [`MemoryRepository`] keeps everything in process.
pub trait HabitRepository {
    /// Load every habit with its completions, ordered by `sort_order`
    /// ascending with `created_at` as the tie-break.
    fn fetch_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Stage a newly created habit (and any completions it carries).
    fn insert_habit(&mut self, habit: &Habit);

    /// Stage new values for an existing habit's own fields. Completions
    /// are staged through their own operations.
    fn update_habit(&mut self, habit: &Habit);

    /// Stage removal of a habit and, by cascade, all its completions.
    /// Unknown ids commit as no-ops.
    fn delete_habit(&mut self, habit_id: &HabitId);

    /// Stage a new completion.
    fn insert_completion(&mut self, completion: &Completion);

    /// Stage removal of a completion. Unknown ids commit as no-ops.
    fn delete_completion(&mut self, completion_id: &CompletionId);

    /// Commit all staged operations. On failure the staged queue is kept
    /// for a retry and nothing already in memory is reverted.
    fn save(&mut self) -> Result<(), StorageError>;
}
