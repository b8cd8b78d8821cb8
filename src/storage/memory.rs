//! In-process repository with the same staging contract as SQLite.
//!
//! Useful for tests and for embedding the managers without a database
//! file. Ordering rules match the SQLite query exactly.

use crate::domain::{Completion, CompletionId, Habit, HabitId};
use crate::storage::{HabitRepository, PendingOp, StorageError};

/// Repository keeping every habit in a plain `Vec`.
#[derive(Default)]
pub struct MemoryRepository {
    habits: Vec<Habit>,
    pending: Vec<PendingOp>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged operations waiting for the next save.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn apply(habits: &mut Vec<Habit>, op: PendingOp) {
        match op {
            PendingOp::InsertHabit(habit) => {
                habits.push(habit);
            }
            PendingOp::UpdateHabit(updated) => {
                if let Some(habit) = habits.iter_mut().find(|h| h.id == updated.id) {
                    habit.name = updated.name;
                    habit.target_per_week = updated.target_per_week;
                    habit.color_index = updated.color_index;
                    habit.sort_order = updated.sort_order;
                }
            }
            PendingOp::DeleteHabit(habit_id) => {
                // Completions live inside the habit, so removal cascades.
                habits.retain(|h| h.id != habit_id);
            }
            PendingOp::InsertCompletion(completion) => {
                if let Some(habit) = habits.iter_mut().find(|h| h.id == completion.habit_id) {
                    habit.completions.push(completion);
                }
            }
            PendingOp::DeleteCompletion(completion_id) => {
                for habit in habits.iter_mut() {
                    habit.completions.retain(|c| c.id != completion_id);
                }
            }
        }
    }
}

impl HabitRepository for MemoryRepository {
    fn fetch_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut habits = self.habits.clone();
        habits.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(habits)
    }

    fn insert_habit(&mut self, habit: &Habit) {
        self.pending.push(PendingOp::InsertHabit(habit.clone()));
    }

    fn update_habit(&mut self, habit: &Habit) {
        self.pending.push(PendingOp::UpdateHabit(habit.clone()));
    }

    fn delete_habit(&mut self, habit_id: &HabitId) {
        self.pending.push(PendingOp::DeleteHabit(habit_id.clone()));
    }

    fn insert_completion(&mut self, completion: &Completion) {
        self.pending
            .push(PendingOp::InsertCompletion(completion.clone()));
    }

    fn delete_completion(&mut self, completion_id: &CompletionId) {
        self.pending
            .push(PendingOp::DeleteCompletion(completion_id.clone()));
    }

    fn save(&mut self) -> Result<(), StorageError> {
        for op in self.pending.drain(..) {
            Self::apply(&mut self.habits, op);
        }
        Ok(())
    }
}
