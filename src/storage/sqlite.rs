//! SQLite-backed repository.
//!
//! Staged operations are applied inside a single transaction per save, so
//! a save either commits everything staged or leaves the database as it
//! was, with the staged queue intact for a retry.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Transaction};

use crate::domain::{Completion, CompletionId, Habit, HabitId};
use crate::storage::{migrations, HabitRepository, PendingOp, StorageError};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Durable repository holding one SQLite connection and the queue of
/// not-yet-committed operations.
pub struct SqliteRepository {
    conn: Connection,
    pending: Vec<PendingOp>,
}

impl SqliteRepository {
    /// Open (or create) the database at `db_path` and bring its schema up
    /// to date.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path.as_ref())
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::with_connection(conn, Some(db_path.as_ref()))
    }

    /// Open a throwaway in-memory database. Used by tests and callers that
    /// want the full storage behavior without a file.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<&Path>) -> Result<Self, StorageError> {
        // Cascade deletes rely on foreign keys being enforced.
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        if let Some(path) = path {
            tracing::info!("SQLite repository initialized at: {:?}", path);
        }

        Ok(Self {
            conn,
            pending: Vec::new(),
        })
    }

    /// Number of staged operations waiting for the next save.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn apply(tx: &Transaction<'_>, op: &PendingOp) -> Result<(), StorageError> {
        match op {
            PendingOp::InsertHabit(habit) => {
                tx.execute(
                    "INSERT INTO habits (id, name, target_per_week, color_index, created_at, sort_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        habit.id.to_string(),
                        habit.name,
                        habit.target_per_week,
                        habit.color_index as i64,
                        habit.created_at.to_rfc3339(),
                        habit.sort_order,
                    ],
                )?;
                for completion in &habit.completions {
                    Self::apply(tx, &PendingOp::InsertCompletion(completion.clone()))?;
                }
                tracing::debug!("Inserted habit: {} ({})", habit.name, habit.id);
            }
            PendingOp::UpdateHabit(habit) => {
                tx.execute(
                    "UPDATE habits SET
                        name = ?2,
                        target_per_week = ?3,
                        color_index = ?4,
                        sort_order = ?5
                     WHERE id = ?1",
                    params![
                        habit.id.to_string(),
                        habit.name,
                        habit.target_per_week,
                        habit.color_index as i64,
                        habit.sort_order,
                    ],
                )?;
                tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
            }
            PendingOp::DeleteHabit(habit_id) => {
                // Completions go with the habit via ON DELETE CASCADE.
                tx.execute(
                    "DELETE FROM habits WHERE id = ?1",
                    params![habit_id.to_string()],
                )?;
                tracing::debug!("Deleted habit: {}", habit_id);
            }
            PendingOp::InsertCompletion(completion) => {
                tx.execute(
                    "INSERT INTO completions (id, habit_id, day) VALUES (?1, ?2, ?3)",
                    params![
                        completion.id.to_string(),
                        completion.habit_id.to_string(),
                        completion.date.format(DAY_FORMAT).to_string(),
                    ],
                )?;
                tracing::debug!(
                    "Inserted completion {} for habit {}",
                    completion.id,
                    completion.habit_id
                );
            }
            PendingOp::DeleteCompletion(completion_id) => {
                tx.execute(
                    "DELETE FROM completions WHERE id = ?1",
                    params![completion_id.to_string()],
                )?;
                tracing::debug!("Deleted completion: {}", completion_id);
            }
        }

        Ok(())
    }
}

impl HabitRepository for SqliteRepository {
    fn fetch_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut completions_by_habit: HashMap<HabitId, Vec<Completion>> = HashMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT id, habit_id, day FROM completions ORDER BY day ASC")?;
        let completion_iter = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let id = CompletionId::parse(&id_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "Invalid UUID".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            let habit_id_str: String = row.get(1)?;
            let habit_id = HabitId::parse(&habit_id_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    1,
                    "Invalid UUID".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            let day_str: String = row.get(2)?;
            let day = NaiveDate::parse_from_str(&day_str, DAY_FORMAT).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "Invalid date".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            Ok(Completion::from_existing(id, habit_id, day))
        })?;

        for completion in completion_iter {
            let completion = completion?;
            completions_by_habit
                .entry(completion.habit_id.clone())
                .or_default()
                .push(completion);
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, name, target_per_week, color_index, created_at, sort_order
             FROM habits
             ORDER BY sort_order ASC, created_at ASC",
        )?;

        let habit_iter = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let id = HabitId::parse(&id_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "Invalid UUID".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            let created_at_str: String = row.get(4)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        4,
                        "Invalid datetime".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&chrono::Utc);

            let color_index: i64 = row.get(3)?;

            Ok((id, row.get::<_, String>(1)?, row.get::<_, u8>(2)?, color_index, created_at, row.get::<_, i64>(5)?))
        })?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            let (id, name, target_per_week, color_index, created_at, sort_order) = habit?;
            let completions = completions_by_habit.remove(&id).unwrap_or_default();
            habits.push(Habit::from_existing(
                id,
                name,
                target_per_week,
                color_index as usize,
                created_at,
                sort_order,
                completions,
            ));
        }

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
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for op in &self.pending {
            Self::apply(&tx, op)?;
        }
        tx.commit()?;

        tracing::debug!("Committed {} staged operations", self.pending.len());
        self.pending.clear();
        Ok(())
    }
}
