//! Command line shell around the habit managers.
//!
//! Renders manager state and routes user actions; all behavior lives in
//! the library. Logs go to stderr so command output stays clean.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use weekmark::{
    FeedbackSink, Habit, HabitId, HabitListManager, SqliteRepository, ToggleSignal, WeekCalendar,
    WeekdayStyle,
};

/// Find a writable home for the database, trying the usual locations.
fn default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        dirs::data_dir().map(|mut p| {
            p.push("weekmark");
            p
        }),
        dirs::home_dir().map(|mut p| {
            p.push(".weekmark");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("weekmark");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".weekmark");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                let mut db_path = potential_path.clone();
                db_path.push("habits.db");
                return Ok(db_path);
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("weekmark");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => Err(format!("unknown weekday: {}", other)),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Track weekly habits from the terminal", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// First day of the week (e.g. monday, sunday)
    #[arg(long, default_value = "monday", value_parser = parse_weekday)]
    week_starts: Weekday,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all habits with this week's progress
    List {
        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Add a new habit
    Add {
        name: String,
        /// Completions per week needed to meet the goal (1-7)
        #[arg(short, long, default_value_t = 3)]
        target: u8,
        /// Palette color index (0-7); assigned automatically if omitted
        #[arg(long)]
        color: Option<usize>,
    },
    /// Delete a habit and all its check-offs
    Delete { name: String },
    /// Check or uncheck a day for a habit
    Check {
        name: String,
        /// Day to toggle (YYYY-MM-DD); today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Move a habit to a new position (1-based, as shown by list)
    Move { from: usize, to: usize },
    /// Edit a habit's name, target or color
    Set {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        target: Option<u8>,
        #[arg(long)]
        color: Option<usize>,
    },
}

/// Maps toggle signals to terminal output.
struct ConsoleFeedback;

impl FeedbackSink for ConsoleFeedback {
    fn emit(&self, signal: ToggleSignal) {
        match signal {
            ToggleSignal::DayChecked => println!("Checked."),
            ToggleSignal::DayUnchecked => println!("Unchecked."),
            ToggleSignal::GoalAchieved => println!("Checked. Weekly goal achieved!"),
        }
    }
}

#[derive(Serialize)]
struct HabitSummary<'a> {
    id: String,
    name: &'a str,
    target_per_week: u8,
    color: &'static str,
    completed_this_week: usize,
    goal_met: bool,
    checked_days: Vec<NaiveDate>,
}

fn resolve_habit(habits: &[Habit], name: &str) -> Option<HabitId> {
    let normalized = name.trim().to_lowercase();
    habits
        .iter()
        .find(|h| h.name.trim().to_lowercase() == normalized)
        .map(|h| h.id.clone())
}

fn print_list(manager: &HabitListManager<SqliteRepository, ConsoleFeedback>, json: bool) {
    let calendar = *manager.calendar();
    let today = manager.current_date();
    let week = manager.week_dates();

    if json {
        let summaries: Vec<HabitSummary<'_>> = manager
            .habits()
            .iter()
            .map(|habit| HabitSummary {
                id: habit.id.to_string(),
                name: &habit.name,
                target_per_week: habit.target_per_week,
                color: habit.color().display_name(),
                completed_this_week: habit.completion_count_for_week(today, &calendar),
                goal_met: habit.is_goal_met_for_week(today, &calendar),
                checked_days: habit
                    .completions_for_week(today, &calendar)
                    .iter()
                    .map(|c| c.date)
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries).unwrap_or_default());
        return;
    }

    if manager.habits().is_empty() {
        println!("No habits yet. Add one with: weekmark add <name>");
        return;
    }

    let labels = calendar.ordered_weekday_labels(WeekdayStyle::VeryShort);
    println!("        {}", labels.join(" "));

    for (position, habit) in manager.habits().iter().enumerate() {
        let marks: Vec<&str> = week
            .iter()
            .map(|day| {
                if habit.is_completed_on(*day, &calendar) {
                    "x"
                } else {
                    "."
                }
            })
            .collect();
        let count = habit.completion_count_for_week(today, &calendar);
        let goal = if habit.is_goal_met_for_week(today, &calendar) {
            " (goal met)"
        } else {
            ""
        };
        println!(
            "{:>2}. {:<24} {}  {}/{}{}",
            position + 1,
            habit.name,
            marks.join(" "),
            count,
            habit.target_per_week,
            goal
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("weekmark={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let repo = SqliteRepository::new(&db_path)?;
    let calendar = WeekCalendar::new(args.week_starts);
    let mut manager = HabitListManager::new(repo, ConsoleFeedback, calendar);

    if let Some(message) = manager.last_error() {
        return Err(message.into());
    }

    match args.command {
        Command::List { json } => {
            print_list(&manager, json);
        }
        Command::Add { name, target, color } => {
            let id = manager.add_habit(&name, target, color)?;
            if let Some(habit) = manager.habits().iter().find(|h| h.id == id) {
                println!(
                    "Added \"{}\" ({} per week, {}).",
                    habit.name,
                    habit.target_per_week,
                    habit.color().display_name()
                );
            }
        }
        Command::Delete { name } => {
            let Some(id) = resolve_habit(manager.habits(), &name) else {
                return Err(format!("No habit named \"{}\"", name.trim()).into());
            };
            manager.delete_habit(&id);
            println!("Deleted \"{}\".", name.trim());
        }
        Command::Check { name, date } => {
            let Some(id) = resolve_habit(manager.habits(), &name) else {
                return Err(format!("No habit named \"{}\"", name.trim()).into());
            };
            let day = date.unwrap_or_else(|| Utc::now().date_naive());
            manager.toggle_completion(&id, day);
        }
        Command::Move { from, to } => {
            let from = from
                .checked_sub(1)
                .ok_or("Positions are 1-based, as shown by list")?;
            let to = to
                .checked_sub(1)
                .ok_or("Positions are 1-based, as shown by list")?;
            manager.move_habit(from, to);
            print_list(&manager, false);
        }
        Command::Set {
            name,
            rename,
            target,
            color,
        } => {
            let Some(id) = resolve_habit(manager.habits(), &name) else {
                return Err(format!("No habit named \"{}\"", name.trim()).into());
            };
            let Some(mut session) = manager.detail(&id) else {
                return Err(format!("No habit named \"{}\"", name.trim()).into());
            };

            if let Some(new_name) = rename {
                session.set_edited_name(new_name);
            }
            if let Some(new_target) = target {
                session.set_edited_target_per_week(new_target);
            }
            if let Some(new_color) = color {
                session.set_edited_color_index(new_color);
            }

            if !session.has_unsaved_changes() {
                println!("Nothing to change.");
            } else if session.save_changes() {
                if let Some(message) = session.last_error() {
                    return Err(message.into());
                }
                println!("Updated \"{}\".", session.habit().name);
            } else if !session.is_name_valid() {
                return Err("Invalid name: must be 1-50 characters".into());
            } else if !session.is_name_unique() {
                return Err("A habit with that name already exists".into());
            } else if !session.is_target_valid() {
                return Err("Target must be between 1 and 7".into());
            }
        }
    }

    if let Some(message) = manager.last_error() {
        return Err(message.into());
    }

    Ok(())
}
