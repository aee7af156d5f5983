//! liftos - Progressive overload training log
//!
//! Log sets, watch the estimated 1RM climb, and let the coach pick today's weight.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use liftos::coach::{Coach, PersonaMode};
use liftos::db::{Database, TrainingRecord};
use liftos::exercises::{TaxonomyFile, UNKNOWN_BODY_PART};
use liftos::llm::{LlmError, OpenAiClient};
use liftos::ml::{Analytics, RecoveryTracker, Recommender, WeightPredictor};
use liftos::session::Session;
use liftos::tui::App;

#[derive(Parser)]
#[command(name = "liftos")]
#[command(author, version, about = "Progressive overload training log")]
struct Cli {
    /// SQLite file backing the training sheet
    #[arg(long, global = true, env = "LIFTOS_DB", default_value = "liftos.db")]
    db: String,

    /// Exercise taxonomy document
    #[arg(long, global = true, env = "LIFTOS_TAXONOMY", default_value = "exercises.json")]
    taxonomy: PathBuf,

    /// Display name your records are stored under
    #[arg(short, long, global = true, env = "LIFTOS_USER", default_value = "guest")]
    user: String,

    /// Coach persona: auto, drill, cheer, system, off
    #[arg(long, global = true, env = "LIFTOS_PERSONA", default_value = "auto")]
    persona: PersonaMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Log a set
    Log {
        /// Exercise name (e.g., "Bench Press", "Squat")
        exercise: String,

        /// Weight in kg
        #[arg(short, long)]
        weight: f64,

        /// Reps
        #[arg(short, long)]
        reps: u32,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List training history
    List {
        /// Only this exercise
        #[arg(short, long)]
        exercise: Option<String>,

        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Last session, PR, 1RM trend and suggested weight for an exercise
    Stats { exercise: String },

    /// Days since each body part was trained
    Recovery,

    /// Ask the coach for today's target
    Coach,

    /// Remove the last logged set
    Undo,

    /// Rename an exercise across your history
    Rename { from: String, to: String },

    /// Manage the exercise taxonomy
    #[command(subcommand)]
    Exercise(ExerciseCommands),
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Show body parts and their exercises
    List,
    /// Add an exercise to a body part
    Add { body_part: String, name: String },
    /// Remove an exercise from a body part
    Remove { body_part: String, name: String },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Coach with the OpenAI client when a key is configured
fn build_coach(mode: PersonaMode) -> Coach<OpenAiClient> {
    match OpenAiClient::from_env() {
        Ok(client) => Coach::new(Some(client), mode),
        Err(LlmError::NotConfigured) => Coach::new(None, mode),
        Err(e) => {
            error!("AI coach setup failed: {}", e);
            Coach::new(None, mode)
        }
    }
}

/// Log level when RUST_LOG is unset; the TUI owns the terminal, so keep it quiet there
fn default_log_level(command: Option<&Commands>) -> &'static str {
    match command {
        None | Some(Commands::Tui) => "warn",
        Some(_) => "info",
    }
}

/// Print a failed command's error and turn it into the process status
fn report(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = default_log_level(cli.command.as_ref());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(report(run(cli).await))
}

async fn run(cli: Cli) -> Result<()> {
    let Cli { db, taxonomy, user, persona, command } = cli;

    match command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let taxonomy = TaxonomyFile::open(taxonomy).taxonomy().clone();
            let mut app = App::new(db, taxonomy, build_coach(persona), Session::start(&user))?;
            app.run()?;
        }

        Commands::Log { exercise, weight, reps, date } => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let taxonomy = TaxonomyFile::open(taxonomy);
            let body_part = taxonomy.taxonomy().body_part_of(&exercise).to_string();
            if body_part == UNKNOWN_BODY_PART {
                println!("Note: '{}' is not in the taxonomy, logging it as {}", exercise, UNKNOWN_BODY_PART);
            }

            let record = TrainingRecord::new(date.unwrap_or_else(today), body_part, exercise, weight, reps, user)?;
            db.append(&record)?;
            println!(
                "Logged: {} {}kg x {} on {} [{}]",
                record.exercise,
                record.weight(),
                record.rep_count(),
                record.date.format("%Y-%m-%d"),
                record.body_part
            );
        }

        Commands::List { exercise, limit } => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let records = db.read_all(&user)?;
            println!("Recent sets for {}:", user);
            println!("{:-<60}", "");
            let shown = records
                .iter()
                .rev()
                .filter(|r| exercise.as_deref().is_none_or(|e| r.exercise == e))
                .take(limit);
            for r in shown {
                println!(
                    "{} | {:10} | {:24} | {:>6}kg x {}",
                    r.date.format("%Y-%m-%d"),
                    r.body_part,
                    r.exercise,
                    r.weight(),
                    r.rep_count()
                );
            }
        }

        Commands::Stats { exercise } => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let records = db.read_all(&user)?;
            let analytics = Analytics::new(records);

            println!("Training Statistics: {}", exercise);
            println!("{:-<40}", "");

            let Some(summary) = analytics.summary(&exercise) else {
                println!("First time! No history for {} yet.", exercise);
                return Ok(());
            };

            println!(
                "Last session: {} | {}kg x {}",
                summary.last.date.format("%Y-%m-%d"),
                summary.last.weight(),
                summary.last.rep_count()
            );
            println!(
                "Personal record: {}kg ({})",
                summary.personal_record.weight(),
                summary.personal_record.date.format("%Y-%m-%d")
            );
            println!("Sessions: {}", summary.sessions);
            println!();
            println!("{:<12} {:>8} {:>5} {:>8}", "Date", "kg", "Reps", "1RM");
            for point in &summary.one_rep_max_series {
                println!(
                    "{:<12} {:>8} {:>5} {:>8.1}",
                    point.date.format("%Y-%m-%d"),
                    point.weight,
                    point.reps,
                    point.one_rep_max
                );
            }
            println!();

            match WeightPredictor::train(analytics.records(), &exercise) {
                Some(predictor) => println!("{}", predictor.predict(today()).format()),
                None => println!("Not enough data for a trend yet (need 3 sets)."),
            }
        }

        Commands::Recovery => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let taxonomy = TaxonomyFile::open(taxonomy);
            let records = db.read_all(&user)?;
            let today = today();

            println!("Recovery:");
            println!("{:-<40}", "");
            for (part, age, bar) in RecoveryTracker::from_records(&records, taxonomy.taxonomy(), today).report() {
                println!("{} {:12} {}", bar, part, age);
            }

            if let Some(rec) = Recommender::new(&records, taxonomy.taxonomy(), today).get_recommendation() {
                println!();
                match rec.exercise {
                    Some(exercise) => println!("Train next: {} ({}) - try {}", rec.body_part, rec.reason, exercise),
                    None => println!("Train next: {} ({})", rec.body_part, rec.reason),
                }
            }
        }

        Commands::Coach => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let records = db.read_all(&user)?;
            let advice = build_coach(persona).advise(&records, today()).await;
            println!("{}", advice.text());
        }

        Commands::Undo => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            match db.undo_last(&user)? {
                Some(r) => println!(
                    "Removed: {} {}kg x {} on {}",
                    r.exercise,
                    r.weight(),
                    r.rep_count(),
                    r.date.format("%Y-%m-%d")
                ),
                None => println!("Nothing to undo."),
            }
        }

        Commands::Rename { from, to } => {
            let db = Database::open(&db).context("Could not open the training sheet")?;
            let taxonomy = TaxonomyFile::open(taxonomy);
            let body_part = taxonomy.taxonomy().body_part_of(&to).to_string();
            let changed = db.rename_exercise(&user, &from, &to, &body_part)?;
            println!("Renamed {} sets: {} -> {} [{}]", changed, from, to, body_part);
        }

        Commands::Exercise(cmd) => {
            let mut file = TaxonomyFile::open(taxonomy);
            match cmd {
                ExerciseCommands::List => {
                    let taxonomy = file.taxonomy();
                    for part in taxonomy.body_parts() {
                        println!("{}:", part);
                        for exercise in taxonomy.exercises(part) {
                            println!("  - {}", exercise);
                        }
                    }
                }
                ExerciseCommands::Add { body_part, name } => {
                    file.add(&body_part, &name)?;
                    println!("Added {} to {}", name, body_part);
                }
                ExerciseCommands::Remove { body_part, name } => {
                    file.remove(&body_part, &name)?;
                    println!("Removed {} from {}", name, body_part);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_logs_quietly() {
        assert_eq!(default_log_level(None), "warn");
        assert_eq!(default_log_level(Some(&Commands::Tui)), "warn");
        assert_eq!(default_log_level(Some(&Commands::Undo)), "info");
    }

    #[test]
    fn test_failed_command_exits_non_zero() {
        assert_eq!(report(Ok(())), 0);
        assert_eq!(report(Err(anyhow::anyhow!("sheet unavailable"))), 1);
    }

    #[test]
    fn test_cli_parses_log_command() {
        let cli = Cli::try_parse_from(["liftos", "--user", "amy", "log", "Squat", "-w", "100", "-r", "5"]).unwrap();
        assert_eq!(cli.user, "amy");
        assert!(matches!(cli.command, Some(Commands::Log { reps: 5, .. })));
    }
}
