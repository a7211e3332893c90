//! hourglass - fitness coaching tracker

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use hourglass::config::{ADMIN_MODE_VAR, DATA_DIR_VAR};
use hourglass::content::{ContentKey, GETTING_STARTED_KEY, INTRO_KEY};
use hourglass::db::{DEFAULT_USER, Database};
use hourglass::exercises::{self, all_exercise_names};
use hourglass::metrics::{self, BodyMetrics, MetricsMirror, MetricsSummary, MirrorOutcome};
use hourglass::sets::parse_set_count;
use hourglass::tui::App;
use hourglass::workout_log::SetInput;
use hourglass::{AdminMode, Config, ident};

#[derive(Parser)]
#[command(name = "hourglass")]
#[command(author, version, about = "Hourglass fitness - workouts, exercise videos and body metrics")]
struct Cli {
    /// Data directory
    #[arg(long, env = DATA_DIR_VAR, global = true)]
    data_dir: Option<PathBuf>,

    /// Admin mode; only "true" (any case) enables it
    #[arg(long, env = ADMIN_MODE_VAR, value_name = "true|false", global = true)]
    admin: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Log sets of an exercise
    Log {
        /// Exercise name (e.g., "Hip Thrust")
        exercise: String,

        /// Number of working sets
        #[arg(short, long, conflicts_with = "sets_text")]
        sets: Option<u32>,

        /// Set prescription to count working sets from (e.g., "1 warm up set + 3")
        #[arg(long)]
        sets_text: Option<String>,

        /// Reps per set
        #[arg(short, long, default_value = "10")]
        reps: u32,

        /// Weight per set (lbs)
        #[arg(short, long, default_value = "0")]
        weight: f64,

        /// Log the sets as not completed
        #[arg(long)]
        incomplete: bool,

        /// Workout date (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show logged sets of an exercise
    History {
        exercise: String,

        /// Date to show (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Manage video references
    Video {
        #[command(subcommand)]
        command: VideoCommand,
    },

    /// Upload a video file for an exercise, "intro" or "getting-started"
    Upload { key: String, file: PathBuf },

    /// Upload the homepage coach photo
    CoachPhoto { file: PathBuf },

    /// Body metrics check-ins
    Metrics {
        #[command(subcommand)]
        command: MetricsCommand,
    },

    /// List exercises with their video status
    Exercises,

    /// Stored user data
    Data {
        #[command(subcommand)]
        command: DataCommand,
    },
}

#[derive(Subcommand)]
enum VideoCommand {
    /// Assign a URL or local path
    Set { key: String, reference: String },
    /// Remove the assigned video
    Remove { key: String },
    /// Show how the video would be played
    Show { key: String },
    /// List all references
    List,
}

#[derive(Subcommand)]
enum MetricsCommand {
    /// Record a daily check-in
    Add {
        /// Weight (lbs)
        #[arg(long)]
        weight: f64,
        /// Waist (inches)
        #[arg(long, default_value = "30")]
        waist: f64,
        /// Hips (inches)
        #[arg(long, default_value = "36")]
        hips: f64,
        /// Water (liters)
        #[arg(long, default_value = "2.5")]
        water: f64,
        #[arg(long, default_value = "1700")]
        calories_in: i64,
        #[arg(long, default_value = "400")]
        calories_out: i64,
        /// Energy level 1-10
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u8).range(1..=10))]
        energy: u8,
        /// Sleep (hours)
        #[arg(long, default_value = "7")]
        sleep: f64,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Progress summary of mirrored check-ins
    Summary,
    /// Print mirrored check-ins as CSV
    Export,
}

#[derive(Subcommand)]
enum DataCommand {
    /// Write all daily logs to the user data directory
    Export,
    /// Delete profile, settings and daily logs
    Wipe,
}

fn parse_key(raw: &str) -> Result<ContentKey> {
    let key = match raw {
        "intro" | INTRO_KEY => ContentKey::Intro,
        "getting-started" | GETTING_STARTED_KEY => ContentKey::GettingStarted,
        name => ContentKey::for_exercise(name)?,
    };
    Ok(key)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn mirrored_check_ins(config: &Config) -> Result<Vec<BodyMetrics>> {
    let db = Database::open(config.database())?;
    let logs = db.get_logs(DEFAULT_USER, "1900-01-01", "2999-12-31")?;
    Ok(logs.iter().filter_map(|l| l.to_metrics()).collect())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(flag) = cli.admin {
        config.admin = AdminMode::from_flag(&flag);
    }
    config.ensure_dirs()?;

    match cli.command {
        Some(Commands::Log { exercise, sets, sets_text, reps, weight, incomplete, date }) => {
            let exercise_id = ident::try_exercise_id(&exercise)
                .with_context(|| format!("'{exercise}' is not a usable exercise name"))?;
            let count = match (sets, sets_text) {
                (Some(n), _) => n,
                (None, Some(text)) => parse_set_count(&text),
                (None, None) => exercises::find_exercise(&exercise_id)
                    .map(|e| e.working_sets())
                    .unwrap_or(1),
            };
            let date = date.unwrap_or_else(today);
            let inputs = SetInput { reps, weight, completed: !incomplete }.repeated(count)?;

            let outcome = config.workout_log().append_sets(date, &exercise_id, &exercise, &inputs);
            println!("Saved {} sets of {} ({})", outcome.saved, exercise, date);
            if !outcome.all_saved() {
                error!("{} sets could not be saved", outcome.failed);
            }
        }

        Some(Commands::History { exercise, date }) => {
            let date = date.unwrap_or_else(today);
            let rows = config.workout_log().query(date, &ident::exercise_id(&exercise));
            println!("{} on {}:", exercise, date);
            println!("{:-<40}", "");
            if rows.is_empty() {
                println!("No sets logged.");
            }
            for row in rows {
                println!(
                    "Set {} | {:>3} reps | {:>6.1} lbs | {}",
                    row.set_number,
                    row.reps,
                    row.weight,
                    if row.completed { "done" } else { "-" }
                );
            }
        }

        Some(Commands::Video { command }) => {
            let store = config.content_store();
            match command {
                VideoCommand::Set { key, reference } => {
                    config.admin.require()?;
                    let key = parse_key(&key)?;
                    store.set(&key, &reference)?;
                    println!("Video saved for {}", key);
                }
                VideoCommand::Remove { key } => {
                    config.admin.require()?;
                    let key = parse_key(&key)?;
                    if store.remove(&key)? {
                        println!("Video removed for {}", key);
                    } else {
                        println!("No video was assigned to {}", key);
                    }
                }
                VideoCommand::Show { key } => {
                    let key = parse_key(&key)?;
                    println!("{}: {}", key, store.resolve(&key).describe());
                }
                VideoCommand::List => {
                    for (key, reference) in store.load() {
                        let kind = if ContentKey::parse(&key).is_sentinel() { "site" } else { "exercise" };
                        println!("{:24} {:8} {}", key, kind, reference);
                    }
                }
            }
        }

        Some(Commands::Upload { key, file }) => {
            config.admin.require()?;
            let key = parse_key(&key)?;
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("upload needs a file name")?;
            let path = config.media_library().store_upload(&key, name, &bytes)?;
            let reference = path.to_string_lossy();
            config.content_store().set(&key, &reference)?;
            println!("Video uploaded for {}: {}", key, reference);
        }

        Some(Commands::CoachPhoto { file }) => {
            config.admin.require()?;
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("upload needs a file name")?;
            let path = config.media_library().save_coach_photo(name, &bytes)?;
            println!("Photo saved: {}", path.display());
        }

        Some(Commands::Metrics { command }) => match command {
            MetricsCommand::Add {
                weight,
                waist,
                hips,
                water,
                calories_in,
                calories_out,
                energy,
                sleep,
                notes,
                date,
            } => {
                let entry = BodyMetrics::new(
                    date.unwrap_or_else(today),
                    weight,
                    waist,
                    hips,
                    water,
                    calories_in,
                    calories_out,
                    energy,
                    sleep,
                    notes,
                );
                let db = Database::open(config.database())
                    .map_err(|e| warn!("Body metrics mirror unavailable: {}", e))
                    .ok();
                let mut entries = Vec::new();
                let outcome = metrics::record(&mut entries, entry, db.as_ref().map(|d| d as &dyn MetricsMirror));
                match outcome {
                    MirrorOutcome::Mirrored => println!("Entry saved."),
                    MirrorOutcome::Skipped => println!("Entry recorded for this session only."),
                    MirrorOutcome::Failed(reason) => println!("Entry not persisted: {reason}"),
                }
            }
            MetricsCommand::Summary => {
                let entries = mirrored_check_ins(&config)?;
                let summary = MetricsSummary::from_entries(&entries);
                println!("Body metrics ({} entries)", entries.len());
                println!("{:-<40}", "");
                match summary.weight_change {
                    Some(change) => println!("Weight change: {:+.1} lbs", change),
                    None => println!("Weight change: N/A"),
                }
                println!("Avg net calories: {:.0}", summary.avg_net_calories);
                println!("Avg water: {:.1}L", summary.avg_water);
                println!("Avg energy: {:.1}/10", summary.avg_energy);
                if let Some((date, ratio)) = summary.waist_to_hip.last() {
                    println!("Waist-to-hip ratio: {:.2} ({})", ratio, date);
                }
            }
            MetricsCommand::Export => {
                let entries = mirrored_check_ins(&config)?;
                print!("{}", metrics::export_csv(&entries)?);
            }
        },

        Some(Commands::Exercises) => {
            let store = config.content_store();
            for name in all_exercise_names() {
                let id = ident::exercise_id(name);
                let category = exercises::find_exercise(&id).map_or("Extra", |e| e.category.label());
                let status = store.resolve(&ContentKey::Exercise(id.clone())).describe();
                println!("{:32} {:28} {:10} {}", name, id, category, status);
            }
        }

        Some(Commands::Data { command }) => {
            let mut db = Database::open(config.database())?;
            match command {
                DataCommand::Export => {
                    let path = db.export_logs_csv(DEFAULT_USER, &config.user_data_dir())?;
                    println!("Exported to {}", path.display());
                }
                DataCommand::Wipe => {
                    db.delete_all_user_data(DEFAULT_USER)?;
                    println!("All data for '{}' deleted", DEFAULT_USER);
                }
            }
        }

        Some(Commands::Tui) | None => {
            let mut app = App::new(config)?;
            app.run()?;
        }
    }

    Ok(())
}
