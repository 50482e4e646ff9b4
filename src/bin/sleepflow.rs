//! Sleep Flow CLI - log nights and habits, review scores
//!
//! Commands:
//! - habit: Add, list and remove habits
//! - log: Create or update the record for a date
//! - show: Print the derived summary for a date
//! - history: List every logged night, newest first
//! - trend: Week/month/year trend with optional previous-period comparison
//! - reset: Delete all records and habits
//! - doctor: Diagnose data directory and stored collections

use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sleep_flow::report::{DaySummary, Trend, TrendRange};
use sleep_flow::storage::{FileKeyValueStore, STORAGE_KEY_HABITS, STORAGE_KEY_RECORDS};
use sleep_flow::types::{Habit, HabitType};
use sleep_flow::{HabitStore, RecordStore, StoreError, Tracker, PRODUCER_NAME, VERSION};

/// Sleep Flow - On-device sleep and habit tracking
#[derive(Parser)]
#[command(name = "sleepflow")]
#[command(version = VERSION)]
#[command(about = "Track sleep and habits, derive daily quality scores", long_about = None)]
struct Cli {
    /// Directory holding the persisted collections
    #[arg(long, global = true, env = "SLEEPFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Create or update the record for a date
    Log {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Sleep onset (HH:MM); pass "" to clear
        #[arg(long)]
        sleep: Option<String>,

        /// Wake time (HH:MM); pass "" to clear
        #[arg(long)]
        wake: Option<String>,

        /// Morning condition (1-10)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        condition: Option<u8>,

        /// Subjective sleep quality (1-10)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        quality: Option<u8>,

        /// Habit (id or name) completed that day; repeatable
        #[arg(long = "done")]
        done: Vec<String>,

        /// Habit (id or name) not completed that day; repeatable
        #[arg(long = "not-done")]
        not_done: Vec<String>,

        /// Free-text note; pass "" to clear
        #[arg(long)]
        note: Option<String>,

        /// Print the resulting summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the summary for a date
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List logged nights, newest first
    History {
        /// Only the most recent N nights
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a trend window
    Trend {
        /// Window size
        #[arg(long, value_enum, default_value = "week")]
        range: RangeArg,

        /// 0 for the latest period, -1 for the one before, ...
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,

        /// Include the preceding period
        #[arg(long)]
        compare: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every record and habit
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Diagnose data directory and stored collections
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HabitAction {
    /// Add a habit
    Add {
        /// Display name
        name: String,

        /// Polarity
        #[arg(long = "type", value_enum, default_value = "good")]
        habit_type: HabitTypeArg,
    },

    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a habit by id
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HabitTypeArg {
    /// Something to do
    Good,
    /// Something to avoid
    Bad,
}

impl From<HabitTypeArg> for HabitType {
    fn from(value: HabitTypeArg) -> Self {
        match value {
            HabitTypeArg::Good => HabitType::Good,
            HabitTypeArg::Bad => HabitType::Bad,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    /// Last 7 records
    Week,
    /// Last 30 records
    Month,
    /// Last 365 records
    Year,
}

impl From<RangeArg> for TrendRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::Week => TrendRange::Week,
            RangeArg::Month => TrendRange::Month,
            RangeArg::Year => TrendRange::Year,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match init_logging(&cli.log_level) {
        Ok(handle) => handle,
        Err(e) => return report_error(e),
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(e),
    }
}

fn report_error(e: SleepflowCliError) -> ExitCode {
    eprintln!(
        "{}",
        serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
    );
    ExitCode::FAILURE
}

fn init_logging(level: &str) -> Result<LoggerHandle, SleepflowCliError> {
    Logger::try_with_env_or_str(level)
        .and_then(|logger| logger.log_to_stderr().start())
        .map_err(|e| SleepflowCliError::Logger(e.to_string()))
}

fn run(cli: Cli) -> Result<(), SleepflowCliError> {
    let data_dir = resolve_data_dir(cli.data_dir)?;
    debug!("event=cli_start data_dir={}", data_dir.display());

    match cli.command {
        Commands::Doctor { json } => cmd_doctor(&data_dir, json),
        Commands::Habit { action } => cmd_habit(&mut Tracker::open_dir(&data_dir)?, action),
        Commands::Log {
            date,
            sleep,
            wake,
            condition,
            quality,
            done,
            not_done,
            note,
            json,
        } => cmd_log(
            &mut Tracker::open_dir(&data_dir)?,
            LogArgs {
                date,
                sleep,
                wake,
                condition,
                quality,
                done,
                not_done,
                note,
            },
            json,
        ),
        Commands::Show { date, json } => cmd_show(&Tracker::open_dir(&data_dir)?, date, json),
        Commands::History { limit, json } => {
            cmd_history(&Tracker::open_dir(&data_dir)?, limit, json)
        }
        Commands::Trend {
            range,
            offset,
            compare,
            json,
        } => cmd_trend(
            &Tracker::open_dir(&data_dir)?,
            range.into(),
            offset,
            compare,
            json,
        ),
        Commands::Reset { yes } => cmd_reset(&mut Tracker::open_dir(&data_dir)?, yes),
    }
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, SleepflowCliError> {
    match explicit {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|d| d.join(PRODUCER_NAME))
            .ok_or(SleepflowCliError::NoDataDir),
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn cmd_habit(
    tracker: &mut Tracker<FileKeyValueStore>,
    action: HabitAction,
) -> Result<(), SleepflowCliError> {
    match action {
        HabitAction::Add { name, habit_type } => {
            let habit = tracker.habits_mut().add(&name, habit_type.into())?;
            println!("Added {} habit \"{}\" ({})", habit.habit_type, habit.name, habit.id);
        }
        HabitAction::List { json } => {
            let habits = tracker.habits().list();
            if json {
                println!("{}", serde_json::to_string_pretty(habits)?);
            } else if habits.is_empty() {
                println!("No habits configured");
            } else {
                for habit in habits {
                    println!("{:<4} {}  {}", habit.habit_type.as_str(), habit.id, habit.name);
                }
            }
        }
        HabitAction::Remove { id } => {
            if !tracker.habits_mut().remove(&id)? {
                return Err(SleepflowCliError::UnknownHabit(id));
            }
            println!("Removed habit {id}");
        }
    }
    Ok(())
}

struct LogArgs {
    date: Option<String>,
    sleep: Option<String>,
    wake: Option<String>,
    condition: Option<u8>,
    quality: Option<u8>,
    done: Vec<String>,
    not_done: Vec<String>,
    note: Option<String>,
}

fn cmd_log(
    tracker: &mut Tracker<FileKeyValueStore>,
    args: LogArgs,
    json: bool,
) -> Result<(), SleepflowCliError> {
    let date = args.date.unwrap_or_else(today);
    let mut entry = tracker.entry(&date)?;

    if let Some(sleep) = args.sleep {
        entry.set_sleep_time(sleep);
    }
    if let Some(wake) = args.wake {
        entry.set_wake_time(wake);
    }
    if let Some(condition) = args.condition {
        entry.set_condition(condition);
    }
    if let Some(quality) = args.quality {
        entry.set_sleep_quality(quality);
    }
    if let Some(note) = args.note {
        entry.set_notes(Some(note));
    }

    for (keys, completed) in [(&args.done, true), (&args.not_done, false)] {
        for key in keys {
            let habit = resolve_habit(tracker.habits().list(), key)?;
            entry.set_completed(&habit.id, completed);
        }
    }

    let record = tracker.save_entry(&entry)?;
    let summary = DaySummary::from_record(&record, tracker.habits().list());
    print_summary(&summary, json)
}

/// Match a habit by exact id, then by case-insensitive name
fn resolve_habit<'a>(habits: &'a [Habit], key: &str) -> Result<&'a Habit, SleepflowCliError> {
    habits
        .iter()
        .find(|h| h.id == key)
        .or_else(|| habits.iter().find(|h| h.name.eq_ignore_ascii_case(key.trim())))
        .ok_or_else(|| SleepflowCliError::UnknownHabit(key.to_string()))
}

fn cmd_show(
    tracker: &Tracker<FileKeyValueStore>,
    date: Option<String>,
    json: bool,
) -> Result<(), SleepflowCliError> {
    let date = date.unwrap_or_else(today);
    let summary = tracker
        .summary(&date)
        .ok_or(SleepflowCliError::NoRecord(date))?;
    print_summary(&summary, json)
}

fn print_summary(summary: &DaySummary, json: bool) -> Result<(), SleepflowCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{}", summary.date);
    println!("==========");
    println!(
        "Sleep:    {} -> {}  ({}, {})",
        display_clock(&summary.sleep_time),
        display_clock(&summary.wake_time),
        summary.duration_label,
        summary.evaluation.band.label()
    );
    println!("Progress: {:.0}%", summary.evaluation.progress);
    println!("Condition:     {}/10", summary.condition);
    println!("Sleep quality: {}/10", summary.sleep_quality);
    println!("Habit score:   {}/10", summary.habit_score);
    println!("Overall:       {}/10", summary.overall);
    if let Some(notes) = &summary.notes {
        println!("Notes: {notes}");
    }
    Ok(())
}

fn display_clock(time: &str) -> &str {
    if time.is_empty() {
        "--:--"
    } else {
        time
    }
}

fn cmd_history(
    tracker: &Tracker<FileKeyValueStore>,
    limit: Option<usize>,
    json: bool,
) -> Result<(), SleepflowCliError> {
    let mut history = tracker.history();
    if let Some(limit) = limit {
        history.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No nights logged yet");
        return Ok(());
    }

    for day in &history {
        println!(
            "{}  {:>7}  {:<7}  habits {:>2}/10  overall {:>2}/10",
            day.date,
            day.duration_label,
            day.evaluation.band.label(),
            day.habit_score,
            day.overall
        );
    }
    Ok(())
}

fn cmd_trend(
    tracker: &Tracker<FileKeyValueStore>,
    range: TrendRange,
    offset: i64,
    compare: bool,
    json: bool,
) -> Result<(), SleepflowCliError> {
    let trend = tracker.trend(range, offset, compare);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    print_trend(&trend);
    Ok(())
}

fn print_trend(trend: &Trend) {
    let period = if trend.offset == 0 {
        "Current".to_string()
    } else {
        format!("{} ago", trend.offset.abs())
    };
    println!("Trend ({:?}, {period})", trend.range);
    println!("Average score: {}  Top score: {}", trend.stats.average, trend.stats.top);
    if let Some(prev) = &trend.previous_stats {
        println!("Previous:      {}  Top score: {}", prev.average, prev.top);
    }
    println!();

    for (point, prev) in trend.paired() {
        let axis = |v: Option<u32>| {
            v.map(sleep_flow::clock::format_clock)
                .unwrap_or_else(|| "--:--".to_string())
        };
        let mut line = format!(
            "{}  {:>4.1}h  {} -> {}  score {:>2}",
            point.label,
            point.duration_hours,
            axis(point.sleep_axis),
            axis(point.wake_axis),
            point.score
        );
        if let Some(prev) = prev {
            line.push_str(&format!("   | prev {:>4.1}h score {:>2}", prev.duration_hours, prev.score));
        }
        println!("{line}");
    }
}

fn cmd_reset(tracker: &mut Tracker<FileKeyValueStore>, yes: bool) -> Result<(), SleepflowCliError> {
    if !yes {
        return Err(SleepflowCliError::ResetNotConfirmed);
    }
    tracker.reset()?;
    println!("All records and habits deleted");
    Ok(())
}

fn cmd_doctor(data_dir: &Path, json: bool) -> Result<(), SleepflowCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{PRODUCER_NAME} {VERSION}"),
    });

    match FileKeyValueStore::open(data_dir) {
        Ok(backend) => {
            checks.push(DoctorCheck {
                name: "data_dir".to_string(),
                status: CheckStatus::Ok,
                message: format!("Data directory {}", backend.dir().display()),
            });

            for key in [STORAGE_KEY_RECORDS, STORAGE_KEY_HABITS] {
                checks.push(check_collection(&backend, key));
            }
        }
        Err(e) => checks.push(DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot open {}: {e}", data_dir.display()),
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sleep Flow Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SleepflowCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_collection(backend: &FileKeyValueStore, key: &str) -> DoctorCheck {
    let name = key.to_string();
    let path = backend.path_for(key);
    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: "Not created yet".to_string(),
        };
    }

    let loaded = if key == STORAGE_KEY_RECORDS {
        sleep_flow::store::PersistentRecordStore::open(backend.clone()).map(|s| s.len())
    } else {
        sleep_flow::store::PersistentHabitStore::open(backend.clone()).map(|s| s.len())
    };

    match loaded {
        Ok(count) => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!("{count} entries in {}", path.display()),
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    }
}

// Error types

#[derive(Debug)]
enum SleepflowCliError {
    Io(io::Error),
    Store(StoreError),
    Json(serde_json::Error),
    Logger(String),
    NoDataDir,
    UnknownHabit(String),
    NoRecord(String),
    ResetNotConfirmed,
    DoctorFailed,
}

impl From<io::Error> for SleepflowCliError {
    fn from(e: io::Error) -> Self {
        SleepflowCliError::Io(e)
    }
}

impl From<StoreError> for SleepflowCliError {
    fn from(e: StoreError) -> Self {
        SleepflowCliError::Store(e)
    }
}

impl From<serde_json::Error> for SleepflowCliError {
    fn from(e: serde_json::Error) -> Self {
        SleepflowCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SleepflowCliError> for CliError {
    fn from(e: SleepflowCliError) -> Self {
        match e {
            SleepflowCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the data directory path and permissions".to_string()),
            },
            SleepflowCliError::Store(StoreError::Validation(e)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Dates are YYYY-MM-DD, times HH:MM, ratings 1-10".to_string()),
            },
            SleepflowCliError::Store(e) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'sleepflow doctor' for details".to_string()),
            },
            SleepflowCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SleepflowCliError::Logger(msg) => CliError {
                code: "LOGGER_ERROR".to_string(),
                message: msg,
                hint: Some("Check --log-level or RUST_LOG".to_string()),
            },
            SleepflowCliError::NoDataDir => CliError {
                code: "NO_DATA_DIR".to_string(),
                message: "Could not determine a data directory".to_string(),
                hint: Some("Pass --data-dir or set SLEEPFLOW_DATA_DIR".to_string()),
            },
            SleepflowCliError::UnknownHabit(key) => CliError {
                code: "UNKNOWN_HABIT".to_string(),
                message: format!("No habit matches {key}"),
                hint: Some("Run 'sleepflow habit list' to see ids and names".to_string()),
            },
            SleepflowCliError::NoRecord(date) => CliError {
                code: "NO_RECORD".to_string(),
                message: format!("Nothing logged for {date}"),
                hint: Some("Use 'sleepflow log --date <date>' first".to_string()),
            },
            SleepflowCliError::ResetNotConfirmed => CliError {
                code: "RESET_NOT_CONFIRMED".to_string(),
                message: "Reset deletes every record and habit".to_string(),
                hint: Some("Re-run with --yes to confirm".to_string()),
            },
            SleepflowCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
