//! Command-line interface for tapestry
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::organizer::Organizer;
use crate::output::OutputOptions;
use crate::storage::FileStore;

mod init;
mod period;
mod report;
mod session;
mod task;

/// tapestry - organize your day, one moment at a time
///
/// Group tasks into periods of the day, tick them off, move them around and
/// look back at daily activity.
#[derive(Parser, Debug)]
#[command(name = "tapestry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "TAPESTRY_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory with default periods and config
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Period management
    #[command(subcommand)]
    Period(PeriodCommands),

    /// Today's summary (tasks created today)
    Summary,

    /// Lifetime statistics across all periods
    Stats,

    /// Day records from the analytics log
    Calendar {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Month whose active days to list (YYYY-MM, default the day's month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Show the emoji palette
    Emoji,

    /// Local sign-in session
    #[command(subcommand)]
    Session(SessionCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to a period
    Add {
        /// Period id or name
        period: String,

        /// Task title
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        emoji: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// New description (empty clears it)
        #[arg(long)]
        description: Option<String>,

        /// New emoji (empty clears it)
        #[arg(long)]
        emoji: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Toggle a task's completion
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Move a task to another period
    Mv {
        /// Task id or unique id prefix
        id: String,

        /// Target period id or name
        period: String,
    },

    /// List tasks
    Ls {
        /// Only this period (id or name)
        #[arg(long)]
        period: Option<String>,
    },
}

/// Period subcommands
#[derive(Subcommand, Debug)]
pub enum PeriodCommands {
    /// Add a period
    Add {
        /// Display name
        name: String,

        #[arg(long)]
        emoji: Option<String>,
    },

    /// List periods
    Ls,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Sign in as the local demo user
    SignIn,

    /// Sign out
    SignOut,

    /// Show the signed-in user
    Show,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let data_dir = self.data_dir;

        match self.command {
            Commands::Init => init::run(init::InitOptions { data_dir, output }),
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    period,
                    title,
                    description,
                    emoji,
                    due,
                } => task::run_add(task::AddOptions {
                    period,
                    title,
                    description,
                    emoji,
                    due,
                    data_dir,
                    output,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    emoji,
                    due,
                    clear_due,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    emoji,
                    due,
                    clear_due,
                    data_dir,
                    output,
                }),
                TaskCommands::Done { id } => task::run_done(task::TargetOptions {
                    id,
                    data_dir,
                    output,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::TargetOptions {
                    id,
                    data_dir,
                    output,
                }),
                TaskCommands::Mv { id, period } => task::run_mv(task::MoveOptions {
                    id,
                    period,
                    data_dir,
                    output,
                }),
                TaskCommands::Ls { period } => task::run_ls(task::ListOptions {
                    period,
                    data_dir,
                    output,
                }),
            },
            Commands::Period(cmd) => match cmd {
                PeriodCommands::Add { name, emoji } => period::run_add(period::AddOptions {
                    name,
                    emoji,
                    data_dir,
                    output,
                }),
                PeriodCommands::Ls => period::run_ls(period::ListOptions { data_dir, output }),
            },
            Commands::Summary => report::run_summary(report::ReportOptions { data_dir, output }),
            Commands::Stats => report::run_stats(report::ReportOptions { data_dir, output }),
            Commands::Calendar { date, month } => report::run_calendar(report::CalendarOptions {
                date,
                month,
                data_dir,
                output,
            }),
            Commands::Emoji => report::run_emoji(output),
            Commands::Session(cmd) => {
                let options = session::SessionOptions { data_dir, output };
                match cmd {
                    SessionCommands::SignIn => session::run_sign_in(options),
                    SessionCommands::SignOut => session::run_sign_out(options),
                    SessionCommands::Show => session::run_show(options),
                }
            }
        }
    }
}

/// Resolved data directory, its config and a store over it
pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub store: FileStore,
    pub config: Config,
}

pub(crate) fn load_context(data_dir: Option<&Path>) -> Result<Context> {
    let data_dir = config::resolve_data_dir(data_dir)?;
    let config = Config::load_from_dir(&data_dir)?;
    let store = FileStore::new(data_dir.clone()).with_lock_timeout(config.storage.lock_timeout_ms);
    Ok(Context {
        data_dir,
        store,
        config,
    })
}

pub(crate) fn open_organizer(data_dir: Option<&Path>) -> Result<Organizer<FileStore>> {
    let ctx = load_context(data_dir)?;
    Organizer::open(ctx.store, ctx.config)
}

/// Parse a `YYYY-MM-DD` day
pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("invalid date '{raw}': expected YYYY-MM-DD"))
    })
}

/// Parse a `YYYY-MM` month into (year, month)
pub(crate) fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || Error::InvalidArgument(format!("invalid month '{raw}': expected YYYY-MM"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Due dates are stored as local midnight of the chosen day
pub(crate) fn due_instant(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// First eight characters of an id, for human output
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
