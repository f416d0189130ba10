//! tapestry period command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{open_organizer, short_id};

pub struct AddOptions {
    pub name: String,
    pub emoji: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct ListOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct PeriodSummary {
    id: String,
    name: String,
    emoji: String,
    color: String,
    total_tasks: usize,
    completed_tasks: usize,
}

#[derive(Serialize)]
struct ListReport {
    periods: Vec<PeriodSummary>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    if options.name.trim().is_empty() {
        return Err(Error::InvalidArgument("period name cannot be empty".to_string()));
    }

    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let id = organizer
        .add_period(&options.name, options.emoji.as_deref())?
        .ok_or_else(|| Error::OperationFailed("period was not added".to_string()))?;
    let slot = organizer
        .board()
        .period(&id)
        .ok_or_else(|| Error::PeriodNotFound(id.clone()))?;

    let report = PeriodSummary {
        id: slot.id.clone(),
        name: slot.name.clone(),
        emoji: slot.emoji.clone(),
        color: slot.color.clone(),
        total_tasks: 0,
        completed_tasks: 0,
    };

    let mut human = HumanOutput::new(format!(
        "tapestry period add: {} {}",
        report.emoji, report.name
    ));
    human.field("id", report.id.clone());
    human.field("color", report.color.clone());
    human.hint(format!("tapestry task add \"{}\" \"<title>\"", report.name));

    emit_success(options.output, "period add", &report, Some(&human))
}

pub fn run_ls(options: ListOptions) -> Result<()> {
    let organizer = open_organizer(options.data_dir.as_deref())?;
    let board = organizer.board();

    let periods: Vec<PeriodSummary> = board
        .periods()
        .iter()
        .map(|slot| {
            let tasks = board.tasks_in(&slot.id);
            PeriodSummary {
                id: slot.id.clone(),
                name: slot.name.clone(),
                emoji: slot.emoji.clone(),
                color: slot.color.clone(),
                total_tasks: tasks.len(),
                completed_tasks: tasks.iter().filter(|task| task.completed).count(),
            }
        })
        .collect();

    let mut human = HumanOutput::new(format!("tapestry period ls: {} period(s)", periods.len()));
    for period in &periods {
        human.line(format!(
            "{} {} [{}] {}/{} done",
            period.emoji,
            period.name,
            short_id(&period.id),
            period.completed_tasks,
            period.total_tasks
        ));
    }

    let report = ListReport { periods };
    emit_success(options.output, "period ls", &report, Some(&human))
}
