//! tapestry task command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::analytics::local_day;
use crate::error::{Error, Result};
use crate::model::{Task, TaskDraft, TaskPatch};
use crate::organizer::Organizer;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::FileStore;

use super::{due_instant, open_organizer, parse_day, short_id};

pub struct AddOptions {
    pub period: String,
    pub title: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub due: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct TargetOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct MoveOptions {
    pub id: String,
    pub period: String,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct ListOptions {
    pub period: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct TaskReport {
    task: Task,
    period_name: String,
}

#[derive(Serialize)]
struct EditReport {
    task: Task,
    changed: bool,
}

#[derive(Serialize)]
struct RemoveReport {
    id: String,
    title: String,
    period: String,
    deleted: bool,
}

#[derive(Serialize)]
struct PeriodTasks {
    id: String,
    name: String,
    emoji: String,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct ListReport {
    total: usize,
    periods: Vec<PeriodTasks>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let title = require_text("title", &options.title)?;
    let due_date = options
        .due
        .as_deref()
        .map(parse_day)
        .transpose()?
        .map(due_instant);

    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let period_id = resolve_period_id(&organizer, &options.period)?;

    let draft = TaskDraft {
        title,
        description: options.description,
        emoji: options.emoji,
        due_date,
    };
    let id = organizer
        .add_task(&period_id, draft)?
        .ok_or_else(|| Error::OperationFailed("task was not added".to_string()))?;

    let report = task_report(&organizer, &id)?;
    let mut human = HumanOutput::new(format!(
        "tapestry task add: {} {}",
        short_id(&report.task.id),
        report.task.title
    ));
    human.field("period", report.period_name.clone());
    if let Some(emoji) = &report.task.emoji {
        human.field("emoji", emoji.clone());
    }
    if let Some(due) = report.task.due_date {
        human.field("due", local_day(due).to_string());
    }
    human.hint(format!("tapestry task done {}", short_id(&id)));

    emit_success(options.output, "task add", &report, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    if let Some(title) = &options.title {
        require_text("title", title)?;
    }

    let due_date = if options.clear_due {
        Some(None)
    } else {
        match options.due.as_deref() {
            Some(raw) => Some(Some(due_instant(parse_day(raw)?))),
            None => None,
        }
    };
    let patch = TaskPatch {
        title: options.title,
        description: options.description.map(Some),
        emoji: options.emoji.map(Some),
        due_date,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass --title, --description, --emoji, --due or --clear-due"
                .to_string(),
        ));
    }

    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let id = organizer.board().resolve_task(&options.id)?.id.clone();
    let changed = organizer.update_task(&id, patch)?;
    let task = lookup(&organizer, &id)?.clone();

    let header = if changed {
        format!("tapestry task edit: updated {}", short_id(&id))
    } else {
        format!("tapestry task edit: {} unchanged", short_id(&id))
    };
    let mut human = HumanOutput::new(header);
    human.field("title", task.title.clone());
    if let Some(description) = &task.description {
        human.field("description", description.clone());
    }
    if let Some(due) = task.due_date {
        human.field("due", local_day(due).to_string());
    }

    let report = EditReport { task, changed };
    emit_success(options.output, "task edit", &report, Some(&human))
}

pub fn run_done(options: TargetOptions) -> Result<()> {
    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let id = organizer.board().resolve_task(&options.id)?.id.clone();
    organizer.toggle_complete(&id)?;

    let report = task_report(&organizer, &id)?;
    let state = if report.task.completed {
        "completed"
    } else {
        "reopened"
    };
    let mut human = HumanOutput::new(format!(
        "tapestry task done: {state} {} {}",
        short_id(&id),
        report.task.title
    ));
    human.field("period", report.period_name.clone());

    emit_success(options.output, "task done", &report, Some(&human))
}

pub fn run_rm(options: TargetOptions) -> Result<()> {
    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let task = organizer.board().resolve_task(&options.id)?.clone();
    let deleted = organizer.delete_task(&task.id)?;

    let report = RemoveReport {
        id: task.id,
        title: task.title,
        period: task.period,
        deleted,
    };
    let human = HumanOutput::new(format!(
        "tapestry task rm: deleted {} {}",
        short_id(&report.id),
        report.title
    ));

    emit_success(options.output, "task rm", &report, Some(&human))
}

pub fn run_mv(options: MoveOptions) -> Result<()> {
    let mut organizer = open_organizer(options.data_dir.as_deref())?;
    let id = organizer.board().resolve_task(&options.id)?.id.clone();
    let target = resolve_period_id(&organizer, &options.period)?;
    organizer.move_task(&id, &target)?;

    let report = task_report(&organizer, &id)?;
    let human = HumanOutput::new(format!(
        "tapestry task mv: {} -> {}",
        short_id(&id),
        report.period_name
    ));

    emit_success(options.output, "task mv", &report, Some(&human))
}

pub fn run_ls(options: ListOptions) -> Result<()> {
    let organizer = open_organizer(options.data_dir.as_deref())?;
    let board = organizer.board();

    let selected = match options.period.as_deref() {
        Some(reference) => vec![board
            .resolve_period(reference)
            .ok_or_else(|| Error::PeriodNotFound(reference.trim().to_string()))?],
        None => board.periods().iter().collect(),
    };

    let periods: Vec<PeriodTasks> = selected
        .into_iter()
        .map(|slot| PeriodTasks {
            id: slot.id.clone(),
            name: slot.name.clone(),
            emoji: slot.emoji.clone(),
            tasks: board.tasks_in(&slot.id).into_iter().cloned().collect(),
        })
        .collect();
    let total = periods.iter().map(|period| period.tasks.len()).sum();

    let mut human = HumanOutput::new(format!("tapestry task ls: {total} task(s)"));
    for period in &periods {
        human.line(format!(
            "{} {} ({})",
            period.emoji,
            period.name,
            period.tasks.len()
        ));
        for task in &period.tasks {
            human.line(format!("  {}", task_line(task)));
        }
    }
    if total == 0 {
        human.hint("tapestry task add <period> \"<title>\"");
    }

    let report = ListReport { total, periods };
    emit_success(options.output, "task ls", &report, Some(&human))
}

fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn resolve_period_id(organizer: &Organizer<FileStore>, reference: &str) -> Result<String> {
    organizer
        .board()
        .resolve_period(reference)
        .map(|slot| slot.id.clone())
        .ok_or_else(|| Error::PeriodNotFound(reference.trim().to_string()))
}

fn lookup<'a>(organizer: &'a Organizer<FileStore>, id: &str) -> Result<&'a Task> {
    organizer
        .board()
        .task(id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))
}

fn task_report(organizer: &Organizer<FileStore>, id: &str) -> Result<TaskReport> {
    let task = lookup(organizer, id)?.clone();
    let period_name = organizer
        .board()
        .period(&task.period)
        .map(|slot| slot.name.clone())
        .unwrap_or_else(|| task.period.clone());
    Ok(TaskReport { task, period_name })
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{mark} {}", short_id(&task.id));
    if let Some(emoji) = &task.emoji {
        line.push(' ');
        line.push_str(emoji);
    }
    line.push(' ');
    line.push_str(&task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!(" (due {})", local_day(due)));
    }
    line
}
