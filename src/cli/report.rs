//! Views: daily summary, lifetime stats, calendar and emoji palette.
//!
//! These never change tasks or periods. Opening the organizer may still
//! write today's analytics record.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analytics::{today, DailySummary, EmojiCount, LifetimeSummary, PeriodStat};
use crate::error::Result;
use crate::model::{DayAnalytics, EMOJI_PALETTE};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{open_organizer, parse_day, parse_month};

pub struct ReportOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct CalendarOptions {
    pub date: Option<String>,
    pub month: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct StatsReport {
    lifetime: LifetimeSummary,
    periods: Vec<PeriodStat>,
    top_emojis: Vec<EmojiCount>,
    trailing_average: f64,
    trailing_window: usize,
}

#[derive(Serialize)]
struct CalendarReport {
    date: NaiveDate,
    record: Option<DayAnalytics>,
    year: i32,
    month: u32,
    active_days: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct EmojiReport {
    palette: Vec<&'static str>,
}

pub fn run_summary(options: ReportOptions) -> Result<()> {
    let organizer = open_organizer(options.data_dir.as_deref())?;
    let summary: DailySummary = organizer.daily_summary(today());

    let mut human = HumanOutput::new(format!("tapestry summary: {}", summary.date));
    human.field("tasks today", summary.total_tasks.to_string());
    human.field("completed", summary.completed_tasks.to_string());
    human.field("completion", format!("{}%", summary.completion_rate));
    human.field(
        "most active",
        summary
            .most_active_period
            .clone()
            .unwrap_or_else(|| "none".to_string()),
    );
    if summary.total_tasks == 0 {
        human.hint("tapestry task add morning \"<title>\"");
    }

    emit_success(options.output, "summary", &summary, Some(&human))
}

pub fn run_stats(options: ReportOptions) -> Result<()> {
    let organizer = open_organizer(options.data_dir.as_deref())?;
    let report = StatsReport {
        lifetime: organizer.lifetime_summary(),
        periods: organizer.period_breakdown(),
        top_emojis: organizer.top_emojis(),
        trailing_average: organizer.trailing_average(),
        trailing_window: organizer.config().analytics.trailing_window,
    };

    let mut human = HumanOutput::new("tapestry stats");
    human.field("total tasks", report.lifetime.total_tasks.to_string());
    human.field("completed", report.lifetime.completed_tasks.to_string());
    human.field(
        "completion",
        format!("{:.0}%", report.lifetime.completion_rate),
    );
    human.field(
        "most active",
        report
            .lifetime
            .most_active_period
            .as_ref()
            .map(|stat| format!("{} {}", stat.emoji, stat.name))
            .unwrap_or_else(|| "none".to_string()),
    );
    human.field(
        format!("avg tasks/day (last {} days)", report.trailing_window),
        format!("{:.1}", report.trailing_average),
    );
    for stat in &report.periods {
        human.line(format!(
            "{} {}: {}/{} ({:.0}%)",
            stat.emoji, stat.name, stat.completed_tasks, stat.total_tasks, stat.completion_rate
        ));
    }
    if !report.top_emojis.is_empty() {
        let ranked: Vec<String> = report
            .top_emojis
            .iter()
            .map(|entry| format!("{} x{}", entry.emoji, entry.count))
            .collect();
        human.line(format!("top emoji: {}", ranked.join(", ")));
    }

    emit_success(options.output, "stats", &report, Some(&human))
}

pub fn run_calendar(options: CalendarOptions) -> Result<()> {
    let date = match options.date.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today(),
    };
    let (year, month) = match options.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => (date.year(), date.month()),
    };

    let organizer = open_organizer(options.data_dir.as_deref())?;
    let report = CalendarReport {
        date,
        record: organizer.day_record(date).cloned(),
        year,
        month,
        active_days: organizer.active_days(year, month),
    };

    let mut human = HumanOutput::new(format!("tapestry calendar: {date}"));
    match &report.record {
        Some(record) => {
            human.field("tasks", record.total_tasks.to_string());
            human.field("completed", record.completed_tasks.to_string());
            if !record.most_active_period.is_empty() {
                human.field("most active", record.most_active_period.clone());
            }
            for (name, count) in &record.period_activity {
                human.line(format!("{name}: {count}"));
            }
        }
        None => human.field("record", "none"),
    }
    let days: Vec<String> = report
        .active_days
        .iter()
        .map(|day| day.day().to_string())
        .collect();
    human.field(
        format!("active days {year}-{month:02}"),
        if days.is_empty() {
            "none".to_string()
        } else {
            days.join(", ")
        },
    );

    emit_success(options.output, "calendar", &report, Some(&human))
}

pub fn run_emoji(output: OutputOptions) -> Result<()> {
    let report = EmojiReport {
        palette: EMOJI_PALETTE.to_vec(),
    };

    let mut human = HumanOutput::new("tapestry emoji");
    for row in EMOJI_PALETTE.chunks(10) {
        human.line(row.join(" "));
    }
    human.hint("tapestry task add <period> \"<title>\" --emoji <emoji>");

    emit_success(output, "emoji", &report, Some(&human))
}
