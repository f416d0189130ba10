//! Analytics over the period list and the day log.
//!
//! Everything here is a pure function of its inputs. "Today" means the local
//! calendar day of the running process; callers that need determinism pass
//! the day explicitly.
//!
//! Note the asymmetry in [`build_day_record`]: totals count every task
//! currently on the board, while the per-period breakdown counts only tasks
//! created on that day. Existing logs were written that way, so it stays.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{DayAnalytics, Period, Task};

/// Local calendar day of an instant
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn all_tasks(periods: &[Period]) -> impl Iterator<Item = &Task> {
    periods.iter().flat_map(|period| period.tasks.iter())
}

fn created_on(period: &Period, day: NaiveDate) -> usize {
    period
        .tasks
        .iter()
        .filter(|task| local_day(task.created_at) == day)
        .count()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Build the log record for `day`, or `None` when the board has no tasks
pub fn build_day_record(periods: &[Period], day: NaiveDate) -> Option<DayAnalytics> {
    let total_tasks = all_tasks(periods).count();
    if total_tasks == 0 {
        return None;
    }
    let completed_tasks = all_tasks(periods).filter(|task| task.completed).count();

    let mut period_activity = IndexMap::new();
    let mut most_active_period = String::new();
    let mut best = 0;
    for period in periods {
        let count = created_on(period, day);
        if count == 0 {
            continue;
        }
        period_activity.insert(period.name.clone(), count);
        if count > best {
            best = count;
            most_active_period = period.name.clone();
        }
    }

    Some(DayAnalytics {
        date: day,
        total_tasks,
        completed_tasks,
        period_activity,
        most_active_period,
    })
}

/// Replace the record with the same date, or append
pub fn upsert_day(log: &mut Vec<DayAnalytics>, record: DayAnalytics) {
    match log.iter_mut().find(|existing| existing.date == record.date) {
        Some(existing) => *existing = record,
        None => log.push(record),
    }
}

/// Recompute the record for `day`. Returns whether the log was written.
pub fn recompute_for_day(periods: &[Period], log: &mut Vec<DayAnalytics>, day: NaiveDate) -> bool {
    match build_day_record(periods, day) {
        Some(record) => {
            upsert_day(log, record);
            true
        }
        None => false,
    }
}

pub fn recompute_today(periods: &[Period], log: &mut Vec<DayAnalytics>) -> bool {
    recompute_for_day(periods, log, today())
}

/// Totals for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStat {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
}

pub fn period_breakdown(periods: &[Period]) -> Vec<PeriodStat> {
    periods
        .iter()
        .map(|period| {
            let total_tasks = period.tasks.len();
            let completed_tasks = period.completed_count();
            PeriodStat {
                id: period.id.clone(),
                name: period.name.clone(),
                emoji: period.emoji.clone(),
                total_tasks,
                completed_tasks,
                completion_rate: percent(completed_tasks, total_tasks),
            }
        })
        .collect()
}

/// Lifetime view over every task currently on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    /// Period holding the most tasks; first wins ties, `None` when all empty
    pub most_active_period: Option<PeriodStat>,
}

pub fn lifetime_summary(periods: &[Period]) -> LifetimeSummary {
    let breakdown = period_breakdown(periods);
    let total_tasks = breakdown.iter().map(|stat| stat.total_tasks).sum();
    let completed_tasks = breakdown.iter().map(|stat| stat.completed_tasks).sum();

    let mut most_active_period: Option<PeriodStat> = None;
    for stat in breakdown {
        let best = most_active_period
            .as_ref()
            .map(|current| current.total_tasks)
            .unwrap_or(0);
        if stat.total_tasks > best {
            most_active_period = Some(stat);
        }
    }

    LifetimeSummary {
        total_tasks,
        completed_tasks,
        completion_rate: percent(completed_tasks, total_tasks),
        most_active_period,
    }
}

/// Header strip for one day: only tasks created that day count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Whole percent, rounded
    pub completion_rate: u32,
    pub most_active_period: Option<String>,
}

pub fn daily_summary(periods: &[Period], day: NaiveDate) -> DailySummary {
    let todays: Vec<&Task> = all_tasks(periods)
        .filter(|task| local_day(task.created_at) == day)
        .collect();
    let total_tasks = todays.len();
    let completed_tasks = todays.iter().filter(|task| task.completed).count();

    let mut most_active_period = None;
    let mut best = 0;
    for period in periods {
        let count = created_on(period, day);
        if count > best {
            best = count;
            most_active_period = Some(period.name.clone());
        }
    }

    DailySummary {
        date: day,
        total_tasks,
        completed_tasks,
        completion_rate: percent(completed_tasks, total_tasks).round() as u32,
        most_active_period,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiCount {
    pub emoji: String,
    pub count: usize,
}

/// Most used task emoji, descending; ties keep first-seen order
pub fn top_emojis(periods: &[Period], limit: usize) -> Vec<EmojiCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for task in all_tasks(periods) {
        if let Some(emoji) = task.emoji.as_deref() {
            *counts.entry(emoji).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<EmojiCount> = counts
        .into_iter()
        .map(|(emoji, count)| EmojiCount {
            emoji: emoji.to_string(),
            count,
        })
        .collect();
    // sort_by is stable, so equal counts stay in insertion order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// Mean `total_tasks` over the last `window` records in log order
pub fn trailing_average(log: &[DayAnalytics], window: usize) -> f64 {
    let start = log.len().saturating_sub(window);
    let recent = &log[start..];
    if recent.is_empty() {
        return 0.0;
    }
    recent.iter().map(|day| day.total_tasks).sum::<usize>() as f64 / recent.len() as f64
}

pub fn day_record(log: &[DayAnalytics], date: NaiveDate) -> Option<&DayAnalytics> {
    log.iter().find(|day| day.date == date)
}

/// Dates in the given month whose record shows any tasks, ascending
pub fn active_days(log: &[DayAnalytics], year: i32, month: u32) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = log
        .iter()
        .filter(|day| day.date.year() == year && day.date.month() == month && day.total_tasks > 0)
        .map(|day| day.date)
        .collect();
    days.sort();
    days.dedup();
    days
}
