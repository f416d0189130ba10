//! The organizer: board + day log + persistence.
//!
//! Owns the single in-memory copy of the state. Every mutation that changes
//! the board recomputes today's analytics record and writes both blobs.
//! Mutations that change nothing (blank input, unknown ids) write nothing.
//!
//! An open organizer holds the store's exclusive lock until it is dropped,
//! so concurrent processes serialize their load -> mutate -> write cycles.
//! Opening also brings today's record up to date, which is how a day on
//! which tasks were only looked at still shows up in the log.
//!
//! If a write fails the in-memory state has already changed; the error is
//! returned and storage stays stale until the next successful write.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::analytics::{self, DailySummary, EmojiCount, LifetimeSummary, PeriodStat};
use crate::board::Board;
use crate::config::Config;
use crate::error::Result;
use crate::lock::FileLock;
use crate::model::{default_periods, DayAnalytics, Period, TaskDraft, TaskPatch};
use crate::storage::{read_blob, write_blob, KeyValueStore, ANALYTICS_KEY, PERIODS_KEY};

pub struct Organizer<S: KeyValueStore> {
    store: S,
    config: Config,
    board: Board,
    log: Vec<DayAnalytics>,
    _guard: Option<FileLock>,
}

impl<S: KeyValueStore> Organizer<S> {
    /// Lock `store` and load state from it. Missing or unreadable blobs fall
    /// back to the default periods and an empty log. Today's record is
    /// recomputed and written when it differs from the stored one.
    pub fn open(store: S, config: Config) -> Result<Self> {
        let guard = store.lock_exclusive()?;
        let periods = match read_blob::<Vec<Period>>(&store, PERIODS_KEY)? {
            Some(periods) => periods,
            None => {
                debug!("no stored periods; using defaults");
                default_periods()
            }
        };
        let log = read_blob::<Vec<DayAnalytics>>(&store, ANALYTICS_KEY)?.unwrap_or_default();

        let mut organizer = Self {
            store,
            config,
            board: Board::from_periods(periods),
            log,
            _guard: guard,
        };
        organizer.refresh_today()?;
        Ok(organizer)
    }

    fn refresh_today(&mut self) -> Result<()> {
        let day = analytics::today();
        let Some(record) = analytics::build_day_record(&self.board.to_periods(), day) else {
            return Ok(());
        };
        if analytics::day_record(&self.log, day) == Some(&record) {
            return Ok(());
        }

        analytics::upsert_day(&mut self.log, record);
        write_blob(&mut self.store, ANALYTICS_KEY, &self.log)?;
        debug!(%day, "today's analytics refreshed on open");
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analytics_log(&self) -> &[DayAnalytics] {
        &self.log
    }

    /// Nested snapshot of every period and its tasks
    pub fn periods(&self) -> Vec<Period> {
        self.board.to_periods()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Write both blobs as they are, without recomputing analytics
    pub fn save(&mut self) -> Result<()> {
        write_blob(&mut self.store, PERIODS_KEY, &self.board.to_periods())?;
        write_blob(&mut self.store, ANALYTICS_KEY, &self.log)?;
        info!(periods = self.board.periods().len(), days = self.log.len(), "state saved");
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let periods = self.board.to_periods();
        if analytics::recompute_today(&periods, &mut self.log) {
            debug!(days = self.log.len(), "analytics recomputed for today");
        }
        write_blob(&mut self.store, PERIODS_KEY, &periods)?;
        write_blob(&mut self.store, ANALYTICS_KEY, &self.log)?;
        Ok(())
    }

    /// Add a task. `Ok(None)` when the title is blank or the period is unknown.
    pub fn add_task(&mut self, period_id: &str, draft: TaskDraft) -> Result<Option<String>> {
        let id = self.board.add_task(period_id, draft, Utc::now());
        if id.is_some() {
            self.commit()?;
        }
        Ok(id)
    }

    pub fn toggle_complete(&mut self, task_id: &str) -> Result<bool> {
        let changed = self.board.toggle_complete(task_id, Utc::now());
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<bool> {
        let changed = self.board.delete_task(task_id);
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    pub fn move_task(&mut self, task_id: &str, target_period_id: &str) -> Result<bool> {
        let changed = self.board.move_task(task_id, target_period_id);
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> Result<bool> {
        let changed = self.board.update_task(task_id, patch);
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    /// Add a period. `Ok(None)` when the name is blank.
    pub fn add_period(&mut self, name: &str, emoji: Option<&str>) -> Result<Option<String>> {
        let id = self.board.add_period(name, emoji, &self.config.periods);
        if id.is_some() {
            self.commit()?;
        }
        Ok(id)
    }

    pub fn daily_summary(&self, day: NaiveDate) -> DailySummary {
        analytics::daily_summary(&self.periods(), day)
    }

    pub fn lifetime_summary(&self) -> LifetimeSummary {
        analytics::lifetime_summary(&self.periods())
    }

    pub fn period_breakdown(&self) -> Vec<PeriodStat> {
        analytics::period_breakdown(&self.periods())
    }

    pub fn top_emojis(&self) -> Vec<EmojiCount> {
        analytics::top_emojis(&self.periods(), self.config.analytics.top_emoji_limit)
    }

    pub fn trailing_average(&self) -> f64 {
        analytics::trailing_average(&self.log, self.config.analytics.trailing_window)
    }

    pub fn day_record(&self, date: NaiveDate) -> Option<&DayAnalytics> {
        analytics::day_record(&self.log, date)
    }

    pub fn active_days(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        analytics::active_days(&self.log, year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::today;
    use crate::storage::MemoryStore;
    use chrono::Datelike;

    fn organizer() -> Organizer<MemoryStore> {
        Organizer::open(MemoryStore::new(), Config::default()).unwrap()
    }

    #[test]
    fn fresh_store_starts_with_default_periods() {
        let org = organizer();
        let names: Vec<&str> = org.board().periods().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Morning", "Afternoon", "Evening", "Night"]);
        assert!(org.analytics_log().is_empty());
        assert!(org.store().is_empty());
    }

    #[test]
    fn mutation_recomputes_and_persists() {
        let mut org = organizer();
        let id = org
            .add_task("morning", TaskDraft::titled("Journal"))
            .unwrap()
            .expect("added");

        assert_eq!(org.analytics_log().len(), 1);
        let entry = &org.analytics_log()[0];
        assert_eq!(entry.date, today());
        assert_eq!(entry.total_tasks, 1);
        assert_eq!(entry.most_active_period, "Morning");

        org.toggle_complete(&id).unwrap();
        assert_eq!(org.analytics_log().len(), 1);
        assert_eq!(org.analytics_log()[0].completed_tasks, 1);

        let reopened = Organizer::open(org.into_store(), Config::default()).unwrap();
        let task = reopened.board().task(&id).expect("persisted");
        assert!(task.completed);
        assert_eq!(reopened.analytics_log()[0].completed_tasks, 1);
    }

    #[test]
    fn noop_mutations_write_nothing() {
        let mut org = organizer();
        assert!(org.add_task("morning", TaskDraft::titled("  ")).unwrap().is_none());
        assert!(!org.toggle_complete("missing").unwrap());
        assert!(!org.delete_task("missing").unwrap());
        assert!(!org.move_task("missing", "night").unwrap());
        assert!(org.add_period(" ", None).unwrap().is_none());
        assert!(org.store().is_empty());
        assert!(org.analytics_log().is_empty());
    }

    #[test]
    fn deleting_last_task_keeps_todays_record() {
        let mut org = organizer();
        let id = org
            .add_task("night", TaskDraft::titled("Read"))
            .unwrap()
            .unwrap();
        assert!(org.delete_task(&id).unwrap());

        // zero tasks: recompute skipped, the earlier record stays as written
        assert_eq!(org.analytics_log().len(), 1);
        assert_eq!(org.analytics_log()[0].total_tasks, 1);
    }

    #[test]
    fn corrupt_blobs_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(PERIODS_KEY, "[{\"id\":").unwrap();
        store.set(ANALYTICS_KEY, "42").unwrap();

        let org = Organizer::open(store, Config::default()).unwrap();
        assert_eq!(org.board().periods().len(), 4);
        assert!(org.analytics_log().is_empty());
    }

    #[test]
    fn add_period_then_move_task_into_it() {
        let mut org = organizer();
        let period = org.add_period("Late Night", Some("🦉")).unwrap().unwrap();
        let task = org
            .add_task("evening", TaskDraft::titled("Dishes").with_emoji("🔥"))
            .unwrap()
            .unwrap();

        assert!(org.move_task(&task, &period).unwrap());
        assert_eq!(org.board().task(&task).unwrap().period, period);
        assert_eq!(org.period_breakdown().last().unwrap().total_tasks, 1);
        assert_eq!(org.top_emojis()[0].emoji, "🔥");

        let record = org.day_record(today()).expect("today");
        assert_eq!(record.period_activity.get("Late Night"), Some(&1));
        let day = today();
        assert_eq!(org.active_days(day.year(), day.month()), vec![day]);
    }

    fn task_created(id: &str, period: &str, days_ago: i64) -> crate::model::Task {
        crate::model::Task {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            emoji: None,
            completed: false,
            created_at: Utc::now() - chrono::Duration::days(days_ago),
            completed_at: None,
            due_date: None,
            period: period.to_string(),
        }
    }

    fn store_with(periods: &[Period], log: &[DayAnalytics]) -> MemoryStore {
        let mut store = MemoryStore::new();
        write_blob(&mut store, PERIODS_KEY, &periods).unwrap();
        write_blob(&mut store, ANALYTICS_KEY, &log).unwrap();
        store
    }

    #[test]
    fn opening_on_a_new_day_writes_todays_record() {
        let mut periods = default_periods();
        periods[1].tasks.push(task_created("old", "afternoon", 3));
        let store = store_with(&periods, &[]);

        let org = Organizer::open(store, Config::default()).unwrap();
        let record = org.day_record(today()).expect("today's record");
        assert_eq!(record.total_tasks, 1);
        assert!(record.period_activity.is_empty());
        assert_eq!(record.most_active_period, "");

        let stored: Vec<DayAnalytics> = read_blob(org.store(), ANALYTICS_KEY).unwrap().unwrap();
        assert_eq!(stored, org.analytics_log());
    }

    #[test]
    fn opening_with_a_current_record_leaves_the_log_alone() {
        let mut org = organizer();
        org.add_task("morning", TaskDraft::titled("Tea")).unwrap();
        let log = org.analytics_log().to_vec();

        // compact text, so any rewrite would show up as pretty-printed JSON
        let compact = serde_json::to_string(&log).unwrap();
        let mut store = org.into_store();
        store.set(ANALYTICS_KEY, &compact).unwrap();

        let reopened = Organizer::open(store, Config::default()).unwrap();
        assert_eq!(reopened.store().get(ANALYTICS_KEY).unwrap(), Some(compact));
        assert_eq!(reopened.analytics_log(), log.as_slice());
    }

    #[test]
    fn save_writes_both_blobs() {
        let mut org = organizer();
        org.save().unwrap();
        assert!(org.store().get(PERIODS_KEY).unwrap().is_some());
        assert_eq!(org.store().get(ANALYTICS_KEY).unwrap().as_deref(), Some("[]"));
    }
}
