//! The in-memory task board.
//!
//! Tasks live in a flat registry keyed by id; periods keep only the ordered
//! ids of the tasks they hold. The nested `Period { tasks }` shape exists only
//! at the persistence boundary (`from_periods` / `to_periods`).
//!
//! Mutations never fail. Blank titles, blank names and unknown ids leave the
//! board untouched and the operation reports `false` (or `None`).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PeriodsConfig;
use crate::error::{Error, Result};
use crate::model::{non_blank, Period, Task, TaskDraft, TaskPatch};

/// Period metadata plus the ordered ids of its tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSlot {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    task_ids: Vec<String>,
}

impl PeriodSlot {
    pub fn task_ids(&self) -> &[String] {
        &self.task_ids
    }

    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    periods: Vec<PeriodSlot>,
    tasks: HashMap<String, Task>,
}

impl Board {
    /// Build a board from persisted periods, repairing what would break the
    /// board's invariants.
    pub fn from_periods(records: Vec<Period>) -> Self {
        let mut board = Board::default();
        let mut slot_index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let idx = match slot_index.get(&record.id) {
                Some(&idx) => {
                    warn!(
                        period = %record.id,
                        tasks = record.tasks.len(),
                        "duplicate period id; merging its tasks into the first"
                    );
                    idx
                }
                None => {
                    board.periods.push(PeriodSlot {
                        id: record.id.clone(),
                        name: record.name,
                        emoji: record.emoji,
                        color: record.color,
                        task_ids: Vec::new(),
                    });
                    slot_index.insert(record.id.clone(), board.periods.len() - 1);
                    board.periods.len() - 1
                }
            };

            for mut task in record.tasks {
                if board.tasks.contains_key(&task.id) {
                    warn!(task = %task.id, period = %record.id, "duplicate task id dropped");
                    continue;
                }
                let slot = &mut board.periods[idx];
                if task.period != slot.id {
                    debug!(task = %task.id, from = %task.period, to = %slot.id, "repaired task period");
                    task.period = slot.id.clone();
                }
                task.normalize_completion();
                task.normalize_text();
                slot.task_ids.push(task.id.clone());
                board.tasks.insert(task.id.clone(), task);
            }
        }

        board
    }

    /// Nested snapshot of the board in period order
    pub fn to_periods(&self) -> Vec<Period> {
        self.periods
            .iter()
            .map(|slot| Period {
                id: slot.id.clone(),
                name: slot.name.clone(),
                emoji: slot.emoji.clone(),
                color: slot.color.clone(),
                tasks: slot
                    .task_ids
                    .iter()
                    .filter_map(|id| self.tasks.get(id).cloned())
                    .collect(),
            })
            .collect()
    }

    pub fn periods(&self) -> &[PeriodSlot] {
        &self.periods
    }

    pub fn period(&self, id: &str) -> Option<&PeriodSlot> {
        self.periods.iter().find(|slot| slot.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks of one period in insertion order
    pub fn tasks_in(&self, period_id: &str) -> Vec<&Task> {
        self.period(period_id)
            .map(|slot| {
                slot.task_ids
                    .iter()
                    .filter_map(|id| self.tasks.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a new task to `period_id`. Returns the new id, or `None` when the
    /// title is blank or the period does not exist.
    pub fn add_task(
        &mut self,
        period_id: &str,
        draft: TaskDraft,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let title = non_blank(Some(&draft.title))?;
        let slot = self.periods.iter_mut().find(|slot| slot.id == period_id)?;

        let id = Uuid::new_v4().to_string();
        let task = Task {
            id: id.clone(),
            title,
            description: non_blank(draft.description.as_deref()),
            emoji: non_blank(draft.emoji.as_deref()),
            completed: false,
            created_at: now,
            completed_at: None,
            due_date: draft.due_date,
            period: slot.id.clone(),
        };

        slot.task_ids.push(id.clone());
        self.tasks.insert(id.clone(), task);
        debug!(task = %id, period = %period_id, "task added");
        Some(id)
    }

    pub fn toggle_complete(&mut self, task_id: &str, now: DateTime<Utc>) -> bool {
        match self.tasks.get_mut(task_id) {
            Some(task) => {
                task.toggle_completed(now);
                debug!(task = %task_id, completed = task.completed, "task toggled");
                true
            }
            None => false,
        }
    }

    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let Some(task) = self.tasks.remove(task_id) else {
            return false;
        };
        if let Some(slot) = self.periods.iter_mut().find(|slot| slot.id == task.period) {
            slot.task_ids.retain(|id| id != task_id);
        }
        debug!(task = %task_id, period = %task.period, "task deleted");
        true
    }

    /// Move a task to the end of `target_period_id`. Moving onto the period
    /// that already holds the task re-appends it at the end.
    pub fn move_task(&mut self, task_id: &str, target_period_id: &str) -> bool {
        if self.period(target_period_id).is_none() {
            return false;
        }
        let Some(task) = self.tasks.get_mut(task_id) else {
            return false;
        };

        let source = std::mem::replace(&mut task.period, target_period_id.to_string());
        if let Some(slot) = self.periods.iter_mut().find(|slot| slot.id == source) {
            slot.task_ids.retain(|id| id != task_id);
        }
        if let Some(slot) = self
            .periods
            .iter_mut()
            .find(|slot| slot.id == target_period_id)
        {
            slot.task_ids.push(task_id.to_string());
        }
        debug!(task = %task_id, from = %source, to = %target_period_id, "task moved");
        true
    }

    /// Edit an existing task. A blank replacement title rejects the whole patch.
    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> bool {
        let title = match patch.title.as_deref() {
            Some(raw) => match non_blank(Some(raw)) {
                Some(title) => Some(title),
                None => return false,
            },
            None => None,
        };
        let Some(task) = self.tasks.get_mut(task_id) else {
            return false;
        };

        let before = task.clone();
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = non_blank(description.as_deref());
        }
        if let Some(emoji) = patch.emoji {
            task.emoji = non_blank(emoji.as_deref());
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        let changed = *task != before;
        if changed {
            debug!(task = %task_id, "task updated");
        }
        changed
    }

    /// Append an empty period. Returns the new id, or `None` for a blank name.
    pub fn add_period(
        &mut self,
        name: &str,
        emoji: Option<&str>,
        style: &PeriodsConfig,
    ) -> Option<String> {
        let name = non_blank(Some(name))?;
        let id = Uuid::new_v4().to_string();
        self.periods.push(PeriodSlot {
            id: id.clone(),
            name,
            emoji: non_blank(emoji).unwrap_or_else(|| style.default_emoji.clone()),
            color: style.default_color.clone(),
            task_ids: Vec::new(),
        });
        debug!(period = %id, "period added");
        Some(id)
    }

    /// Find a period by exact id, then by case-insensitive name
    pub fn resolve_period(&self, reference: &str) -> Option<&PeriodSlot> {
        let reference = reference.trim();
        self.period(reference).or_else(|| {
            let wanted = reference.to_lowercase();
            self.periods
                .iter()
                .find(|slot| slot.name.to_lowercase() == wanted)
        })
    }

    /// Find a task by exact id or unique id prefix
    pub fn resolve_task(&self, reference: &str) -> Result<&Task> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if let Some(task) = self.tasks.get(trimmed) {
            return Ok(task);
        }

        let prefix = trimmed.to_ascii_lowercase();
        let matches: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| task.id.to_ascii_lowercase().starts_with(&prefix))
            .collect();
        match matches.len() {
            0 => Err(Error::TaskNotFound(trimmed.to_string())),
            1 => Ok(matches[0]),
            count => Err(Error::AmbiguousTask {
                prefix: trimmed.to_string(),
                count,
            }),
        }
    }

    /// Ids of all periods, used to check uniqueness in tests and on load
    pub fn period_ids(&self) -> HashSet<&str> {
        self.periods.iter().map(|slot| slot.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_periods;

    fn board() -> Board {
        Board::from_periods(default_periods())
    }

    fn add(board: &mut Board, period: &str, title: &str) -> String {
        board
            .add_task(period, TaskDraft::titled(title), Utc::now())
            .expect("task added")
    }

    #[test]
    fn add_task_appends_in_order() {
        let mut board = board();
        let first = add(&mut board, "morning", "Stretch");
        let second = add(&mut board, "morning", "  Coffee  ");

        let slot = board.period("morning").unwrap();
        assert_eq!(slot.task_ids(), &[first.clone(), second.clone()]);
        assert_eq!(board.task(&second).unwrap().title, "Coffee");
        assert_eq!(board.task(&first).unwrap().period, "morning");
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut board = board();
        assert!(board
            .add_task("morning", TaskDraft::titled("   "), Utc::now())
            .is_none());
        assert!(board.period("morning").unwrap().is_empty());
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn add_task_to_unknown_period_is_noop() {
        let mut board = board();
        assert!(board
            .add_task("brunch", TaskDraft::titled("Eggs"), Utc::now())
            .is_none());
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut board = board();
        let id = add(&mut board, "evening", "Walk");

        assert!(board.toggle_complete(&id, Utc::now()));
        let task = board.task(&id).unwrap();
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        assert!(board.toggle_complete(&id, Utc::now()));
        let task = board.task(&id).unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());

        assert!(!board.toggle_complete("missing", Utc::now()));
    }

    #[test]
    fn move_task_relocates_exactly_once() {
        let mut board = board();
        let id = add(&mut board, "morning", "Email");
        add(&mut board, "night", "Read");

        assert!(board.move_task(&id, "night"));
        assert!(!board.period("morning").unwrap().task_ids().contains(&id));
        let night = board.period("night").unwrap();
        assert_eq!(night.task_ids().iter().filter(|t| **t == id).count(), 1);
        assert_eq!(night.task_ids().last(), Some(&id));
        assert_eq!(board.task(&id).unwrap().period, "night");
    }

    #[test]
    fn move_to_missing_period_is_noop() {
        let mut board = board();
        let id = add(&mut board, "morning", "Email");

        assert!(!board.move_task(&id, "ghost"));
        assert!(!board.move_task("ghost-task", "night"));
        assert_eq!(board.period("morning").unwrap().task_ids(), &[id.clone()]);
        assert_eq!(board.task(&id).unwrap().period, "morning");
    }

    #[test]
    fn move_within_same_period_reappends() {
        let mut board = board();
        let a = add(&mut board, "morning", "A");
        let b = add(&mut board, "morning", "B");

        assert!(board.move_task(&a, "morning"));
        assert_eq!(board.period("morning").unwrap().task_ids(), &[b, a]);
    }

    #[test]
    fn delete_only_touches_owning_period() {
        let mut board = board();
        let doomed = add(&mut board, "afternoon", "Lunch");
        add(&mut board, "afternoon", "Nap");
        add(&mut board, "evening", "Cook");

        assert!(board.delete_task(&doomed));
        assert!(board.task(&doomed).is_none());
        assert_eq!(board.period("afternoon").unwrap().len(), 1);
        assert_eq!(board.period("evening").unwrap().len(), 1);
        assert!(!board.delete_task(&doomed));
    }

    #[test]
    fn update_task_edits_fields() {
        let mut board = board();
        let id = board
            .add_task(
                "morning",
                TaskDraft::titled("Run").with_emoji("🔥"),
                Utc::now(),
            )
            .unwrap();

        let patch = TaskPatch {
            title: Some("Run 5k".to_string()),
            emoji: Some(None),
            description: Some(Some("along the river".to_string())),
            ..TaskPatch::default()
        };
        assert!(board.update_task(&id, patch));
        let task = board.task(&id).unwrap();
        assert_eq!(task.title, "Run 5k");
        assert!(task.emoji.is_none());
        assert_eq!(task.description.as_deref(), Some("along the river"));

        let blank = TaskPatch {
            title: Some("  ".to_string()),
            description: Some(None),
            ..TaskPatch::default()
        };
        assert!(!board.update_task(&id, blank));
        assert_eq!(board.task(&id).unwrap().description.as_deref(), Some("along the river"));
    }

    #[test]
    fn add_period_uses_defaults() {
        let mut board = board();
        let style = PeriodsConfig::default();

        assert!(board.add_period("  ", None, &style).is_none());
        let id = board.add_period(" Late Night ", None, &style).unwrap();
        let slot = board.period(&id).unwrap();
        assert_eq!(slot.name, "Late Night");
        assert_eq!(slot.emoji, style.default_emoji);
        assert_eq!(slot.color, style.default_color);
        assert!(slot.is_empty());

        let other = board.add_period("Siesta", Some("😴"), &style).unwrap();
        assert_ne!(id, other);
        assert_eq!(board.period(&other).unwrap().emoji, "😴");
        assert_eq!(board.period_ids().len(), board.periods().len());
    }

    #[test]
    fn from_periods_repairs_invariants() {
        let mut records = default_periods();
        let mut stray = Task {
            id: "dup".to_string(),
            title: "Stray".to_string(),
            description: None,
            emoji: None,
            completed: true,
            created_at: Utc::now(),
            completed_at: None,
            due_date: None,
            period: "night".to_string(),
        };
        records[0].tasks.push(stray.clone());
        stray.title = "Copy".to_string();
        records[1].tasks.push(stray);
        let mut twin = records[2].clone();
        twin.tasks.push(Task {
            id: "twin-task".to_string(),
            title: "Twin".to_string(),
            description: None,
            emoji: None,
            completed: false,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
            due_date: None,
            period: "evening".to_string(),
        });
        records.push(twin);

        let board = Board::from_periods(records);
        assert_eq!(board.periods().len(), 4);
        assert_eq!(board.task_count(), 2);

        let dup = board.task("dup").unwrap();
        assert_eq!(dup.title, "Stray");
        assert_eq!(dup.period, "morning");
        assert!(dup.completed_at.is_some());

        let twin = board.task("twin-task").unwrap();
        assert!(twin.completed_at.is_none());
        assert_eq!(board.period("evening").unwrap().task_ids(), &["twin-task".to_string()]);
    }

    #[test]
    fn to_periods_round_trips() {
        let mut board = board();
        add(&mut board, "morning", "One");
        add(&mut board, "night", "Two");

        let again = Board::from_periods(board.to_periods());
        assert_eq!(again.to_periods(), board.to_periods());
    }

    #[test]
    fn resolve_by_name_and_prefix() {
        let mut board = board();
        let id = add(&mut board, "morning", "One");

        assert_eq!(board.resolve_period("EVENING").unwrap().id, "evening");
        assert_eq!(board.resolve_period("night").unwrap().id, "night");
        assert!(board.resolve_period("brunch").is_none());

        assert_eq!(board.resolve_task(&id[..8]).unwrap().id, id);
        assert!(matches!(
            board.resolve_task("zzzz"),
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            board.resolve_task(" "),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn not_found_reports_the_reference_as_typed() {
        let board = board();
        match board.resolve_task("  XyZ-42 ") {
            Err(Error::TaskNotFound(reference)) => assert_eq!(reference, "XyZ-42"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn period_names_match_case_insensitively_beyond_ascii() {
        let mut board = board();
        let style = PeriodsConfig::default();
        let id = board.add_period("Ñoche", None, &style).unwrap();
        board.add_period("Été", None, &style).unwrap();

        assert_eq!(board.resolve_period("ñoche").unwrap().id, id);
        assert_eq!(board.resolve_period("ÑOCHE").unwrap().id, id);
        assert_eq!(board.resolve_period("été").unwrap().name, "Été");
    }

    #[test]
    fn blank_text_fields_load_as_absent() {
        let raw = r#"[{
            "id": "morning", "name": "Morning", "emoji": "🌅", "color": "bg-yellow-100",
            "tasks": [
                {"id": "a", "title": "Run", "description": "", "emoji": "",
                 "completed": false, "createdAt": "2024-03-01T08:00:00.000Z", "period": "morning"},
                {"id": "b", "title": "Swim", "description": "  ", "emoji": "",
                 "completed": false, "createdAt": "2024-03-01T09:00:00.000Z", "period": "morning"},
                {"id": "c", "title": "Bike", "description": "hills", "emoji": "🔥",
                 "completed": false, "createdAt": "2024-03-01T10:00:00.000Z", "period": "morning"}
            ]
        }]"#;
        let periods: Vec<Period> = serde_json::from_str(raw).expect("blob");
        let board = Board::from_periods(periods);

        let a = board.task("a").unwrap();
        assert!(a.description.is_none());
        assert!(a.emoji.is_none());
        assert!(board.task("b").unwrap().description.is_none());
        assert_eq!(board.task("c").unwrap().description.as_deref(), Some("hills"));

        let ranked = crate::analytics::top_emojis(&board.to_periods(), 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].emoji, "🔥");
        assert_eq!(ranked[0].count, 1);

        let saved = serde_json::to_value(board.to_periods()).unwrap();
        assert!(saved[0]["tasks"][0].get("emoji").is_none());
    }
}
