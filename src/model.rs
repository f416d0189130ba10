//! Domain records: tasks, periods and daily analytics
//!
//! These are the persisted shapes. Field names are camelCase so blobs written
//! by earlier versions of the organizer load unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Emoji used for a new period when none is given
pub const DEFAULT_PERIOD_EMOJI: &str = "📝";

/// Color tag given to user-created periods
pub const DEFAULT_PERIOD_COLOR: &str = "bg-gray-100";

/// Emoji offered by the picker. Input is not restricted to this set.
pub const EMOJI_PALETTE: [&str; 40] = [
    "😊", "😃", "😄", "😁", "😆", "😅", "🤣", "😂", "🙂", "🙃",
    "😉", "😊", "😇", "🥰", "😍", "🤩", "😘", "😗", "😚", "😙",
    "🔥", "⭐", "✨", "🎯", "🚀", "💡", "🎉", "🎊", "🏆", "👍",
    "💪", "🎨", "📚", "💻", "📱", "⏰", "📅", "✅", "🎵", "🎮",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Id of the period whose list holds this task
    pub period: String,
}

impl Task {
    /// Flip completion, stamping or clearing `completed_at` to match
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }

    /// Restore `completed_at` presence to agree with `completed`
    pub(crate) fn normalize_completion(&mut self) {
        if !self.completed {
            self.completed_at = None;
        } else if self.completed_at.is_none() {
            self.completed_at = Some(self.created_at);
        }
    }

    /// Blank description or emoji strings mean "none"
    pub(crate) fn normalize_text(&mut self) {
        self.description = non_blank(self.description.as_deref());
        self.emoji = non_blank(self.emoji.as_deref());
    }
}

/// A period as persisted: metadata plus its tasks in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Period {
    fn seed(id: &str, name: &str, emoji: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            color: color.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }
}

/// The four periods a fresh organizer starts with
pub fn default_periods() -> Vec<Period> {
    vec![
        Period::seed("morning", "Morning", "🌅", "bg-yellow-100"),
        Period::seed("afternoon", "Afternoon", "☀️", "bg-orange-100"),
        Period::seed("evening", "Evening", "🌆", "bg-purple-100"),
        Period::seed("night", "Night", "🌙", "bg-blue-100"),
    ]
}

/// Derived per-day activity record, one per calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAnalytics {
    pub date: NaiveDate,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Period name to tasks created that day, in period order
    #[serde(default)]
    pub period_activity: IndexMap<String, usize>,
    /// Empty when no period had activity that day
    #[serde(default)]
    pub most_active_period: String,
}

/// Input for a new task
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Edits to an existing task. `None` leaves a field as is; for the optional
/// fields, `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub emoji: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.emoji.is_none()
            && self.due_date.is_none()
    }
}

/// Trim `value`; blank input becomes `None`
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
