// Data models for the task list

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category assigned to new tasks when none is given
pub const DEFAULT_CATEGORY: &str = "work";

/// Unique task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {} (expected low, medium or high)", other)),
        }
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from validated details. Returns None if the text is blank.
    pub fn new(id: TaskId, details: TaskDetails, created_at: DateTime<Utc>) -> Option<Self> {
        let details = details.normalized()?;
        Some(Self {
            id,
            text: details.text,
            completed: false,
            priority: details.priority,
            category: details.category,
            due_date: details.due_date,
            notes: details.notes,
            created_at,
        })
    }

    /// Replace the editable fields, leaving id, completion and creation time alone
    pub(crate) fn apply(&mut self, details: TaskDetails) {
        self.text = details.text;
        self.priority = details.priority;
        self.category = details.category;
        self.due_date = details.due_date;
        self.notes = details.notes;
    }

    /// The editable fields of this task, e.g. to prefill an editor
    pub fn details(&self) -> TaskDetails {
        TaskDetails {
            text: self.text.clone(),
            due_date: self.due_date,
            priority: self.priority,
            category: self.category.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Editable task fields, used both for new tasks and edits
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetails {
    pub text: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub category: String,
    pub notes: Option<String>,
}

impl TaskDetails {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            due_date: None,
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            notes: None,
        }
    }

    /// Prefill details from whatever is in the input box.
    ///
    /// Returns None when the input is blank; callers should ask the user to
    /// enter a task first.
    pub fn draft(input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self::new(text))
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Trim text, category and notes. None if the text is blank.
    pub(crate) fn normalized(self) -> Option<Self> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };

        let notes = self.notes.filter(|n| !n.trim().is_empty());

        Some(Self {
            text,
            due_date: self.due_date,
            priority: self.priority,
            category,
            notes,
        })
    }
}

/// Summary counts over the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

impl Stats {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            // round half up, same as Math.round for non-negative values
            ((completed * 200 + total) / (total * 2)).min(100) as u8
        };
        Self {
            total,
            completed,
            percentage,
        }
    }

    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Older records wrote "" for a missing due date or notes
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::new(
            TaskId(1000),
            TaskDetails::new("Buy milk"),
            "2024-01-05T10:00:00Z".parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::default()).unwrap(), "\"medium\"");
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_new_defaults() {
        let task = sample_task();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(task.due_date.is_none());
        assert!(task.notes.is_none());
    }

    #[test]
    fn test_task_new_rejects_blank_text() {
        let now = Utc::now();
        assert!(Task::new(TaskId(1), TaskDetails::new(""), now).is_none());
        assert!(Task::new(TaskId(1), TaskDetails::new("   "), now).is_none());
    }

    #[test]
    fn test_task_field_names() {
        let details = sample_task()
            .details()
            .with_due_date(NaiveDate::from_ymd_opt(2024, 1, 5))
            .with_notes(Some("bring bags".to_string()));
        let task = Task::new(TaskId(7), details, Utc::now()).unwrap();

        let json = serde_json::to_value(&task).unwrap();
        let obj = json.as_object().unwrap();
        for field in ["id", "text", "completed", "priority", "category", "dueDate", "notes", "createdAt"] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(obj["id"], 7);
        assert_eq!(obj["dueDate"], "2024-01-05");
    }

    #[test]
    fn test_task_reads_legacy_empty_strings() {
        let json = r#"{"id":1704448800000,"text":"Old","completed":true,"priority":"high","category":"personal","dueDate":"","notes":"","createdAt":"2024-01-05T10:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId(1_704_448_800_000));
        assert!(task.completed);
        assert_eq!(task.priority, Priority::High);
        assert!(task.due_date.is_none());
        assert!(task.notes.is_none());
    }

    #[test]
    fn test_task_rejects_bad_due_date() {
        let json = r#"{"id":1,"text":"x","completed":false,"dueDate":"tomorrow","createdAt":"2024-01-05T10:00:00Z"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_details_normalized() {
        let details = TaskDetails::new("  Call mom  ")
            .with_category("  ")
            .with_notes(Some("   ".to_string()))
            .normalized()
            .unwrap();
        assert_eq!(details.text, "Call mom");
        assert_eq!(details.category, DEFAULT_CATEGORY);
        assert!(details.notes.is_none());
    }

    #[test]
    fn test_draft() {
        assert!(TaskDetails::draft("  ").is_none());
        let draft = TaskDetails::draft(" Pay rent ").unwrap();
        assert_eq!(draft.text, "Pay rent");
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_stats_percentage() {
        assert_eq!(Stats::from_counts(0, 0).percentage, 0);
        assert_eq!(Stats::from_counts(2, 1).percentage, 50);
        assert_eq!(Stats::from_counts(3, 1).percentage, 33);
        assert_eq!(Stats::from_counts(3, 2).percentage, 67);
        assert_eq!(Stats::from_counts(8, 1).percentage, 13); // 12.5 rounds up
        assert_eq!(Stats::from_counts(4, 4).percentage, 100);
        assert_eq!(Stats::from_counts(4, 1).pending(), 3);
        assert_eq!(Stats::from_counts(2, 5).pending(), 0);
        assert_eq!(Stats::from_counts(2, 5).percentage, 100);
    }
}
