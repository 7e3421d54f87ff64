// View filtering for the task list

use crate::models::Task;
use std::str::FromStr;

/// Selects which tasks a view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    /// Whether a task belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// Message shown when the view has nothing in it
    pub fn empty_message(self) -> &'static str {
        match self {
            Filter::All => "No tasks yet. Add one!",
            Filter::Pending => "No pending tasks!",
            Filter::Completed => "No completed tasks yet!",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Pending => write!(f, "pending"),
            Filter::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(format!("unknown filter: {} (expected all, pending or completed)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskDetails, TaskId};
    use chrono::Utc;

    fn task(completed: bool) -> Task {
        let mut task = Task::new(TaskId(1), TaskDetails::new("t"), Utc::now()).unwrap();
        task.completed = completed;
        task
    }

    #[test]
    fn test_filter_matches() {
        let open = task(false);
        let done = task(true);

        assert!(Filter::All.matches(&open));
        assert!(Filter::All.matches(&done));
        assert!(Filter::Pending.matches(&open));
        assert!(!Filter::Pending.matches(&done));
        assert!(Filter::Completed.matches(&done));
        assert!(!Filter::Completed.matches(&open));
    }

    #[test]
    fn test_filter_display_and_parse() {
        for filter in Filter::ALL {
            assert_eq!(filter.to_string().parse::<Filter>().unwrap(), filter);
        }
        assert_eq!("Done".parse::<Filter>().unwrap(), Filter::Completed);
        assert!("archived".parse::<Filter>().is_err());
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(Filter::All.empty_message(), "No tasks yet. Add one!");
        assert_eq!(Filter::Pending.empty_message(), "No pending tasks!");
        assert_eq!(Filter::Completed.empty_message(), "No completed tasks yet!");
    }
}
