// Plain-text rendering of tasks and stats for the terminal

use crate::filter::Filter;
use crate::kv::KeyValueStore;
use crate::models::{Priority, Stats, Task};
use crate::store::TaskStore;
use chrono::NaiveDate;
use colored::Colorize;

pub const PROGRESS_WIDTH: usize = 20;

/// Short due-date label, e.g. "Jan 5"
pub fn format_due(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

fn priority_marker(priority: Priority, color: bool) -> String {
    let marker = match priority {
        Priority::Low => "!",
        Priority::Medium => "!!",
        Priority::High => "!!!",
    };
    let padded = format!("{:<3}", marker);
    if !color {
        return padded;
    }
    match priority {
        Priority::Low => padded.green().to_string(),
        Priority::Medium => padded.yellow().to_string(),
        Priority::High => padded.red().bold().to_string(),
    }
}

/// One line per task: id, checkbox, priority, text, optional due date
pub fn task_line(task: &Task, color: bool) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };

    let text = if color && task.completed {
        task.text.strikethrough().dimmed().to_string()
    } else {
        task.text.clone()
    };

    let mut line = format!(
        "{:>13} {} {} {}",
        task.id.to_string(),
        checkbox,
        priority_marker(task.priority, color),
        text
    );

    if let Some(due) = task.due_date {
        let label = format!("({})", format_due(due));
        line.push(' ');
        if color {
            line.push_str(&label.cyan().to_string());
        } else {
            line.push_str(&label);
        }
    }

    line
}

/// Detailed, multi-line view of a single task
pub fn task_details(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("id:        {}\n", task.id));
    out.push_str(&format!("text:      {}\n", task.text));
    out.push_str(&format!("completed: {}\n", task.completed));
    out.push_str(&format!("priority:  {}\n", task.priority));
    out.push_str(&format!("category:  {}\n", task.category));
    if let Some(due) = task.due_date {
        out.push_str(&format!("due:       {} ({})\n", due, format_due(due)));
    }
    if let Some(notes) = &task.notes {
        out.push_str(&format!("notes:     {}\n", notes));
    }
    out.push_str(&format!("created:   {}\n", task.created_at.format("%Y-%m-%d %H:%M")));
    out
}

/// Lines for the filtered view, or the filter's empty message
pub fn list<S: KeyValueStore>(store: &TaskStore<S>, filter: Filter, color: bool) -> Vec<String> {
    let lines: Vec<String> = store.filtered_view(filter).map(|t| task_line(t, color)).collect();
    if lines.is_empty() {
        return vec![filter.empty_message().to_string()];
    }
    lines
}

/// "1 task, 0 completed" / "3 tasks, 2 completed"
pub fn stats_line(stats: &Stats) -> String {
    let noun = if stats.total == 1 { "task" } else { "tasks" };
    format!("{} {}, {} completed", stats.total, noun, stats.completed)
}

/// "[##########..........] 50%"
pub fn progress_bar(stats: &Stats, width: usize) -> String {
    let filled = width * stats.percentage as usize / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        stats.percentage
    )
}

/// Printed when the first task gets completed
pub fn celebration(color: bool) -> String {
    let msg = "*** First task done! Keep going! ***";
    if color {
        msg.bright_magenta().bold().to_string()
    } else {
        msg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::models::{TaskDetails, TaskId};
    use chrono::Utc;

    fn task(text: &str) -> Task {
        Task::new(TaskId(1_700_000_000_000), TaskDetails::new(text), Utc::now()).unwrap()
    }

    #[test]
    fn test_format_due() {
        assert_eq!(format_due(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()), "Jan 5");
        assert_eq!(format_due(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()), "Dec 25");
    }

    #[test]
    fn test_task_line_plain() {
        let mut t = task("Buy milk");
        assert_eq!(task_line(&t, false), "1700000000000 [ ] !!  Buy milk");

        t.completed = true;
        t.due_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(task_line(&t, false), "1700000000000 [x] !!  Buy milk (Jan 5)");
    }

    #[test]
    fn test_task_details_plain() {
        let mut t = task("Buy milk");
        t.notes = Some("2 liters".to_string());
        let out = task_details(&t);
        assert!(out.contains("text:      Buy milk"));
        assert!(out.contains("priority:  medium"));
        assert!(out.contains("notes:     2 liters"));
        assert!(!out.contains("due:"));
    }

    #[test]
    fn test_list_empty_messages() {
        let mut store = TaskStore::open(MemoryStore::new()).unwrap();
        assert_eq!(list(&store, Filter::All, false), vec!["No tasks yet. Add one!"]);

        store.add("open").unwrap();
        assert_eq!(list(&store, Filter::Completed, false), vec!["No completed tasks yet!"]);
        assert_eq!(list(&store, Filter::Pending, false).len(), 1);
    }

    #[test]
    fn test_stats_line() {
        assert_eq!(stats_line(&Stats::from_counts(1, 0)), "1 task, 0 completed");
        assert_eq!(stats_line(&Stats::from_counts(3, 2)), "3 tasks, 2 completed");
        assert_eq!(stats_line(&Stats::from_counts(0, 0)), "0 tasks, 0 completed");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(&Stats::from_counts(2, 1), 10), "[#####.....] 50%");
        assert_eq!(progress_bar(&Stats::from_counts(0, 0), 4), "[....] 0%");
        assert_eq!(progress_bar(&Stats::from_counts(1, 1), 4), "[####] 100%");
    }
}
