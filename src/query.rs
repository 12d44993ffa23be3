// Filter / sort / partition engine over a task snapshot

use crate::model::{Task, TaskStatus, TagCatalog};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

/// Independent filter predicates. All active predicates AND together;
/// within one predicate the selected values OR. An empty selection
/// deactivates that predicate entirely.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Case-insensitive substring over title, description, and resolved
    /// tag labels.
    pub text: Option<String>,
    pub statuses: Vec<TaskStatus>,
    pub tags: Vec<String>,
    pub assignees: Vec<String>,
    pub creators: Vec<String>,
    /// Inclusive day-granularity range on the due timestamp. Tasks without
    /// a due timestamp never match an active range.
    pub due_range: Option<(NaiveDate, NaiveDate)>,
}

impl TaskQuery {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.statuses.is_empty()
            && self.tags.is_empty()
            && self.assignees.is_empty()
            && self.creators.is_empty()
            && self.due_range.is_none()
    }
}

/// Sort keys, identified by the option ids the selection UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DueEarliest,
    DueLatest,
    CreatedNewest,
    CreatedOldest,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due-earliest" => Ok(SortKey::DueEarliest),
            "due-latest" => Ok(SortKey::DueLatest),
            "created-newest" => Ok(SortKey::CreatedNewest),
            "created-oldest" => Ok(SortKey::CreatedOldest),
            other => Err(format!(
                "unknown sort key '{}' (expected due-earliest, due-latest, created-newest, or created-oldest)",
                other
            )),
        }
    }
}

/// The engine's output: disjoint open/done partitions, sort order preserved
/// within each.
#[derive(Debug, Clone, Default)]
pub struct TaskView {
    pub open: Vec<Task>,
    pub done: Vec<Task>,
}

/// Filter, sort, and partition a snapshot. Never mutates the input.
pub fn run(tasks: &[Task], query: &TaskQuery, sort: SortKey, catalog: &TagCatalog) -> TaskView {
    let mut hits = filter(tasks, query, catalog);
    sort_tasks(&mut hits, sort);
    let (done, open): (Vec<Task>, Vec<Task>) = hits.into_iter().partition(Task::is_done);
    TaskView { open, done }
}

/// Apply the query's predicates, returning matching tasks in input order.
pub fn filter(tasks: &[Task], query: &TaskQuery, catalog: &TagCatalog) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches(task, query, catalog))
        .cloned()
        .collect()
}

fn matches(task: &Task, query: &TaskQuery, catalog: &TagCatalog) -> bool {
    matches_text(task, query.text.as_deref(), catalog)
        && matches_selection(&query.statuses, |s| *s == task.status)
        && matches_selection(&query.tags, |t| task.tags.contains(t))
        && matches_selection(&query.assignees, |a| {
            task.assignee_id.as_deref() == Some(a.as_str())
        })
        && matches_selection(&query.creators, |c| {
            task.creator_id.as_deref() == Some(c.as_str())
        })
        && matches_due_range(task, query.due_range)
}

fn matches_text(task: &Task, text: Option<&str>, catalog: &TagCatalog) -> bool {
    let needle = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return true,
    };
    if task.title.to_lowercase().contains(&needle) {
        return true;
    }
    if let Some(description) = &task.description {
        if description.to_lowercase().contains(&needle) {
            return true;
        }
    }
    task.tags.iter().any(|id| {
        catalog
            .label(id)
            .is_some_and(|label| label.to_lowercase().contains(&needle))
    })
}

/// Empty selection = predicate inactive = match everything.
fn matches_selection<T>(selection: &[T], mut hit: impl FnMut(&T) -> bool) -> bool {
    selection.is_empty() || selection.iter().any(|v| hit(v))
}

fn matches_due_range(task: &Task, range: Option<(NaiveDate, NaiveDate)>) -> bool {
    let Some((start, end)) = range else {
        return true;
    };
    // Day granularity: [start 00:00:00, end 23:59:59] inclusive.
    match task.due_time {
        Some(due) => {
            let day = due.date_naive();
            start <= day && day <= end
        }
        None => false,
    }
}

/// Stable in-place sort. A task missing the relevant timestamp sorts after
/// every task that has it, in both directions.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    tasks.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    let (x, y, ascending) = match key {
        SortKey::DueEarliest => (a.due_time, b.due_time, true),
        SortKey::DueLatest => (a.due_time, b.due_time, false),
        SortKey::CreatedOldest => (a.created_at, b.created_at, true),
        SortKey::CreatedNewest => (a.created_at, b.created_at, false),
    };
    compare_optional(x, y, ascending)
}

fn compare_optional(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            if ascending {
                x.cmp(&y)
            } else {
                y.cmp(&x)
            }
        }
    }
}

/// Tasks counting as overdue for the viewing user at `now`: due strictly in
/// the past, not done, not completed, and assigned to that user.
///
/// Pure in `now`; callers re-evaluate with fresh wall-clock time per tick.
pub fn overdue<'a>(tasks: &'a [Task], viewer_id: &str, now: DateTime<Utc>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| {
            task.due_time.is_some_and(|due| due < now)
                && !task.is_done()
                && !task.completed
                && task.assignee_id.as_deref() == Some(viewer_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: None,
            start_time: None,
            due_time: None,
            status: TaskStatus::Open,
            completed: false,
            tags: Vec::new(),
            assignee_id: None,
            creator_id: None,
            created_at: None,
            recurrence: None,
            is_billable: false,
            billable_rate: None,
            billable_duration_minutes: None,
            location: None,
            require_photo: false,
            proof_photo: None,
            checklist: Vec::new(),
        }
    }

    fn sample() -> Vec<Task> {
        let mut a = task("a");
        a.title = "Fix the whiteboard".to_string();
        a.due_time = Some(ts(2024, 1, 3, 17));
        a.created_at = Some(ts(2024, 1, 1, 9));
        a.tags = vec!["maintenance".to_string()];
        a.assignee_id = Some("u-1".to_string());

        let mut b = task("b");
        b.title = "Deep clean fryer".to_string();
        b.description = Some("Kitchen closing duty".to_string());
        b.due_time = Some(ts(2024, 1, 2, 22));
        b.created_at = Some(ts(2024, 1, 2, 9));
        b.tags = vec!["kitchen".to_string(), "cleaning".to_string()];
        b.assignee_id = Some("u-2".to_string());
        b.creator_id = Some("mgr".to_string());

        let mut c = task("c");
        c.title = "Inventory count".to_string();
        c.created_at = Some(ts(2024, 1, 3, 9));
        c.set_status(TaskStatus::Done);

        vec![a, b, c]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let tasks = sample();
        let query = TaskQuery::default();
        assert!(query.is_empty());
        assert_eq!(filter(&tasks, &query, &TagCatalog::default()), tasks);
    }

    #[test]
    fn test_filter_result_is_subset() {
        let tasks = sample();
        let query = TaskQuery {
            text: Some("clean".to_string()),
            ..Default::default()
        };
        let hits = filter(&tasks, &query, &TagCatalog::default());
        assert!(hits.iter().all(|h| tasks.contains(h)));
    }

    #[test]
    fn test_text_matches_resolved_tag_label() {
        let tasks = sample();
        let query = TaskQuery {
            text: Some("KITCHEN".to_string()),
            ..Default::default()
        };
        // "b" matches via description and the Kitchen tag label
        let hits = filter(&tasks, &query, &TagCatalog::default());
        assert_eq!(ids(&hits), vec!["b"]);

        // Without a catalog entry the tag id alone still isn't a label hit,
        // but the description keeps matching
        let hits = filter(&tasks, &query, &TagCatalog::empty());
        assert_eq!(ids(&hits), vec!["b"]);
    }

    #[test]
    fn test_status_and_assignee_filters() {
        let tasks = sample();
        let query = TaskQuery {
            statuses: vec![TaskStatus::Done],
            ..Default::default()
        };
        assert_eq!(ids(&filter(&tasks, &query, &TagCatalog::default())), vec!["c"]);

        let query = TaskQuery {
            assignees: vec!["u-1".to_string(), "u-2".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ids(&filter(&tasks, &query, &TagCatalog::default())),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_creator_filter_skips_tasks_without_creator() {
        let tasks = sample();
        let query = TaskQuery {
            creators: vec!["mgr".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter(&tasks, &query, &TagCatalog::default())), vec!["b"]);
    }

    #[test]
    fn test_due_range_inclusive_and_excludes_missing_due() {
        let tasks = sample();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

        // Exact boundary days are inside the range
        let query = TaskQuery {
            due_range: Some((day(2), day(3))),
            ..Default::default()
        };
        assert_eq!(
            ids(&filter(&tasks, &query, &TagCatalog::default())),
            vec!["a", "b"]
        );

        // Task "c" has no due date and never matches an active range
        let query = TaskQuery {
            due_range: Some((day(1), day(31))),
            ..Default::default()
        };
        assert!(!filter(&tasks, &query, &TagCatalog::default())
            .iter()
            .any(|t| t.id == "c"));
    }

    #[test]
    fn test_sort_missing_due_is_always_last() {
        let mut tasks = sample();
        sort_tasks(&mut tasks, SortKey::DueEarliest);
        assert_eq!(ids(&tasks), vec!["b", "a", "c"]);

        sort_tasks(&mut tasks, SortKey::DueLatest);
        assert_eq!(ids(&tasks), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = sample();
        sort_tasks(&mut once, SortKey::CreatedNewest);
        let mut twice = once.clone();
        sort_tasks(&mut twice, SortKey::CreatedNewest);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_run_partitions_preserve_order() {
        let tasks = sample();
        let view = run(
            &tasks,
            &TaskQuery::default(),
            SortKey::CreatedOldest,
            &TagCatalog::default(),
        );
        assert_eq!(ids(&view.open), vec!["a", "b"]);
        assert_eq!(ids(&view.done), vec!["c"]);
    }

    #[test]
    fn test_overdue_requires_due_status_and_assignee() {
        let now = ts(2024, 1, 5, 12);
        let mut tasks = sample();

        // "a" and "b" are past due; only the viewer's own task counts
        assert_eq!(
            overdue(&tasks, "u-1", now)
                .iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>(),
            vec!["a"]
        );

        // Reassigning removes it from the viewer's overdue set
        tasks[0].assignee_id = Some("u-9".to_string());
        assert!(overdue(&tasks, "u-1", now).is_empty());
    }

    #[test]
    fn test_overdue_ignores_tasks_without_due() {
        let now = ts(2024, 1, 5, 12);
        let mut t = task("x");
        t.assignee_id = Some("u-1".to_string());
        assert!(overdue(&[t], "u-1", now).is_empty());
    }

    #[test]
    fn test_overdue_excludes_done_and_future() {
        let now = ts(2024, 1, 5, 12);
        let mut done = task("d");
        done.due_time = Some(ts(2024, 1, 1, 9));
        done.assignee_id = Some("u-1".to_string());
        done.set_status(TaskStatus::Done);

        let mut future = task("f");
        future.due_time = Some(ts(2024, 2, 1, 9));
        future.assignee_id = Some("u-1".to_string());

        assert!(overdue(&[done, future], "u-1", now).is_empty());
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("due-earliest".parse::<SortKey>().unwrap(), SortKey::DueEarliest);
        assert_eq!("created-newest".parse::<SortKey>().unwrap(), SortKey::CreatedNewest);
        assert!("priority".parse::<SortKey>().is_err());
    }
}
