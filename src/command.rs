// Explicit task state transitions
//
// Completion is a value-returning command rather than an in-place toggle:
// the caller receives the updated original plus the optional recurrence
// sibling and applies both atomically (typically via Store::complete).

use crate::model::{Task, TaskStatus};
use crate::recurrence::next_occurrence;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Result of completing a task.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub updated: Task,
    /// Next occurrence of a recurring task, ready to insert alongside the
    /// update. None for non-recurring or already-done tasks.
    pub spawned: Option<Task>,
}

/// Build a fresh open task with a generated timestamp-ordered id.
pub fn new_task(title: impl Into<String>, now: DateTime<Utc>) -> Task {
    Task {
        id: Uuid::now_v7().to_string(),
        title: title.into(),
        description: None,
        start_time: None,
        due_time: None,
        status: TaskStatus::Open,
        completed: false,
        tags: Vec::new(),
        assignee_id: None,
        creator_id: None,
        created_at: Some(now),
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

/// Mark a task done. An open task carrying a recurrence spawns exactly one
/// sibling with advanced start/due dates; completing an already-done task
/// never re-spawns.
pub fn complete_task(task: &Task, now: DateTime<Utc>) -> CompletionOutcome {
    let was_open = !task.is_done();
    let mut updated = task.clone();
    updated.set_status(TaskStatus::Done);

    let spawned = if was_open {
        task.recurrence.as_ref().map(|rule| {
            let mut next = task.clone();
            next.id = Uuid::now_v7().to_string();
            next.set_status(TaskStatus::Open);
            next.created_at = Some(now);
            next.start_time = task.start_time.map(|ts| next_occurrence(ts, rule));
            next.due_time = task.due_time.map(|ts| next_occurrence(ts, rule));
            // Completion evidence belongs to the finished occurrence
            next.proof_photo = None;
            for item in &mut next.checklist {
                item.is_checked = false;
            }
            next
        })
    } else {
        None
    };

    CompletionOutcome { updated, spawned }
}

/// Flip a done task back to open, keeping its dates.
pub fn reopen_task(task: &Task) -> Task {
    let mut updated = task.clone();
    updated.set_status(TaskStatus::Open);
    updated
}
