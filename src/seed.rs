// Built-in fallback dataset
//
// Used when no payload exists yet or the persisted payload fails to parse.

use crate::model::{ChecklistItem, Recurrence, RecurrenceKind, Task, TaskStatus};
use chrono::{DateTime, TimeZone, Utc};

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single()
}

/// A handful of plausible shift tasks, ids fixed so reseeding is stable.
pub fn default_tasks() -> Vec<Task> {
    let base = |id: &str, title: &str| Task {
        id: id.to_string(),
        title: title.to_string(),
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
    };

    let mut whiteboard = base("seed-whiteboard", "Fix the whiteboard");
    whiteboard.start_time = ts(2024, 12, 16, 16, 33);
    whiteboard.due_time = ts(2024, 12, 16, 17, 33);
    whiteboard.created_at = ts(2024, 12, 15, 9, 0);
    whiteboard.tags = vec!["maintenance".to_string()];

    let mut docs = base("seed-docs", "Update documentation");
    docs.description = Some("Refresh the opening checklist binder".to_string());
    docs.start_time = ts(2024, 12, 17, 9, 0);
    docs.due_time = ts(2024, 12, 17, 11, 0);
    docs.created_at = ts(2024, 12, 15, 9, 5);
    docs.tags = vec!["admin".to_string()];

    let mut fryer = base("seed-fryer", "Deep clean fryer");
    fryer.due_time = ts(2024, 12, 18, 22, 0);
    fryer.created_at = ts(2024, 12, 15, 9, 10);
    fryer.tags = vec!["kitchen".to_string(), "cleaning".to_string()];
    fryer.recurrence = Some(Recurrence::new(RecurrenceKind::Weekly, 1));
    fryer.require_photo = true;
    fryer.checklist = vec![
        ChecklistItem {
            id: "seed-fryer-1".to_string(),
            text: "Drain and filter oil".to_string(),
            is_checked: false,
        },
        ChecklistItem {
            id: "seed-fryer-2".to_string(),
            text: "Scrub baskets".to_string(),
            is_checked: false,
        },
    ];

    let mut handwash = base("seed-handwash", "Wash hands station restock");
    handwash.due_time = ts(2024, 12, 16, 17, 34);
    handwash.created_at = ts(2024, 12, 15, 9, 15);
    handwash.set_status(TaskStatus::Done);

    vec![whiteboard, docs, fryer, handwash]
}
