// taskdeck - task query engine and local snapshot store

pub mod command;
pub mod model;
pub mod query;
pub mod recurrence;
pub mod seed;
pub mod store;

// Re-export main types for convenience
pub use command::{complete_task, new_task, reopen_task, CompletionOutcome};
pub use model::{ChecklistItem, Recurrence, RecurrenceKind, TagCatalog, Task, TaskStatus};
pub use query::{filter, overdue, run, sort_tasks, SortKey, TaskQuery, TaskView};
pub use recurrence::next_occurrence;
pub use store::Store;
