// Data models for taskdeck

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A unit of work with optional scheduling, assignment, and
/// completion-proof metadata.
///
/// Field names serialize in camelCase so payloads written by the original
/// mobile client load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Redundant with `status`; kept on the wire for payload compatibility.
    /// Every constructor and command keeps it equal to `status == Done`.
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub is_billable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub require_photo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<ChecklistItem>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Set the status and keep the redundant `completed` flag in sync.
    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Done;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

/// One line of a task's completion checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_checked: bool,
}

/// A rule describing how a completed task regenerates its next occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekday indices 0-6 (Sunday-Saturday). Collected by the original UI
    /// for custom cadences but never consumed by the advancer; carried so
    /// payloads round-trip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<u8>,
    /// None means the rule never ends. Not consulted by the advancer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Recurrence {
    pub fn new(kind: RecurrenceKind, interval: u32) -> Self {
        Self {
            kind,
            interval: interval.max(1),
            days_of_week: Vec::new(),
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl std::str::FromStr for RecurrenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrenceKind::Daily),
            "weekly" => Ok(RecurrenceKind::Weekly),
            "monthly" => Ok(RecurrenceKind::Monthly),
            "yearly" => Ok(RecurrenceKind::Yearly),
            "custom" => Ok(RecurrenceKind::Custom),
            other => Err(format!(
                "unknown recurrence '{}' (expected daily, weekly, monthly, yearly, or custom)",
                other
            )),
        }
    }
}

fn default_interval() -> u32 {
    1
}

/// Explicit tag id -> display label lookup table.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    labels: HashMap<String, String>,
}

impl TagCatalog {
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    /// Display label for a tag id. Unknown ids resolve to None.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }
}

impl Default for TagCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for (id, label) in [
            ("kitchen", "Kitchen"),
            ("prep", "Prep"),
            ("cleaning", "Cleaning"),
            ("urgent", "Urgent"),
            ("admin", "Admin"),
            ("maintenance", "Maintenance"),
            ("inventory", "Inventory"),
            ("training", "Training"),
        ] {
            catalog.insert(id, label);
        }
        catalog
    }
}

/// Parse a timestamp from the formats the original client produced.
///
/// Accepts RFC 3339, bare `YYYY-MM-DDTHH:MM:SS` (with or without the `T`),
/// and a plain date (taken as midnight UTC). Anything else is None.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ts| ts.and_utc());
    }
    None
}

/// Deserialize a timestamp field, mapping anything unparseable to None
/// instead of failing the whole record.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}
