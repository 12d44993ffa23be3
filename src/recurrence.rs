// Next-occurrence computation for recurring tasks

use crate::model::{Recurrence, RecurrenceKind};
use chrono::{DateTime, Duration, Months, Utc};

/// Advance a timestamp by one period of the recurrence rule.
///
/// Monthly and yearly steps use calendar arithmetic: chrono clamps to the
/// last valid day of the target month, so 2024-01-31 plus one month lands on
/// 2024-02-29. `custom` falls back to a plain weekly step; `days_of_week`
/// is not consulted (unfinished in the original, carried as-is).
pub fn next_occurrence(ts: DateTime<Utc>, rule: &Recurrence) -> DateTime<Utc> {
    let interval = rule.interval.max(1);
    match rule.kind {
        RecurrenceKind::Daily => ts + Duration::days(interval as i64),
        RecurrenceKind::Weekly | RecurrenceKind::Custom => {
            ts + Duration::days(7 * interval as i64)
        }
        RecurrenceKind::Monthly => ts.checked_add_months(Months::new(interval)).unwrap_or(ts),
        RecurrenceKind::Yearly => ts
            .checked_add_months(Months::new(interval.saturating_mul(12)))
            .unwrap_or(ts),
    }
}
