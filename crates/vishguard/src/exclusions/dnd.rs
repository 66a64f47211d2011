//! Do-Not-Disturb resolution: explicit administrative entries plus the
//! automatic new-hire protection window.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::campaigns::domain::EmployeeId;

/// Employees hired fewer than this many whole days ago are automatically
/// protected from simulation contact.
pub const NEW_HIRE_THRESHOLD_DAYS: i64 = 30;

/// Whole days elapsed since the hire date. A hire date in the future yields a
/// negative number; callers treat that as zero tenure.
pub fn days_since_hire(hire_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - hire_date).num_days()
}

/// Strict tenure check: exactly 30 elapsed days is no longer a new hire.
pub fn is_new_hire(hire_date: NaiveDate, today: NaiveDate) -> bool {
    days_since_hire(hire_date, today) < NEW_HIRE_THRESHOLD_DAYS
}

/// Days left in the automatic protection window, floored at zero.
pub fn days_until_new_hire_ends(hire_date: NaiveDate, today: NaiveDate) -> i64 {
    (NEW_HIRE_THRESHOLD_DAYS - days_since_hire(hire_date, today)).max(0)
}

/// Identifier wrapper for DND directory entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DndEntryId(pub String);

/// Why an employee is excluded from simulation contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DndReason {
    Leave,
    Sensitive,
    NewHire,
    Manual,
}

impl DndReason {
    pub const fn label(self) -> &'static str {
        match self {
            DndReason::Leave => "On leave",
            DndReason::Sensitive => "Sensitive situation",
            DndReason::NewHire => "New hire (<30 days)",
            DndReason::Manual => "Manually blocked",
        }
    }
}

/// One exclusion record in the DND directory.
///
/// Entries are created by an administrator or by automatic new-hire detection
/// and are never edited in place: they are removed, or expire naturally once
/// `end_date` passes. An absent `end_date` means the block is indefinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DndEntry {
    pub id: DndEntryId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub masked_name: String,
    pub reason: DndReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

impl DndEntry {
    /// Active iff `start_date <= today <= end_date`, both bounds inclusive;
    /// no end date keeps the entry active for every future day.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        let started = self.start_date <= today;
        let not_ended = self.end_date.map_or(true, |end| end >= today);
        started && not_ended
    }

    /// Days until the entry expires, floored at zero; `None` when indefinite.
    pub fn remaining_days(&self, today: NaiveDate) -> Option<i64> {
        self.end_date.map(|end| (end - today).num_days().max(0))
    }

    /// Human-readable date range for directory listings.
    pub fn duration_label(&self) -> String {
        match self.end_date {
            Some(end) => format!(
                "{} - {}",
                self.start_date.format("%b %-d, %Y"),
                end.format("%b %-d, %Y")
            ),
            None => format!("{} - Indefinite", self.start_date.format("%b %-d, %Y")),
        }
    }
}

/// Outcome of resolving one employee against the DND directory.
#[derive(Debug, Clone, PartialEq)]
pub enum DndStatus<'a> {
    Blocked {
        reason: DndReason,
        /// The explicit directory entry that matched; `None` when the block
        /// was synthesized from the new-hire window.
        entry: Option<&'a DndEntry>,
    },
    Clear,
}

impl DndStatus<'_> {
    pub fn is_blocked(&self) -> bool {
        matches!(self, DndStatus::Blocked { .. })
    }

    pub fn reason(&self) -> Option<DndReason> {
        match self {
            DndStatus::Blocked { reason, .. } => Some(*reason),
            DndStatus::Clear => None,
        }
    }
}

/// Resolve an employee's DND status for `today`.
///
/// Explicit entries take precedence over the automatic new-hire protection so
/// that an administrator's more specific reason wins. Overlapping entries for
/// the same employee are not expected; when they occur the first match in
/// directory order is reported.
pub fn resolve<'a>(
    employee_id: &EmployeeId,
    hire_date: Option<NaiveDate>,
    entries: &'a [DndEntry],
    today: NaiveDate,
) -> DndStatus<'a> {
    if let Some(entry) = entries
        .iter()
        .find(|entry| &entry.employee_id == employee_id && entry.is_active(today))
    {
        return DndStatus::Blocked {
            reason: entry.reason,
            entry: Some(entry),
        };
    }

    if let Some(hire_date) = hire_date {
        if is_new_hire(hire_date, today) {
            return DndStatus::Blocked {
                reason: DndReason::NewHire,
                entry: None,
            };
        }
    }

    DndStatus::Clear
}
