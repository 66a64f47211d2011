//! Administrative ownership of the DND directory.
//!
//! The directory is the single writer for [`DndEntry`] records: entries are
//! added or removed here and never edited in place, which keeps the exclusion
//! aggregator a pure reader.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::campaigns::domain::{mask_name, EmployeeId};
use crate::exclusions::dnd::{DndEntry, DndEntryId, DndReason};

/// Input for adding a directory entry; ids and masked names are assigned by
/// the directory itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDndEntry {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub reason: DndReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub added_by: String,
}

/// Directory mutation failures.
#[derive(Debug, thiserror::Error)]
pub enum DndDirectoryError {
    #[error("dnd entry not found")]
    NotFound,
}

/// Active-entry counts per reason for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DndStats {
    pub total: u32,
    pub leave: u32,
    pub sensitive: u32,
    pub new_hire: u32,
    pub manual: u32,
}

/// In-memory DND directory with sequential entry ids.
#[derive(Debug, Default)]
pub struct DndDirectory {
    entries: Vec<DndEntry>,
    sequence: u64,
}

impl DndDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory from pre-built entries, keeping the id sequence
    /// ahead of the highest seeded `dnd-N` suffix so later adds never mint a
    /// duplicate id. Ids that do not follow the `dnd-N` shape are ignored.
    pub fn with_entries(entries: Vec<DndEntry>) -> Self {
        let sequence = entries
            .iter()
            .filter_map(|entry| entry.id.0.strip_prefix("dnd-"))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { entries, sequence }
    }

    pub fn entries(&self) -> &[DndEntry] {
        &self.entries
    }

    /// Append a new entry, assigning its id and recomputing the masked name
    /// from the supplied clear name.
    pub fn add(&mut self, new_entry: NewDndEntry, now: DateTime<Utc>) -> &DndEntry {
        self.sequence += 1;
        let masked_name = mask_name(&new_entry.employee_name);
        self.entries.push(DndEntry {
            id: DndEntryId(format!("dnd-{}", self.sequence)),
            employee_id: new_entry.employee_id,
            employee_name: new_entry.employee_name,
            masked_name,
            reason: new_entry.reason,
            note: new_entry.note,
            start_date: new_entry.start_date,
            end_date: new_entry.end_date,
            added_by: new_entry.added_by,
            added_at: now,
        });
        self.entries.last().expect("entry just pushed")
    }

    /// Remove an entry by id, returning the removed record.
    pub fn remove(&mut self, id: &DndEntryId) -> Result<DndEntry, DndDirectoryError> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or(DndDirectoryError::NotFound)?;
        Ok(self.entries.remove(position))
    }

    pub fn active(&self, today: NaiveDate) -> Vec<&DndEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_active(today))
            .collect()
    }

    pub fn stats(&self, today: NaiveDate) -> DndStats {
        let mut stats = DndStats::default();
        for entry in self.active(today) {
            stats.total += 1;
            match entry.reason {
                DndReason::Leave => stats.leave += 1,
                DndReason::Sensitive => stats.sensitive += 1,
                DndReason::NewHire => stats.new_hire += 1,
                DndReason::Manual => stats.manual += 1,
            }
        }
        stats
    }
}
