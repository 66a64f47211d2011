//! The exclusion-eligibility engine: Do-Not-Disturb resolution, safe-hours
//! evaluation, and the roster-level aggregation that combines the two.

pub mod dnd;
pub mod safe_hours;
pub mod summary;

pub use dnd::{
    days_since_hire, days_until_new_hire_ends, is_new_hire, DndEntry, DndEntryId, DndReason,
    DndStatus, NEW_HIRE_THRESHOLD_DAYS,
};
pub use safe_hours::{evaluate, SafeHoursConfig, SafeHoursDecision, SafeHoursRefusal};
pub use summary::{
    blocked_employees, summarize, BlockedEmployee, ExclusionBreakdown, ExclusionSummary,
};
