//! Roster acquisition seams: the HR connector trait and CSV upload parsing.

pub mod import;

use crate::campaigns::domain::Employee;
use crate::hierarchy::DepartmentId;

pub use import::{parse_roster, RosterImportError};

/// Read-only HR data source resolving department selections to employees.
///
/// Implementations are external collaborators (HR connectors, fixtures); the
/// core only consumes the returned roster.
pub trait RosterProvider: Send + Sync {
    fn roster_for_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, RosterError>;
}

/// Failure surfaced by an HR connector.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
    #[error("hr connector unavailable: {0}")]
    Unavailable(String),
}
