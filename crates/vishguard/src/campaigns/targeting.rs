//! Campaign target building: department selection to final recipient roster.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exclusions::dnd::{self, DndEntry, DndStatus};
use crate::exclusions::safe_hours::{self, SafeHoursConfig};
use crate::exclusions::summary::{self, ExclusionSummary};
use crate::hierarchy::{DepartmentId, DepartmentIndex, DepartmentNode};
use crate::roster::{RosterError, RosterProvider};

use super::domain::{
    Campaign, CampaignId, CampaignMetrics, CampaignStatus, DepartmentBreakdown, Employee,
    EmployeeId,
};

/// Operator input for launching a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub department_ids: Vec<DepartmentId>,
    pub compliance_confirmed: bool,
}

/// Launch precondition failures, one variant per condition so the operator
/// sees exactly what is missing.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("campaign name must not be empty")]
    NameMissing,
    #[error("select at least one department")]
    NoDepartmentsSelected,
    #[error("compliance confirmation is required")]
    ComplianceNotConfirmed,
    #[error("no eligible recipients remain after exclusions")]
    NoEligibleRecipients,
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Exclusion dry-run for a department selection, shown before launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExclusionPreview {
    pub targeted: u32,
    pub eligible: u32,
    pub summary: ExclusionSummary,
}

/// A successfully built campaign plus the exclusion accounting that shaped it.
#[derive(Debug, Clone)]
pub struct LaunchOutcome {
    pub campaign: Campaign,
    pub exclusions: ExclusionSummary,
}

/// Drop selected parents whose direct children are also selected, so the same
/// employees are never enumerated twice by the HR connector.
fn resolve_target_departments(
    department_ids: &[DepartmentId],
    index: &DepartmentIndex<'_>,
) -> Vec<DepartmentId> {
    let selected: HashSet<&DepartmentId> = department_ids.iter().collect();
    department_ids
        .iter()
        .filter(|id| {
            let Some(node) = index.get(id) else {
                return true;
            };
            !node
                .children
                .iter()
                .any(|child| selected.contains(&child.id))
        })
        .cloned()
        .collect()
}

fn resolve_roster<P: RosterProvider>(
    department_ids: &[DepartmentId],
    tree: &[DepartmentNode],
    provider: &P,
) -> Result<Vec<Employee>, RosterError> {
    let index = DepartmentIndex::build(tree);
    let targets = resolve_target_departments(department_ids, &index);
    provider.roster_for_departments(&targets)
}

fn safe_hours_blocked_ids(
    employees: &[Employee],
    config: &SafeHoursConfig,
    now: DateTime<Utc>,
) -> HashSet<EmployeeId> {
    employees
        .iter()
        .filter(|_employee| {
            // Per-employee timezone overrides are deliberately not consulted
            // yet; the organization default governs every evaluation.
            !safe_hours::evaluate(config, now, None).allowed
        })
        .map(|employee| employee.id.clone())
        .collect()
}

/// Compute the exclusion accounting for a selection without launching.
pub fn preview<P: RosterProvider>(
    department_ids: &[DepartmentId],
    tree: &[DepartmentNode],
    provider: &P,
    entries: &[DndEntry],
    config: &SafeHoursConfig,
    now: DateTime<Utc>,
) -> Result<ExclusionPreview, RosterError> {
    let roster = resolve_roster(department_ids, tree, provider)?;
    let blocked = safe_hours_blocked_ids(&roster, config, now);
    let summary = summary::summarize(&roster, entries, &blocked, now.date_naive());

    Ok(ExclusionPreview {
        targeted: roster.len() as u32,
        eligible: roster.len() as u32 - summary.total_excluded,
        summary,
    })
}

/// Build a launch-ready campaign snapshot from a validated request.
///
/// Precondition checks run in a fixed order (name, departments, compliance,
/// eligible recipients) and each failure names its own condition; nothing is
/// committed on failure. On success the recipient roster, department
/// breakdown, and metrics are frozen into the returned draft campaign.
pub fn build<P: RosterProvider>(
    request: &LaunchRequest,
    tree: &[DepartmentNode],
    provider: &P,
    entries: &[DndEntry],
    config: &SafeHoursConfig,
    now: DateTime<Utc>,
) -> Result<LaunchOutcome, LaunchError> {
    if request.name.trim().is_empty() {
        return Err(LaunchError::NameMissing);
    }
    if request.department_ids.is_empty() {
        return Err(LaunchError::NoDepartmentsSelected);
    }
    if !request.compliance_confirmed {
        return Err(LaunchError::ComplianceNotConfirmed);
    }

    let roster = resolve_roster(&request.department_ids, tree, provider)?;
    let blocked_by_safe_hours = safe_hours_blocked_ids(&roster, config, now);
    let today = now.date_naive();
    let exclusions = summary::summarize(&roster, entries, &blocked_by_safe_hours, today);

    let recipients: Vec<Employee> = roster
        .into_iter()
        .filter(|employee| {
            let status = dnd::resolve(&employee.id, employee.hire_date, entries, today);
            !matches!(status, DndStatus::Blocked { .. })
                && !blocked_by_safe_hours.contains(&employee.id)
        })
        .collect();

    if recipients.is_empty() {
        return Err(LaunchError::NoEligibleRecipients);
    }

    let departments = DepartmentBreakdown::from_employees(&recipients);
    let metrics = CampaignMetrics::from_employees(&recipients);

    let campaign = Campaign {
        // The service layer assigns the real identifier on launch.
        id: CampaignId("pending".to_string()),
        name: request.name.trim().to_string(),
        description: request.description.clone(),
        created_at: now,
        started_at: None,
        completed_at: None,
        status: CampaignStatus::Draft,
        employees: recipients,
        departments,
        metrics,
    };

    Ok(LaunchOutcome {
        campaign,
        exclusions,
    })
}
