//! Population-level exclusion accounting over a candidate roster.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::campaigns::domain::{Employee, EmployeeId};

use super::dnd::{self, DndEntry, DndReason, DndStatus};

/// Counters per exclusion reason. The four DND reasons and safe-hours are
/// mutually exclusive: an employee blocked by DND is never also counted under
/// safe hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionBreakdown {
    pub leave: u32,
    pub sensitive: u32,
    pub new_hire: u32,
    pub manual: u32,
    pub safe_hours: u32,
}

/// Aggregate exclusion counts for a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSummary {
    pub total_excluded: u32,
    pub dnd_count: u32,
    pub safe_hours_count: u32,
    pub by_reason: ExclusionBreakdown,
}

/// Tally exclusions across `employees`.
///
/// Safe-hours membership is supplied pre-computed (`safe_hours_blocked_ids`)
/// rather than re-evaluated here, so one wall-clock reading covers the whole
/// roster. DND takes total precedence over safe hours even when both
/// conditions hold for the same employee.
pub fn summarize(
    employees: &[Employee],
    entries: &[DndEntry],
    safe_hours_blocked_ids: &HashSet<EmployeeId>,
    today: NaiveDate,
) -> ExclusionSummary {
    let mut summary = ExclusionSummary::default();

    for employee in employees {
        let status = dnd::resolve(&employee.id, employee.hire_date, entries, today);
        match status {
            DndStatus::Blocked { reason, .. } => {
                summary.dnd_count += 1;
                match reason {
                    DndReason::Leave => summary.by_reason.leave += 1,
                    DndReason::Sensitive => summary.by_reason.sensitive += 1,
                    DndReason::NewHire => summary.by_reason.new_hire += 1,
                    DndReason::Manual => summary.by_reason.manual += 1,
                }
            }
            DndStatus::Clear => {
                if safe_hours_blocked_ids.contains(&employee.id) {
                    summary.safe_hours_count += 1;
                    summary.by_reason.safe_hours += 1;
                }
            }
        }
    }

    summary.total_excluded = summary.dnd_count + summary.safe_hours_count;
    summary
}

/// One excluded employee with the operator-facing reason strings.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedEmployee<'a> {
    pub employee: &'a Employee,
    pub reasons: Vec<String>,
}

/// List every employee that would be dropped from a launch, with reasons.
pub fn blocked_employees<'a>(
    employees: &'a [Employee],
    entries: &[DndEntry],
    safe_hours_blocked_ids: &HashSet<EmployeeId>,
    today: NaiveDate,
) -> Vec<BlockedEmployee<'a>> {
    employees
        .iter()
        .filter_map(|employee| {
            let mut reasons = Vec::new();
            if let DndStatus::Blocked { reason, .. } =
                dnd::resolve(&employee.id, employee.hire_date, entries, today)
            {
                reasons.push(reason.label().to_string());
            }
            if safe_hours_blocked_ids.contains(&employee.id) {
                reasons.push("Outside safe hours".to_string());
            }

            if reasons.is_empty() {
                None
            } else {
                Some(BlockedEmployee { employee, reasons })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusions::dnd::DndEntryId;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn employee(id: &str, hire_date: Option<NaiveDate>) -> Employee {
        let mut employee = Employee::new(
            EmployeeId(id.to_string()),
            "John Smith",
            "+15550000001",
            "john.smith@example.com",
            "Engineering",
        );
        employee.hire_date = hire_date;
        employee
    }

    fn entry(employee: &str, reason: DndReason) -> DndEntry {
        DndEntry {
            id: DndEntryId(format!("dnd-{employee}")),
            employee_id: EmployeeId(employee.to_string()),
            employee_name: "John Smith".to_string(),
            masked_name: "J*** S***".to_string(),
            reason,
            note: None,
            start_date: date(2024, 12, 1),
            end_date: None,
            added_by: "HR Admin".to_string(),
            added_at: Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn counts_split_by_reason_and_total_matches() {
        let today = date(2025, 1, 10);
        let veteran_hire = Some(date(2022, 5, 1));
        let employees: Vec<Employee> = (1..=10)
            .map(|n| employee(&format!("emp-{n}"), veteran_hire))
            .collect();
        let entries = vec![entry("emp-1", DndReason::Leave), entry("emp-2", DndReason::Manual)];

        let safe_hours_blocked: HashSet<EmployeeId> = ["emp-3", "emp-4", "emp-5"]
            .iter()
            .map(|id| EmployeeId(id.to_string()))
            .collect();

        let summary = summarize(&employees, &entries, &safe_hours_blocked, today);
        assert_eq!(summary.dnd_count, 2);
        assert_eq!(summary.safe_hours_count, 3);
        assert_eq!(summary.total_excluded, 5);
        assert_eq!(summary.by_reason.leave, 1);
        assert_eq!(summary.by_reason.manual, 1);
        assert_eq!(summary.by_reason.safe_hours, 3);
        assert_eq!(
            summary.dnd_count + summary.safe_hours_count,
            summary.total_excluded
        );
    }

    #[test]
    fn dnd_block_suppresses_safe_hours_count_for_same_employee() {
        let today = date(2025, 1, 10);
        let employees = vec![employee("emp-1", None)];
        let entries = vec![entry("emp-1", DndReason::Sensitive)];
        let safe_hours_blocked: HashSet<EmployeeId> =
            [EmployeeId("emp-1".to_string())].into_iter().collect();

        let summary = summarize(&employees, &entries, &safe_hours_blocked, today);
        assert_eq!(summary.dnd_count, 1);
        assert_eq!(summary.safe_hours_count, 0);
        assert_eq!(summary.by_reason.safe_hours, 0);
        assert_eq!(summary.total_excluded, 1);
    }

    #[test]
    fn new_hires_are_counted_without_explicit_entries() {
        let today = date(2025, 1, 10);
        let employees = vec![
            employee("emp-1", Some(date(2025, 1, 1))),
            employee("emp-2", Some(date(2023, 1, 1))),
        ];

        let summary = summarize(&employees, &[], &HashSet::new(), today);
        assert_eq!(summary.by_reason.new_hire, 1);
        assert_eq!(summary.total_excluded, 1);
    }

    #[test]
    fn blocked_list_carries_both_reason_strings() {
        let today = date(2025, 1, 10);
        let employees = vec![employee("emp-1", Some(date(2025, 1, 5)))];
        let safe_hours_blocked: HashSet<EmployeeId> =
            [EmployeeId("emp-1".to_string())].into_iter().collect();

        let blocked = blocked_employees(&employees, &[], &safe_hours_blocked, today);
        assert_eq!(blocked.len(), 1);
        assert_eq!(
            blocked[0].reasons,
            vec!["New hire (<30 days)".to_string(), "Outside safe hours".to_string()]
        );
    }

    #[test]
    fn clear_roster_yields_empty_summary() {
        let employees = vec![employee("emp-1", Some(date(2020, 1, 1)))];
        let summary = summarize(&employees, &[], &HashSet::new(), date(2025, 1, 10));
        assert_eq!(summary, ExclusionSummary::default());
    }
}
