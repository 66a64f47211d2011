use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees sourced from the HR connector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for launched campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

/// Mask a display name so dashboards never render the full identity.
///
/// Each whitespace-separated token is reduced to its first character plus a
/// fixed `***` suffix: `"John Smith"` becomes `"J*** S***"`. The transform is
/// deterministic and idempotent over the same input.
pub fn mask_name(name: &str) -> String {
    name.split_whitespace()
        .map(|token| {
            let mut masked = String::new();
            if let Some(first) = token.chars().next() {
                masked.push(first);
            }
            masked.push_str("***");
            masked
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-employee safe-hours override window.
///
/// Declared by the HR payload but not yet consumed by the safe-hours
/// evaluator; kept on the model so the override can be wired in once the
/// product decision lands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafeHoursOverride {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// One member of the campaign target roster.
///
/// `masked_name` is always derived from `name` via [`mask_name`]; use
/// [`Employee::new`] or [`Employee::rename`] so the two never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub masked_name: String,
    pub phone: String,
    pub email: String,
    pub department: String,
    pub status: EmployeeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_status: Option<TrainingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_hours_override: Option<SafeHoursOverride>,
}

impl Employee {
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let masked_name = mask_name(&name);
        Self {
            id,
            name,
            masked_name,
            phone: phone.into(),
            email: email.into(),
            department: department.into(),
            status: EmployeeStatus::Pending,
            result: None,
            training_status: None,
            hire_date: None,
            timezone: None,
            safe_hours_override: None,
        }
    }

    pub fn with_hire_date(mut self, hire_date: NaiveDate) -> Self {
        self.hire_date = Some(hire_date);
        self
    }

    /// Update the clear name and recompute the masked rendering.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.masked_name = mask_name(&self.name);
    }
}

/// Simulation progress for a single employee within a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Pending,
    InProgress,
    Completed,
}

impl EmployeeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EmployeeStatus::Pending => "pending",
            EmployeeStatus::InProgress => "in_progress",
            EmployeeStatus::Completed => "completed",
        }
    }
}

/// Outcome of a completed simulation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Passed,
    Failed,
}

/// Remediation training progress for employees who failed a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    NotAssigned,
    Assigned,
    InProgress,
    Completed,
}

/// Per-department slice of a campaign snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentBreakdown {
    pub name: String,
    pub employee_count: u32,
    pub pass_count: u32,
    pub fail_count: u32,
    pub in_progress_count: u32,
    pub pass_rate: u32,
    pub fail_rate: u32,
}

impl DepartmentBreakdown {
    /// Group a roster by department name and derive per-department counters.
    pub fn from_employees(employees: &[Employee]) -> Vec<Self> {
        let mut order: Vec<&str> = Vec::new();
        for employee in employees {
            if !order.contains(&employee.department.as_str()) {
                order.push(&employee.department);
            }
        }

        order
            .into_iter()
            .map(|department| {
                let members: Vec<&Employee> = employees
                    .iter()
                    .filter(|employee| employee.department == department)
                    .collect();
                let completed: Vec<&&Employee> = members
                    .iter()
                    .filter(|employee| employee.status == EmployeeStatus::Completed)
                    .collect();
                let passed = completed
                    .iter()
                    .filter(|employee| employee.result == Some(TestResult::Passed))
                    .count() as u32;
                let failed = completed
                    .iter()
                    .filter(|employee| employee.result == Some(TestResult::Failed))
                    .count() as u32;
                let in_progress = members
                    .iter()
                    .filter(|employee| employee.status == EmployeeStatus::InProgress)
                    .count() as u32;

                DepartmentBreakdown {
                    name: department.to_string(),
                    employee_count: members.len() as u32,
                    pass_count: passed,
                    fail_count: failed,
                    in_progress_count: in_progress,
                    pass_rate: percent(passed, completed.len() as u32),
                    fail_rate: percent(failed, completed.len() as u32),
                }
            })
            .collect()
    }
}

/// Aggregate counters frozen into a campaign at launch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub total_targeted: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub passed: u32,
    pub failed: u32,
    pub pass_rate: u32,
    pub fail_rate: u32,
}

impl CampaignMetrics {
    pub fn from_employees(employees: &[Employee]) -> Self {
        let completed: Vec<&Employee> = employees
            .iter()
            .filter(|employee| employee.status == EmployeeStatus::Completed)
            .collect();
        let passed = completed
            .iter()
            .filter(|employee| employee.result == Some(TestResult::Passed))
            .count() as u32;
        let failed = completed
            .iter()
            .filter(|employee| employee.result == Some(TestResult::Failed))
            .count() as u32;

        Self {
            total_targeted: employees.len() as u32,
            in_progress: employees
                .iter()
                .filter(|employee| employee.status == EmployeeStatus::InProgress)
                .count() as u32,
            completed: completed.len() as u32,
            passed,
            failed,
            pass_rate: percent(passed, completed.len() as u32),
            fail_rate: percent(failed, completed.len() as u32),
        }
    }
}

/// Integer percentage rounded to the nearest whole point; zero denominator
/// yields zero rather than a division error.
pub(crate) fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Campaign lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Running,
    Completed,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Running => "running",
            CampaignStatus::Completed => "completed",
        }
    }
}

/// Immutable record of a launched campaign.
///
/// Recipients, breakdown, and metrics are a snapshot of the exclusion
/// computation at launch time; they are never re-derived from live DND or
/// safe-hours state afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: CampaignStatus,
    pub employees: Vec<Employee>,
    pub departments: Vec<DepartmentBreakdown>,
    pub metrics: CampaignMetrics,
}
