//! Stand-in HR fixtures and the CLI walkthrough.
//!
//! The real deployment talks to an HR connector; this module fakes one with a
//! seeded department hierarchy and a deterministic roster generator so the
//! service and the demo produce the same people on every run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use clap::Args;

use vishguard::campaigns::{CampaignService, Employee, EmployeeId, LaunchError, LaunchRequest};
use vishguard::error::AppError;
use vishguard::exclusions::dnd::{DndEntry, DndEntryId, DndReason};
use vishguard::exclusions::safe_hours::{self, SafeHoursConfig};
use vishguard::exclusions::summary;
use vishguard::hierarchy::{DepartmentId, DepartmentIndex, DepartmentNode, DepartmentSelection};
use vishguard::roster::{RosterError, RosterProvider};

use crate::infra::InMemoryCampaignRepository;

const FIRST_NAMES: &[&str] = &[
    "John", "Sarah", "Mike", "Lisa", "David", "Emma", "James", "Maria", "Robert", "Jennifer",
    "Kevin", "Amanda",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Chen", "Park", "Wilson", "Davis", "Brown", "Garcia", "Taylor",
    "Anderson", "Lee", "Martinez",
];

fn node(
    id: &str,
    name: &str,
    count: u32,
    children: Vec<DepartmentNode>,
    restricted: bool,
) -> DepartmentNode {
    DepartmentNode {
        id: DepartmentId(id.to_string()),
        name: name.to_string(),
        employee_count: count,
        children,
        is_restricted: restricted,
    }
}

/// Seeded organization chart. Parent counts overlap child counts, matching
/// what the HR connector reports.
pub(crate) fn standard_hierarchy() -> Vec<DepartmentNode> {
    vec![
        node(
            "dept-eng",
            "Engineering",
            142,
            vec![
                DepartmentNode::leaf("dept-eng-fe", "Frontend", 38),
                DepartmentNode::leaf("dept-eng-be", "Backend", 54),
                DepartmentNode::leaf("dept-eng-devops", "DevOps", 28),
                DepartmentNode::leaf("dept-eng-qa", "QA", 22),
            ],
            false,
        ),
        node("dept-sales", "Sales", 89, Vec::new(), false),
        node("dept-marketing", "Marketing", 45, Vec::new(), false),
        node("dept-cs", "Customer Success", 67, Vec::new(), false),
        node("dept-finance", "Finance", 32, Vec::new(), false),
        node("dept-hr", "Human Resources", 28, Vec::new(), true),
        node("dept-legal", "Legal", 15, Vec::new(), true),
        node("dept-exec", "Executive", 12, Vec::new(), true),
    ]
}

/// Every non-restricted department id; the operator's allow-list.
pub(crate) fn accessible_ids(tree: &[DepartmentNode]) -> HashSet<DepartmentId> {
    let mut ids = HashSet::new();
    let mut stack: Vec<&DepartmentNode> = tree.iter().collect();
    while let Some(current) = stack.pop() {
        if !current.is_restricted {
            ids.insert(current.id.clone());
        }
        stack.extend(current.children.iter());
    }
    ids
}

/// Deterministic fake HR connector: the same department always yields the
/// same employees for a given anchor date.
pub(crate) struct MockHrDirectory {
    departments: HashMap<DepartmentId, (String, u32)>,
    today: NaiveDate,
}

impl MockHrDirectory {
    pub(crate) fn from_tree(tree: &[DepartmentNode], today: NaiveDate) -> Self {
        let mut departments = HashMap::new();
        let mut stack: Vec<&DepartmentNode> = tree.iter().collect();
        while let Some(current) = stack.pop() {
            departments.insert(current.id.clone(), (current.name.clone(), current.employee_count));
            stack.extend(current.children.iter());
        }
        Self { departments, today }
    }

    fn generate(&self, id: &DepartmentId, name: &str, count: u32) -> Vec<Employee> {
        (0..count as usize)
            .map(|n| {
                let first = FIRST_NAMES[n % FIRST_NAMES.len()];
                let last = LAST_NAMES[(n / FIRST_NAMES.len() + n) % LAST_NAMES.len()];
                let mut employee = Employee::new(
                    EmployeeId(format!("{}-{}", id.0, n + 1)),
                    format!("{first} {last}"),
                    format!("+1555{:07}", (id.0.len() * 100_000 + n * 13) % 10_000_000),
                    format!(
                        "{}.{}{}@example.com",
                        first.to_lowercase(),
                        last.to_lowercase(),
                        n + 1
                    ),
                    name,
                );
                // Every eleventh employee is a recent hire, exercising the
                // automatic protection window.
                let hire_date = if n % 11 == 0 {
                    self.today - Duration::days((n % 20) as i64)
                } else {
                    NaiveDate::from_ymd_opt(2018, 1, 1).expect("valid date")
                        + Duration::days(((n * 73) % 2500) as i64)
                };
                employee.hire_date = Some(hire_date);
                employee
            })
            .collect()
    }
}

impl RosterProvider for MockHrDirectory {
    fn roster_for_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, RosterError> {
        let mut roster = Vec::new();
        for id in department_ids {
            let (name, count) = self
                .departments
                .get(id)
                .ok_or_else(|| RosterError::UnknownDepartment(id.0.clone()))?;
            roster.extend(self.generate(id, name, *count));
        }
        Ok(roster)
    }
}

/// Seeded DND list: one bounded leave, one indefinite sensitive case, one
/// manual block, all anchored on `today` so they are active during the demo.
pub(crate) fn seeded_dnd_entries(today: NaiveDate) -> Vec<DndEntry> {
    let added_at = Utc
        .from_utc_datetime(&(today - Duration::days(3)).and_hms_opt(9, 0, 0).expect("valid time"));
    let entry = |n: u64, employee: &str, name: &str, reason, note: &str, end: Option<NaiveDate>| {
        DndEntry {
            id: DndEntryId(format!("dnd-{n}")),
            employee_id: EmployeeId(employee.to_string()),
            employee_name: name.to_string(),
            masked_name: vishguard::campaigns::mask_name(name),
            reason,
            note: Some(note.to_string()),
            start_date: today - Duration::days(3),
            end_date: end,
            added_by: "HR Admin".to_string(),
            added_at,
        }
    };

    vec![
        entry(
            1,
            "dept-eng-fe-2",
            "Sarah Johnson",
            DndReason::Leave,
            "Parental leave",
            Some(today + Duration::days(30)),
        ),
        entry(
            2,
            "dept-sales-3",
            "Mike Chen",
            DndReason::Sensitive,
            "Bereavement",
            None,
        ),
        entry(
            3,
            "dept-eng-be-5",
            "David Wilson",
            DndReason::Manual,
            "Requested by manager",
            Some(today + Duration::days(14)),
        ),
    ]
}

/// Safe-hours blocked set for the blocked listing, matching what the preview
/// counts: one evaluation of the organization window covers the whole roster.
fn safe_hours_blocked(
    roster: &[Employee],
    config: &SafeHoursConfig,
    now: DateTime<Utc>,
) -> HashSet<EmployeeId> {
    if safe_hours::evaluate(config, now, None).allowed {
        return HashSet::new();
    }
    roster.iter().map(|employee| employee.id.clone()).collect()
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Department ids to target (repeatable). Defaults to the engineering
    /// leaves plus sales.
    #[arg(long = "department")]
    pub(crate) departments: Vec<String>,
    /// Print every blocked employee with reasons.
    #[arg(long)]
    pub(crate) list_blocked: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    // Mid-morning in the default zone, so a weekday demo lands inside the
    // calling window.
    let now: DateTime<Utc> =
        Utc.from_utc_datetime(&today.and_hms_opt(15, 0, 0).expect("valid time"));

    let tree = standard_hierarchy();
    let accessible = accessible_ids(&tree);
    let provider = MockHrDirectory::from_tree(&tree, today);
    let entries = seeded_dnd_entries(today);
    let safe_hours = SafeHoursConfig::default();

    let department_ids: Vec<DepartmentId> = if args.departments.is_empty() {
        vec![
            DepartmentId("dept-eng-fe".to_string()),
            DepartmentId("dept-eng-be".to_string()),
            DepartmentId("dept-sales".to_string()),
        ]
    } else {
        args.departments.into_iter().map(DepartmentId).collect()
    };

    println!("Voice phishing awareness demo (evaluated {today})");
    println!(
        "Safe calling hours: {} ({}), weekends excluded: {}",
        safe_hours.window_label(),
        safe_hours.default_timezone,
        safe_hours.exclude_weekends
    );

    let index = DepartmentIndex::build(&tree);
    let mut selection = DepartmentSelection::new();
    for id in &department_ids {
        selection.toggle(id, &index, &accessible);
    }
    println!(
        "\nSelected departments: {} ({} estimated employees)",
        selection.len(),
        selection.aggregate_headcount(&tree)
    );

    let preview = vishguard::campaigns::targeting::preview(
        &department_ids,
        &tree,
        &provider,
        &entries,
        &safe_hours,
        now,
    )
    .map_err(|err| AppError::Launch(LaunchError::from(err)))?;

    println!("\nExclusion preview");
    println!("- Targeted: {}", preview.targeted);
    println!("- Eligible: {}", preview.eligible);
    println!(
        "- DND blocked: {} (leave {}, sensitive {}, new hire {}, manual {})",
        preview.summary.dnd_count,
        preview.summary.by_reason.leave,
        preview.summary.by_reason.sensitive,
        preview.summary.by_reason.new_hire,
        preview.summary.by_reason.manual
    );
    println!("- Outside safe hours: {}", preview.summary.safe_hours_count);

    if args.list_blocked {
        let roster = provider
            .roster_for_departments(&department_ids)
            .map_err(|err| AppError::Launch(LaunchError::from(err)))?;
        let blocked_by_safe_hours = safe_hours_blocked(&roster, &safe_hours, now);
        let blocked = summary::blocked_employees(&roster, &entries, &blocked_by_safe_hours, today);
        println!("\nBlocked employees");
        for blocked_employee in &blocked {
            println!(
                "- {} ({}): {}",
                blocked_employee.employee.masked_name,
                blocked_employee.employee.department,
                blocked_employee.reasons.join(", ")
            );
        }
    }

    let service = CampaignService::new(Arc::new(InMemoryCampaignRepository::default()));
    let request = LaunchRequest {
        name: "Quarterly Security Awareness".to_string(),
        description: Some("CLI demo launch".to_string()),
        department_ids,
        compliance_confirmed: true,
    };

    let outcome = match service.launch(&request, &tree, &provider, &entries, &safe_hours, now) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("\nLaunch refused: {err}");
            return Ok(());
        }
    };

    println!(
        "\nLaunched campaign {} ({})",
        outcome.campaign.id.0, outcome.campaign.name
    );
    println!(
        "- Recipients: {} across {} departments",
        outcome.campaign.metrics.total_targeted,
        outcome.campaign.departments.len()
    );
    for breakdown in &outcome.campaign.departments {
        println!("  - {}: {} employees", breakdown.name, breakdown.employee_count);
    }
    println!("- Excluded at launch: {}", outcome.exclusions.total_excluded);

    Ok(())
}
