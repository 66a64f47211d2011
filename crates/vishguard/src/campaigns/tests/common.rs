use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::campaigns::admin::DndDirectory;
use crate::campaigns::domain::{Campaign, CampaignId, Employee, EmployeeId};
use crate::campaigns::repository::{CampaignRepository, RepositoryError};
use crate::campaigns::router::{campaign_router, CampaignState};
use crate::campaigns::service::CampaignService;
use crate::campaigns::targeting::LaunchRequest;
use crate::exclusions::dnd::{DndEntry, DndEntryId, DndReason};
use crate::exclusions::safe_hours::SafeHoursConfig;
use crate::hierarchy::{DepartmentId, DepartmentNode};
use crate::roster::{RosterError, RosterProvider};

/// Tuesday 2025-01-14 15:00 UTC: 10:00 in New York, inside the default window.
pub(super) fn weekday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 14, 15, 0, 0).unwrap()
}

/// Saturday 2025-01-11 15:00 UTC: weekend everywhere in the US.
pub(super) fn saturday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 11, 15, 0, 0).unwrap()
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn tree() -> Vec<DepartmentNode> {
    vec![
        DepartmentNode {
            id: DepartmentId("dept-eng".to_string()),
            name: "Engineering".to_string(),
            employee_count: 142,
            children: vec![
                DepartmentNode::leaf("dept-eng-fe", "Frontend", 38),
                DepartmentNode::leaf("dept-eng-be", "Backend", 54),
            ],
            is_restricted: false,
        },
        DepartmentNode::leaf("dept-sales", "Sales", 89),
        DepartmentNode {
            is_restricted: true,
            ..DepartmentNode::leaf("dept-exec", "Executive", 12)
        },
    ]
}

pub(super) fn accessible() -> HashSet<DepartmentId> {
    ["dept-eng", "dept-eng-fe", "dept-eng-be", "dept-sales"]
        .iter()
        .map(|id| DepartmentId(id.to_string()))
        .collect()
}

pub(super) fn veteran(id: &str, name: &str, department: &str) -> Employee {
    Employee::new(
        EmployeeId(id.to_string()),
        name,
        "+15550000001",
        "roster@example.com",
        department,
    )
    .with_hire_date(date(2022, 3, 1))
}

/// Fixed HR fixture keyed by department id.
#[derive(Default, Clone)]
pub(super) struct StaticRoster {
    rosters: HashMap<DepartmentId, Vec<Employee>>,
}

impl StaticRoster {
    pub(super) fn with(rosters: Vec<(&str, Vec<Employee>)>) -> Self {
        Self {
            rosters: rosters
                .into_iter()
                .map(|(id, employees)| (DepartmentId(id.to_string()), employees))
                .collect(),
        }
    }
}

impl RosterProvider for StaticRoster {
    fn roster_for_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, RosterError> {
        let mut roster = Vec::new();
        for id in department_ids {
            let employees = self
                .rosters
                .get(id)
                .ok_or_else(|| RosterError::UnknownDepartment(id.0.clone()))?;
            roster.extend(employees.iter().cloned());
        }
        Ok(roster)
    }
}

/// Engineering leaves and sales, five employees total.
pub(super) fn standard_roster() -> StaticRoster {
    StaticRoster::with(vec![
        (
            "dept-eng-fe",
            vec![
                veteran("emp-1", "John Smith", "Frontend"),
                veteran("emp-2", "Sarah Johnson", "Frontend"),
            ],
        ),
        (
            "dept-eng-be",
            vec![veteran("emp-3", "Mike Chen", "Backend")],
        ),
        (
            "dept-sales",
            vec![
                veteran("emp-4", "Lisa Park", "Sales"),
                veteran("emp-5", "David Wilson", "Sales"),
            ],
        ),
        ("dept-eng", vec![veteran("emp-99", "Parent Ghost", "Engineering")]),
    ])
}

pub(super) fn dnd_entry(employee: &str, reason: DndReason) -> DndEntry {
    DndEntry {
        id: DndEntryId(format!("dnd-{employee}")),
        employee_id: EmployeeId(employee.to_string()),
        employee_name: "John Smith".to_string(),
        masked_name: "J*** S***".to_string(),
        reason,
        note: None,
        start_date: date(2025, 1, 1),
        end_date: None,
        added_by: "HR Admin".to_string(),
        added_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
    }
}

pub(super) fn launch_request() -> LaunchRequest {
    LaunchRequest {
        name: "Q1 Security Awareness".to_string(),
        description: Some("Quarterly voice-phishing drill".to_string()),
        department_ids: vec![
            DepartmentId("dept-eng-fe".to_string()),
            DepartmentId("dept-eng-be".to_string()),
            DepartmentId("dept-sales".to_string()),
        ],
        compliance_confirmed: true,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<CampaignId, Campaign>>>,
}

impl CampaignRepository for MemoryRepository {
    fn insert(&self, campaign: Campaign) -> Result<Campaign, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&campaign.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(campaign.id.clone(), campaign.clone());
        Ok(campaign)
    }

    fn update(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&campaign.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(campaign.id.clone(), campaign);
        Ok(())
    }

    fn fetch(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Campaign>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut campaigns: Vec<Campaign> = guard.values().cloned().collect();
        campaigns.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(campaigns)
    }
}

pub(super) struct UnavailableRepository;

impl CampaignRepository for UnavailableRepository {
    fn insert(&self, _campaign: Campaign) -> Result<Campaign, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _campaign: Campaign) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Campaign>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (CampaignService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = CampaignService::new(repository.clone());
    (service, repository)
}

pub(super) fn build_state() -> Arc<CampaignState<MemoryRepository, StaticRoster>> {
    let repository = Arc::new(MemoryRepository::default());
    // Handlers read the real wall clock, so the window check stays off here.
    let safe_hours = SafeHoursConfig {
        enabled: false,
        ..SafeHoursConfig::default()
    };
    Arc::new(CampaignState {
        service: CampaignService::new(repository),
        provider: standard_roster(),
        hierarchy: tree(),
        accessible: accessible(),
        dnd: Mutex::new(DndDirectory::new()),
        safe_hours: RwLock::new(safe_hours),
    })
}

pub(super) fn router_with_state(
    state: Arc<CampaignState<MemoryRepository, StaticRoster>>,
) -> axum::Router {
    campaign_router(state)
}

pub(super) fn assert_unprocessable(response: &Response) {
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
