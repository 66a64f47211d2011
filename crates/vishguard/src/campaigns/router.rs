use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::exclusions::safe_hours::SafeHoursConfig;
use crate::hierarchy::{DepartmentId, DepartmentNode};
use crate::roster::{RosterError, RosterProvider};

use super::admin::{DndDirectory, DndDirectoryError, NewDndEntry};
use super::domain::{Campaign, CampaignId, CampaignMetrics, DepartmentBreakdown, Employee};
use super::repository::{CampaignRepository, RepositoryError};
use super::service::{CampaignService, CampaignServiceError};
use super::targeting::{self, LaunchRequest};
use crate::exclusions::dnd::{DndEntry, DndEntryId};

/// Shared state behind the campaign API: the service, the HR collaborator
/// fixtures, and the administrative singletons (DND directory, safe-hours
/// config). Administrative state assumes a single operator at a time.
pub struct CampaignState<R, P> {
    pub service: CampaignService<R>,
    pub provider: P,
    pub hierarchy: Vec<DepartmentNode>,
    pub accessible: HashSet<DepartmentId>,
    pub dnd: Mutex<DndDirectory>,
    pub safe_hours: RwLock<SafeHoursConfig>,
}

/// Router builder exposing the administrative campaign endpoints.
pub fn campaign_router<R, P>(state: Arc<CampaignState<R, P>>) -> Router
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    Router::new()
        .route("/api/v1/campaigns", post(launch_handler::<R, P>))
        .route("/api/v1/campaigns", get(list_handler::<R, P>))
        .route("/api/v1/campaigns/:campaign_id", get(get_handler::<R, P>))
        .route(
            "/api/v1/campaigns/:campaign_id/complete",
            post(complete_handler::<R, P>),
        )
        .route(
            "/api/v1/exclusions/preview",
            post(preview_handler::<R, P>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R, P>))
        .route("/api/v1/departments", get(departments_handler::<R, P>))
        .route("/api/v1/roster/import", post(roster_import_handler::<R, P>))
        .route("/api/v1/dnd", get(dnd_list_handler::<R, P>))
        .route("/api/v1/dnd", post(dnd_add_handler::<R, P>))
        .route("/api/v1/dnd/:entry_id", delete(dnd_remove_handler::<R, P>))
        .route("/api/v1/safe-hours", get(safe_hours_get_handler::<R, P>))
        .route("/api/v1/safe-hours", put(safe_hours_put_handler::<R, P>))
        .with_state(state)
}

/// Masked per-recipient view; clear names never leave the service.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
    pub id: String,
    pub masked_name: String,
    pub department: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'static str>,
}

impl EmployeeView {
    fn from_employee(employee: &Employee) -> Self {
        Self {
            id: employee.id.0.clone(),
            masked_name: employee.masked_name.clone(),
            department: employee.department.clone(),
            status: employee.status.label(),
            result: employee.result.map(|result| match result {
                super::domain::TestResult::Passed => "passed",
                super::domain::TestResult::Failed => "failed",
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummaryView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub metrics: CampaignMetrics,
}

impl CampaignSummaryView {
    fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id.0.clone(),
            name: campaign.name.clone(),
            description: campaign.description.clone(),
            status: campaign.status.label(),
            created_at: campaign.created_at,
            started_at: campaign.started_at,
            completed_at: campaign.completed_at,
            metrics: campaign.metrics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetailView {
    #[serde(flatten)]
    pub summary: CampaignSummaryView,
    pub departments: Vec<DepartmentBreakdown>,
    pub employees: Vec<EmployeeView>,
}

impl CampaignDetailView {
    fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            summary: CampaignSummaryView::from_campaign(campaign),
            departments: campaign.departments.clone(),
            employees: campaign
                .employees
                .iter()
                .map(EmployeeView::from_employee)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DndEntryView {
    pub id: String,
    pub employee_id: String,
    pub masked_name: String,
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_days: Option<i64>,
    pub active: bool,
}

impl DndEntryView {
    fn from_entry(entry: &DndEntry, today: chrono::NaiveDate) -> Self {
        Self {
            id: entry.id.0.clone(),
            employee_id: entry.employee_id.0.clone(),
            masked_name: entry.masked_name.clone(),
            reason: entry.reason.label(),
            note: entry.note.clone(),
            duration: entry.duration_label(),
            remaining_days: entry.remaining_days(today),
            active: entry.is_active(today),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub department_ids: Vec<DepartmentId>,
}

fn service_error_response(error: CampaignServiceError) -> Response {
    match error {
        CampaignServiceError::Launch(launch) => {
            let payload = json!({ "error": launch.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CampaignServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "campaign not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CampaignServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "campaign already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn launch_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    axum::Json(request): axum::Json<LaunchRequest>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let now = Utc::now();
    let entries = state
        .dnd
        .lock()
        .expect("dnd directory mutex poisoned")
        .entries()
        .to_vec();
    let config = state
        .safe_hours
        .read()
        .expect("safe-hours lock poisoned")
        .clone();

    match state.service.launch(
        &request,
        &state.hierarchy,
        &state.provider,
        &entries,
        &config,
        now,
    ) {
        Ok(outcome) => {
            let payload = json!({
                "campaign": CampaignDetailView::from_campaign(&outcome.campaign),
                "exclusions": outcome.exclusions,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    match state.service.list() {
        Ok(campaigns) => {
            let views: Vec<CampaignSummaryView> = campaigns
                .iter()
                .map(CampaignSummaryView::from_campaign)
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn get_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    match state.service.get(&CampaignId(campaign_id)) {
        Ok(campaign) => (
            StatusCode::OK,
            axum::Json(CampaignDetailView::from_campaign(&campaign)),
        )
            .into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn complete_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    match state.service.complete(&CampaignId(campaign_id), Utc::now()) {
        Ok(campaign) => (
            StatusCode::OK,
            axum::Json(CampaignSummaryView::from_campaign(&campaign)),
        )
            .into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn preview_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    axum::Json(request): axum::Json<PreviewRequest>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let now = Utc::now();
    let entries = state
        .dnd
        .lock()
        .expect("dnd directory mutex poisoned")
        .entries()
        .to_vec();
    let config = state
        .safe_hours
        .read()
        .expect("safe-hours lock poisoned")
        .clone();

    match targeting::preview(
        &request.department_ids,
        &state.hierarchy,
        &state.provider,
        &entries,
        &config,
        now,
    ) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(RosterError::UnknownDepartment(name)) => {
            let payload = json!({ "error": format!("unknown department: {name}") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn dashboard_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let today = Utc::now().date_naive();
    let dnd_stats = state
        .dnd
        .lock()
        .expect("dnd directory mutex poisoned")
        .stats(today);

    match state.service.dashboard_stats() {
        Ok(stats) => {
            let payload = json!({
                "stats": stats,
                "dnd": dnd_stats,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn departments_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let accessible: Vec<&str> = state.accessible.iter().map(|id| id.0.as_str()).collect();
    let payload = json!({
        "hierarchy": state.hierarchy,
        "accessible_department_ids": accessible,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

/// Accept a raw CSV body and echo the parsed roster back, masked. The upload
/// is a dry run; nothing is stored.
pub(crate) async fn roster_import_handler<R, P>(
    State(_state): State<Arc<CampaignState<R, P>>>,
    body: String,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    match crate::roster::parse_roster(body.as_bytes()) {
        Ok(employees) => {
            let views: Vec<EmployeeView> = employees.iter().map(EmployeeView::from_employee).collect();
            let payload = json!({
                "imported": views.len(),
                "employees": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn dnd_list_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let today = Utc::now().date_naive();
    let directory = state.dnd.lock().expect("dnd directory mutex poisoned");
    let views: Vec<DndEntryView> = directory
        .entries()
        .iter()
        .map(|entry| DndEntryView::from_entry(entry, today))
        .collect();
    let payload = json!({
        "entries": views,
        "stats": directory.stats(today),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn dnd_add_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    axum::Json(new_entry): axum::Json<NewDndEntry>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let now = Utc::now();
    let mut directory = state.dnd.lock().expect("dnd directory mutex poisoned");
    let entry = directory.add(new_entry, now);
    let view = DndEntryView::from_entry(entry, now.date_naive());
    (StatusCode::CREATED, axum::Json(view)).into_response()
}

pub(crate) async fn dnd_remove_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    Path(entry_id): Path<String>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let mut directory = state.dnd.lock().expect("dnd directory mutex poisoned");
    match directory.remove(&DndEntryId(entry_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(DndDirectoryError::NotFound) => {
            let payload = json!({ "error": "dnd entry not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn safe_hours_get_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let config = state
        .safe_hours
        .read()
        .expect("safe-hours lock poisoned")
        .clone();
    (StatusCode::OK, axum::Json(config)).into_response()
}

/// Replace the safe-hours singleton; subsequent evaluations pick the new
/// policy up immediately, already-launched campaigns are untouched.
pub(crate) async fn safe_hours_put_handler<R, P>(
    State(state): State<Arc<CampaignState<R, P>>>,
    axum::Json(config): axum::Json<SafeHoursConfig>,
) -> Response
where
    R: CampaignRepository + 'static,
    P: RosterProvider + 'static,
{
    let mut current = state.safe_hours.write().expect("safe-hours lock poisoned");
    *current = config.clone();
    (StatusCode::OK, axum::Json(config)).into_response()
}
