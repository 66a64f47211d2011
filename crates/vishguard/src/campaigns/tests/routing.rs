use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;

use crate::campaigns::admin::{DndDirectory, NewDndEntry};
use crate::campaigns::domain::EmployeeId;
use crate::campaigns::router::{self, CampaignState};
use crate::campaigns::service::CampaignService;
use crate::campaigns::targeting::LaunchRequest;
use crate::exclusions::dnd::DndReason;
use crate::exclusions::safe_hours::SafeHoursConfig;

fn post_json(uri: &str, payload: &impl serde::Serialize) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn launch_route_returns_created_with_masked_recipients() {
    let router = router_with_state(build_state());

    let response = router
        .oneshot(post_json("/api/v1/campaigns", &launch_request()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let campaign = payload.get("campaign").expect("campaign in payload");
    assert!(campaign["id"].as_str().unwrap().starts_with("camp-"));
    assert_eq!(campaign["status"], json!("running"));

    let first = &campaign["employees"][0];
    assert_eq!(first["masked_name"], json!("J*** S***"));
    assert!(first.get("name").is_none(), "clear names must not leak");
}

#[tokio::test]
async fn launch_handler_rejects_unconfirmed_compliance() {
    let state = build_state();

    let request = LaunchRequest {
        compliance_confirmed: false,
        ..launch_request()
    };
    let response =
        router::launch_handler::<MemoryRepository, StaticRoster>(State(state), axum::Json(request))
            .await;

    assert_unprocessable(&response);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("compliance confirmation"));
}

#[tokio::test]
async fn launch_handler_reports_unavailable_repository_as_internal_error() {
    let state = Arc::new(CampaignState {
        service: CampaignService::new(Arc::new(UnavailableRepository)),
        provider: standard_roster(),
        hierarchy: tree(),
        accessible: accessible(),
        dnd: Mutex::new(DndDirectory::new()),
        safe_hours: RwLock::new(SafeHoursConfig {
            enabled: false,
            ..SafeHoursConfig::default()
        }),
    });

    let response = router::launch_handler::<UnavailableRepository, StaticRoster>(
        State(state),
        axum::Json(launch_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn get_handler_returns_not_found_for_missing_campaigns() {
    let state = build_state();

    let response = router::get_handler::<MemoryRepository, StaticRoster>(
        State(state),
        Path("camp-999999".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_route_closes_a_running_campaign() {
    let state = build_state();
    let router = router_with_state(state.clone());

    let launched = router
        .clone()
        .oneshot(post_json("/api/v1/campaigns", &launch_request()))
        .await
        .expect("route executes");
    let payload = read_json_body(launched).await;
    let id = payload["campaign"]["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(
            axum::http::Request::post(format!("/api/v1/campaigns/{id}/complete"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("completed"));
    assert!(payload.get("completed_at").is_some());
}

#[tokio::test]
async fn preview_route_reports_exclusion_counts() {
    let state = build_state();
    state
        .dnd
        .lock()
        .expect("dnd directory mutex poisoned")
        .add(
            NewDndEntry {
                employee_id: EmployeeId("emp-1".to_string()),
                employee_name: "John Smith".to_string(),
                reason: DndReason::Leave,
                note: None,
                start_date: date(2025, 1, 1),
                end_date: None,
                added_by: "HR Admin".to_string(),
            },
            weekday_morning(),
        );
    let router = router_with_state(state);

    let response = router
        .oneshot(post_json(
            "/api/v1/exclusions/preview",
            &json!({ "department_ids": ["dept-eng-fe", "dept-eng-be", "dept-sales"] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["targeted"], json!(5));
    assert_eq!(payload["eligible"], json!(4));
    assert_eq!(payload["summary"]["by_reason"]["leave"], json!(1));
}

#[tokio::test]
async fn preview_route_rejects_unknown_departments() {
    let router = router_with_state(build_state());

    let response = router
        .oneshot(post_json(
            "/api/v1/exclusions/preview",
            &json!({ "department_ids": ["dept-ghost"] }),
        ))
        .await
        .expect("route executes");

    assert_unprocessable(&response);
}

#[tokio::test]
async fn departments_route_lists_hierarchy_and_access() {
    let router = router_with_state(build_state());

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/departments")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["hierarchy"].as_array().unwrap().len(), 3);
    let accessible: HashSet<&str> = payload["accessible_department_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    assert!(accessible.contains("dept-sales"));
    assert!(!accessible.contains("dept-exec"));
}

#[tokio::test]
async fn dnd_routes_add_list_and_remove_entries() {
    let router = router_with_state(build_state());

    let new_entry = NewDndEntry {
        employee_id: EmployeeId("emp-4".to_string()),
        employee_name: "Lisa Park".to_string(),
        reason: DndReason::Sensitive,
        note: Some("Requested by manager".to_string()),
        start_date: date(2025, 1, 1),
        end_date: None,
        added_by: "HR Admin".to_string(),
    };
    let created = router
        .clone()
        .oneshot(post_json("/api/v1/dnd", &new_entry))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = read_json_body(created).await;
    assert_eq!(created["id"], json!("dnd-1"));
    assert_eq!(created["masked_name"], json!("L*** P***"));
    assert_eq!(created["reason"], json!("Sensitive situation"));
    assert_eq!(created["active"], json!(true));

    let listed = router
        .clone()
        .oneshot(
            axum::http::Request::get("/api/v1/dnd")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    let listed = read_json_body(listed).await;
    assert_eq!(listed["entries"].as_array().unwrap().len(), 1);
    assert_eq!(listed["stats"]["total"], json!(1));
    assert_eq!(listed["stats"]["sensitive"], json!(1));

    let removed = router
        .clone()
        .oneshot(
            axum::http::Request::delete("/api/v1/dnd/dnd-1")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let missing = router
        .oneshot(
            axum::http::Request::delete("/api/v1/dnd/dnd-1")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn roster_import_route_parses_and_masks_uploads() {
    let router = router_with_state(build_state());

    let response = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/roster/import")
                .header(axum::http::header::CONTENT_TYPE, "text/csv")
                .body(axum::body::Body::from(
                    "name,phone,department\nJohn Smith,+15550000001,Engineering\n",
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["imported"], json!(1));
    assert_eq!(payload["employees"][0]["masked_name"], json!("J*** S***"));

    let rejected = router
        .oneshot(
            axum::http::Request::post("/api/v1/roster/import")
                .header(axum::http::header::CONTENT_TYPE, "text/csv")
                .body(axum::body::Body::from("name,email\nJohn,j@x.com\n"))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_route_reports_campaign_and_dnd_stats() {
    let state = build_state();
    let router = router_with_state(state);

    let launched = router
        .clone()
        .oneshot(post_json("/api/v1/campaigns", &launch_request()))
        .await
        .expect("route executes");
    assert_eq!(launched.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/dashboard")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stats"]["active_campaigns"], json!(1));
    assert_eq!(payload["stats"]["total_employees_tested"], json!(5));
    assert_eq!(payload["dnd"]["total"], json!(0));
}

#[tokio::test]
async fn safe_hours_routes_round_trip_the_policy() {
    let router = router_with_state(build_state());

    let current = router
        .clone()
        .oneshot(
            axum::http::Request::get("/api/v1/safe-hours")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    let current = read_json_body(current).await;
    assert_eq!(current["enabled"], json!(false));
    assert_eq!(current["start_time"], json!("09:00"));

    let updated = router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(axum::http::Method::PUT)
                .uri("/api/v1/safe-hours")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "enabled": true,
                        "default_timezone": "America/Chicago",
                        "start_time": "08:00",
                        "end_time": "16:00",
                        "exclude_weekends": true,
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(updated.status(), StatusCode::OK);

    let reread = router
        .oneshot(
            axum::http::Request::get("/api/v1/safe-hours")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    let reread = read_json_body(reread).await;
    assert_eq!(reread["default_timezone"], json!("America/Chicago"));
    assert_eq!(reread["start_time"], json!("08:00"));
}
