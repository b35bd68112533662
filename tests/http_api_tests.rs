#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use capacity_planner::{
    CapacityPlan, ForecastResult, PlannerConfig, PlanningResult, ScheduleResult, ScheduleSource,
    UtilizationReport, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> (axum::Router, http_api::AppState) {
    let state = http_api::AppState::new(PlannerConfig::default());
    (http_api::router(state.clone()), state)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn planning_payload(start: &str, end: &str) -> Value {
    json!({
        "resources": [
            {"id": "r1", "type": "human", "capacity": 40, "cost_per_unit": 10}
        ],
        "projects": [{
            "id": "p1", "priority": "high",
            "start_date": start, "end_date": end,
            "requirements": {"capacity": 50}
        }],
        "period": {"start": start, "end": end},
        "optimization_target": "utilization"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = new_router();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generated_plans_are_recorded_and_forecast() {
    let (app, state) = new_router();

    let response = app
        .clone()
        .oneshot(post_json("/plans/generate", &planning_payload("2024-05-01", "2024-05-31")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: PlanningResult = read_json(response).await;
    assert!(!result.plans.is_empty());
    assert_eq!(result.plans[0].planned_capacity, 40.0);
    assert_eq!(state.history().len(), result.plans.len());

    let response = app
        .clone()
        .oneshot(get("/plans?month=5&year=2024"))
        .await
        .unwrap();
    let plans: Vec<CapacityPlan> = read_json(response).await;
    assert_eq!(plans.len(), result.plans.len());

    let response = app
        .clone()
        .oneshot(get("/forecast?months_ahead=2&reference=2025-05-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let forecast: ForecastResult = read_json(response).await;
    assert!(forecast.contains_key("2025-05"));
    assert!(!forecast.contains_key("2025-06"));

    let response = app
        .oneshot(post_json("/reports/utilization", &json!({"month": 5, "year": 2024})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: UtilizationReport = read_json(response).await;
    assert_eq!(report.resources[0].resource_id, "r1");
}

#[tokio::test]
async fn invalid_planning_input_is_a_bad_request() {
    let (app, state) = new_router();
    let payload = planning_payload("2024-05-31", "2024-05-01");
    let response = app.oneshot(post_json("/plans/generate", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(state.history().is_empty());
}

#[tokio::test]
async fn schedule_endpoint_uses_fallback_or_proposal() {
    let (app, _) = new_router();
    let tasks = json!([
        {"key": "A", "priority": "Low", "remaining_hours": 4},
        {"key": "B", "priority": "High", "remaining_hours": 10},
        {"key": "C", "priority": "Medium", "remaining_hours": 6}
    ]);
    let week = json!({"work_days": ["Mon"], "hours_per_day": 8});

    let response = app
        .clone()
        .oneshot(post_json("/schedule", &json!({"tasks": tasks, "work_week": week})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: ScheduleResult = read_json(response).await;
    assert_eq!(result.schedule[0].segments[0].task_key, "B");
    assert_eq!(result.unassigned_tasks.len(), 3);

    let advisory_text =
        r#"Plan: {"schedule": {"Monday": [{"task_key": "A", "allocated_hours": 4}]}}"#;
    let response = app
        .oneshot(post_json(
            "/schedule",
            &json!({"tasks": tasks, "work_week": week, "advisory_text": advisory_text}),
        ))
        .await
        .unwrap();
    let result: ScheduleResult = read_json(response).await;
    assert_eq!(result.summary.source, ScheduleSource::Advisory);
    assert_eq!(result.utilization_percentage, 50.0);
}

#[tokio::test]
async fn report_for_unknown_month_is_not_found() {
    let (app, _) = new_router();
    let response = app
        .oneshot(post_json("/reports/utilization", &json!({"month": 1, "year": 2030})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (app, _) = new_router();
    let response = app
        .oneshot(post_json("/reports/utilization", &json!({"month": 13, "year": 2030})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_task_hours_are_rejected() {
    let (app, _) = new_router();
    let response = app
        .oneshot(post_json(
            "/schedule",
            &json!({"tasks": [{"key": "X", "priority": "High", "remaining_hours": -3}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
