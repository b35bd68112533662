use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AdvisoryProposal, CapacityPlan, ForecastResult, PlannerConfig, PlanningRequest,
    PlanningResult, Project, Resource, ScheduleResult, Task, UtilizationReport, WorkWeekConfig,
    allocation, forecast, report, scheduling, validation::ValidationError,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<PlannerConfig>,
    history: Arc<RwLock<Vec<CapacityPlan>>>,
}

impl AppState {
    pub fn new(config: PlannerConfig) -> Self {
        Self::with_history(config, Vec::new())
    }

    pub fn with_history(config: PlannerConfig, history: Vec<CapacityPlan>) -> Self {
        Self {
            config: Arc::new(config),
            history: Arc::new(RwLock::new(history)),
        }
    }

    pub fn history(&self) -> Vec<CapacityPlan> {
        self.history.read().clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<report::ReportError> for ApiError {
    fn from(value: report::ReportError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plans", get(list_plans))
        .route("/plans/generate", post(generate_plans))
        .route("/forecast", get(get_forecast))
        .route("/schedule", post(schedule_week))
        .route("/reports/utilization", post(utilization_report))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: PlannerConfig) -> std::io::Result<()> {
    let state = AppState::new(config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "capacity planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct GeneratePayload {
    resources: Vec<Resource>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(flatten)]
    request: PlanningRequest,
}

async fn generate_plans(
    State(state): State<AppState>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<PlanningResult>, ApiError> {
    let result = allocation::generate_capacity_plan(
        &payload.resources,
        &payload.projects,
        &payload.request,
        &state.config,
    )?;
    {
        let mut history = state.history.write();
        history.extend(result.plans.iter().cloned());
    }
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct PlansQuery {
    month: Option<u32>,
    year: Option<i32>,
}

async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<PlansQuery>,
) -> Json<Vec<CapacityPlan>> {
    let history = state.history.read();
    let plans = history
        .iter()
        .filter(|plan| query.month.is_none_or(|month| plan.month == month))
        .filter(|plan| query.year.is_none_or(|year| plan.year == year))
        .cloned()
        .collect();
    Json(plans)
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    months_ahead: Option<u32>,
    reference: Option<NaiveDate>,
}

async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResult>, ApiError> {
    let months_ahead = query.months_ahead.unwrap_or(3);
    if months_ahead == 0 {
        return Err(ApiError::invalid("months_ahead must be at least 1"));
    }
    let reference = query.reference.unwrap_or_else(|| Utc::now().date_naive());
    let history = state.history.read();
    Ok(Json(forecast::forecast(months_ahead, reference, &history)))
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    tasks: Vec<Task>,
    work_week: Option<WorkWeekConfig>,
    /// Structured proposal JSON.
    proposal: Option<Value>,
    /// Free-form advisory text containing a JSON proposal.
    advisory_text: Option<String>,
}

async fn schedule_week(
    State(state): State<AppState>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<ScheduleResult>, ApiError> {
    let week = payload
        .work_week
        .unwrap_or_else(|| state.config.work_week.clone());
    let proposal = match (payload.proposal, payload.advisory_text) {
        (Some(raw), _) => AdvisoryProposal::Unvalidated(raw),
        (None, Some(text)) => AdvisoryProposal::from_text(&text),
        (None, None) => AdvisoryProposal::None,
    };
    let result = scheduling::schedule(&payload.tasks, &week, proposal)?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct ReportPayload {
    month: u32,
    year: i32,
    /// Plans to report on instead of the stored history.
    plans: Option<Vec<CapacityPlan>>,
}

async fn utilization_report(
    State(state): State<AppState>,
    Json(payload): Json<ReportPayload>,
) -> Result<Json<UtilizationReport>, ApiError> {
    if !(1..=12).contains(&payload.month) {
        return Err(ApiError::invalid(format!(
            "month {} must be within 1..=12",
            payload.month
        )));
    }
    let report = match payload.plans {
        Some(plans) => report::utilization_report(&plans, payload.month, payload.year)?,
        None => {
            let history = state.history.read();
            report::utilization_report(&history, payload.month, payload.year)?
        }
    };
    if report.total_plans == 0 {
        return Err(ApiError::NotFound(format!(
            "no plans recorded for {}-{:02}",
            payload.year, payload.month
        )));
    }
    Ok(Json(report))
}
