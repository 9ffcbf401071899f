use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{DayPlan, IntervalRow, PlanSummary, StaffingPolicy, StaffingRequirement, solve};

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<DayPlan>>,
}

impl AppState {
    pub fn new(plan: DayPlan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
        }
    }

    pub fn with_shared(plan: Arc<RwLock<DayPlan>>) -> Self {
        Self { plan }
    }

    fn plan(&self) -> Arc<RwLock<DayPlan>> {
        self.plan.clone()
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
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<crate::StaffingError> for ApiError {
    fn from(value: crate::StaffingError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SolvePayload {
    calls: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/policy", get(get_policy).put(update_policy))
        .route("/intervals", get(list_intervals).post(create_interval))
        .route(
            "/intervals/:idx",
            get(get_interval)
                .put(update_interval)
                .delete(delete_interval),
        )
        .route("/refresh", post(refresh_plan))
        .route("/solve", post(solve_staffing))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: DayPlan) -> std::io::Result<()> {
    let state = AppState::new(plan);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_policy(State(state): State<AppState>) -> Json<StaffingPolicy> {
    let plan = state.plan();
    let policy = {
        let guard = plan.read();
        guard.policy().clone()
    };
    Json(policy)
}

async fn update_policy(
    State(state): State<AppState>,
    Json(policy): Json<StaffingPolicy>,
) -> Result<Json<StaffingPolicy>, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.set_policy(policy)?;
        if guard.interval_count() > 0 {
            guard.refresh()?;
        }
    }
    let current = {
        let guard = plan.read();
        guard.policy().clone()
    };
    Ok(Json(current))
}

async fn list_intervals(State(state): State<AppState>) -> Result<Json<Vec<IntervalRow>>, ApiError> {
    let plan = state.plan();
    let intervals = {
        let guard = plan.read();
        guard.intervals()?
    };
    Ok(Json(intervals))
}

async fn create_interval(
    State(state): State<AppState>,
    Json(interval): Json<IntervalRow>,
) -> Result<(StatusCode, Json<IntervalRow>), ApiError> {
    let plan = state.plan();
    let created = {
        let mut guard = plan.write();
        guard.push_interval(interval)?;
        let idx = guard.interval_count() - 1;
        guard.refresh()?;
        guard
            .interval(idx)?
            .ok_or_else(|| ApiError::invalid("interval not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_interval(
    State(state): State<AppState>,
    Path(idx): Path<usize>,
) -> Result<Json<IntervalRow>, ApiError> {
    let plan = state.plan();
    let result = {
        let guard = plan.read();
        guard.interval(idx)?
    };
    match result {
        Some(interval) => Ok(Json(interval)),
        None => Err(ApiError::not_found(format!("interval {idx} not found"))),
    }
}

async fn update_interval(
    State(state): State<AppState>,
    Path(idx): Path<usize>,
    Json(interval): Json<IntervalRow>,
) -> Result<Json<IntervalRow>, ApiError> {
    let plan = state.plan();
    let updated = {
        let mut guard = plan.write();
        if !guard.replace_interval(idx, interval)? {
            return Err(ApiError::not_found(format!("interval {idx} not found")));
        }
        guard.refresh()?;
        guard
            .interval(idx)?
            .ok_or_else(|| ApiError::invalid("interval not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_interval(
    State(state): State<AppState>,
    Path(idx): Path<usize>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    let removed = {
        let mut guard = plan.write();
        guard.delete_interval(idx)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("interval {idx} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh_plan(State(state): State<AppState>) -> Result<Json<PlanSummary>, ApiError> {
    let plan = state.plan();
    let summary = {
        let mut guard = plan.write();
        guard.refresh()?
    };
    Ok(Json(summary))
}

async fn solve_staffing(
    State(state): State<AppState>,
    Json(payload): Json<SolvePayload>,
) -> Result<Json<StaffingRequirement>, ApiError> {
    let plan = state.plan();
    let policy = {
        let guard = plan.read();
        guard.policy().clone()
    };
    let requirement = solve(payload.calls, &policy)?;
    Ok(Json(requirement))
}
