use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::error;

use service::{EmployeeInput, ServiceError, Statistics};

use super::AppState;
use crate::{
    dto::{EmployeeDto, EmployeeListResponse, ListParams},
    error::ApiError,
};

fn employee_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn employee_input(payload: Result<Json<EmployeeInput>, JsonRejection>) -> Result<EmployeeInput, ApiError> {
    payload.map(|Json(input)| input).map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = params.page_request().map_err(ServiceError::Validation)?;

    let page = state.service.browse(&params.filter(), &request).await?;
    Ok(Json(page.into()))
}

pub async fn get(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = employee_id(path)?;
    let employee = state.service.get(id).await?;
    Ok(Json(json!({ "employee": EmployeeDto::from(employee) })))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = employee_input(payload)?;
    let employee = state.service.create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee created successfully",
            "employee": EmployeeDto::from(employee),
        })),
    ))
}

pub async fn update(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = employee_id(path)?;
    let input = employee_input(payload)?;
    let employee = state.service.update(id, &input).await?;

    Ok(Json(json!({
        "message": "Employee updated successfully",
        "employee": EmployeeDto::from(employee),
    })))
}

/// Soft delete.
pub async fn delete(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = employee_id(path)?;
    state.service.soft_delete(id).await?;
    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}

pub async fn statistics(State(state): State<AppState>) -> Result<Json<Statistics>, ApiError> {
    Ok(Json(state.service.statistics().await?))
}

pub async fn departments(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.departments().await?))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().timestamp_millis();
    match state.service.count_active().await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "status": "UP",
                "message": "Employee Management System is running!",
                "timestamp": timestamp,
                "employeeCount": count,
                "database": "PostgreSQL",
            })),
        ),
        Err(e) => {
            error!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "DOWN",
                    "message": "Database connection failed",
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
