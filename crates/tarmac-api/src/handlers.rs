//! Request handlers
//!
//! Handlers translate HTTP requests into service calls and map the error
//! taxonomy onto status codes: validation to 400, permission failures to
//! 403, missing plans to 404, duplicates to 409. Configuration and
//! storage failures surface as 500 with a generic body; details go to
//! the log, keyed by the request id.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tarmac_core::{Plan, PlanError, PlanRouter, PlanStore};

use crate::auth::{require_permission, Identity, Permission};
use crate::{AppState, RequestId};

/// Error response body shared by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub request_id: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Map a service error onto its HTTP representation.
fn plan_error_response(err: PlanError, request_id: &str) -> HandlerError {
    let status = match &err {
        PlanError::Validation(_) => StatusCode::BAD_REQUEST,
        PlanError::AlreadyExists | PlanError::DuplicateDefault => StatusCode::CONFLICT,
        PlanError::NotFound => StatusCode::NOT_FOUND,
        PlanError::Config(_) | PlanError::Sqlite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, request_id, "request failed");
        "Internal server error. Please contact support with the request ID.".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error,
            request_id: request_id.to_string(),
        }),
    )
}

/// List every router backend the platform knows: built-ins plus
/// operator-configured instances, sorted by name. Never empty.
pub async fn list_routers<S: PlanStore>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<PlanRouter>>, HandlerError> {
    require_permission(&identity, Permission::AppCreate, &request_id.0)?;

    let catalog = state
        .catalog
        .full_catalog()
        .map_err(|e| plan_error_response(e, &request_id.0))?;
    Ok(Json(catalog))
}

/// List the routers selectable for a resource plan: configured instances
/// only. Renders 204 when there are none.
pub async fn list_plan_routers<S: PlanStore>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, HandlerError> {
    require_permission(&identity, Permission::AppCreate, &request_id.0)?;

    let catalog = state
        .catalog
        .plan_selectable_catalog()
        .map_err(|e| plan_error_response(e, &request_id.0))?;
    match catalog {
        Some(routers) if !routers.is_empty() => Ok(Json(routers).into_response()),
        _ => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Create a plan. 400 on validation failure, 409 on a duplicate name.
pub async fn create_plan<S: PlanStore>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    Json(plan): Json<Plan>,
) -> Result<(StatusCode, Json<Plan>), HandlerError> {
    require_permission(&identity, Permission::PlanCreate, &request_id.0)?;

    state
        .plans
        .save(&plan)
        .map_err(|e| plan_error_response(e, &request_id.0))?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// List stored plans; 204 when none exist. Any authenticated caller.
pub async fn list_plans<S: PlanStore>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Response, HandlerError> {
    let plans = state
        .plans
        .list()
        .map_err(|e| plan_error_response(e, &request_id.0))?;
    if plans.is_empty() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(Json(plans).into_response())
    }
}

/// Remove a plan by name. 404 when no such plan exists.
pub async fn remove_plan<S: PlanStore>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    Path(name): Path<String>,
) -> Result<StatusCode, HandlerError> {
    require_permission(&identity, Permission::PlanDelete, &request_id.0)?;

    state
        .plans
        .remove(&name)
        .map_err(|e| plan_error_response(e, &request_id.0))?;
    Ok(StatusCode::OK)
}
