use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::Project;
use crate::provisioning::{ProjectInput, Provisioned};
use crate::state::SharedState;

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state.directory.list_for_user(auth.user_id).await?;
    Ok(Json(projects))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<Json<Provisioned>, AppError> {
    let Json(req) = payload.map_err(|rejection| match rejection.status() {
        StatusCode::UNPROCESSABLE_ENTITY => AppError::Unprocessable(rejection.body_text()),
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::UnsupportedMediaType(rejection.body_text()),
        _ => AppError::BadRequest(rejection.body_text()),
    })?;

    let provisioned = state.provisioner.provision(auth.user_id, &req).await?;
    Ok(Json(provisioned))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .directory
        .find_for_user(&slug, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}

/// Anything but GET or POST on the collection. Unauthenticated callers still get a 401.
pub async fn method_not_allowed(_auth: AuthUser, method: Method) -> AppError {
    AppError::MethodNotAllowed {
        method,
        allow: "GET, POST",
    }
}
