/**
 * Experiment Handlers
 *
 * Each handler extracts the caller from the identity middleware, calls the
 * engine and serializes the result. Errors are `BackendError`s and render
 * themselves, including the 409 conflict payload.
 *
 * Body, path and query extraction failures are taken as `Result`s and
 * converted, so malformed input answers 400 with the usual JSON error body
 * instead of axum's plain-text rejection.
 */

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::versioning::VersionControl;
use crate::shared::{
    AppendVersionRequest, CreateExperimentRequest, Experiment, ExperimentSummary,
    ExperimentView, ListQuery, UpdateExperimentRequest, Version,
};

/// Query string of the public view endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub version_id: Option<Uuid>,
}

/// Body returned after a soft delete
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Create an experiment with its first version
///
/// # Errors
///
/// * `400 Bad Request` - If the body is malformed or the title is blank
pub async fn create_experiment(
    State(engine): State<VersionControl>,
    AuthUser(user): AuthUser,
    request: Result<Json<CreateExperimentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExperimentView>), BackendError> {
    let Json(request) = request?;
    let view = engine.create_experiment(request, &user.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Live experiments, most recently updated first
pub async fn list_experiments(
    State(engine): State<VersionControl>,
    AuthUser(_user): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ExperimentSummary>>, BackendError> {
    let Query(query) = query?;
    let filter = query.to_filter()?;
    Ok(Json(engine.list_experiments(&filter).await?))
}

pub async fn get_experiment(
    State(engine): State<VersionControl>,
    AuthUser(_user): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ExperimentView>, BackendError> {
    let Path(id) = id?;
    Ok(Json(engine.get_experiment(id).await?))
}

pub async fn update_experiment(
    State(engine): State<VersionControl>,
    AuthUser(user): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<UpdateExperimentRequest>, JsonRejection>,
) -> Result<Json<Experiment>, BackendError> {
    let Path(id) = id?;
    let Json(request) = request?;
    Ok(Json(engine.update_experiment(id, request, &user.id).await?))
}

pub async fn delete_experiment(
    State(engine): State<VersionControl>,
    AuthUser(user): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, BackendError> {
    let Path(id) = id?;
    engine.delete_experiment(id, &user.id).await?;
    Ok(Json(DeleteResponse {
        message: "Experiment deleted successfully".to_string(),
    }))
}

/// Append a version
///
/// # Errors
///
/// * `404 Not Found` - If the experiment is absent or deleted
/// * `409 Conflict` - If `base_version_number` is stale; the body carries
///   `current_version`, `your_version`, `last_updated_by` and `last_updated_at`
pub async fn append_version(
    State(engine): State<VersionControl>,
    AuthUser(user): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<AppendVersionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Version>), BackendError> {
    let Path(id) = id?;
    let Json(request) = request?;
    let version = engine.append_version(id, request, &user.id).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// Versions of an experiment, newest first
pub async fn version_history(
    State(engine): State<VersionControl>,
    AuthUser(_user): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Version>>, BackendError> {
    let Path(id) = id?;
    let Query(query) = query?;
    let filter = query.to_filter()?;
    Ok(Json(engine.version_history(id, &filter).await?))
}

pub async fn checkout_version(
    State(engine): State<VersionControl>,
    AuthUser(user): AuthUser,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<Version>, BackendError> {
    let Path((id, version_id)) = ids?;
    Ok(Json(engine.checkout_version(id, version_id, &user.id).await?))
}

/// Read-only view for sharing; needs no identity
pub async fn view_experiment(
    State(engine): State<VersionControl>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Result<Json<ExperimentView>, BackendError> {
    let Path(id) = id?;
    let Query(query) = query?;
    Ok(Json(engine.view_experiment(id, query.version_id).await?))
}
