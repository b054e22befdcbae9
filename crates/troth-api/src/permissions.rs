//! Handlers for `/config/permissions` and `/config/grants` endpoints.
//! Everything here is superuser-only.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Repository as _,
  permission::{
    Permission, PermissionCreate, PermissionUpdate, UserPermission,
    UserPermissionCreate, UserPermissionUpdate,
  },
};
use uuid::Uuid;

use crate::{AppState, PageParams, auth::Superuser, error::ApiError};

// ─── Permissions ─────────────────────────────────────────────────────────────

/// `POST /config/permissions`
pub async fn create(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Json(body): Json<PermissionCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let permission =
    uow.with_scope(uow.config().permissions().create(body)).await?;
  Ok((StatusCode::CREATED, Json(permission)))
}

/// `GET /config/permissions?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Permission>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.config().permissions().all(page.into()).await?))
}

/// `GET /config/permissions/:id`
pub async fn get_one(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<Permission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.config().permissions().get_required(id).await?))
}

/// `PUT /config/permissions/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
  Json(patch): Json<PermissionUpdate>,
) -> Result<Json<Permission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.config().permissions().get_required(id).await?;
  let permission = uow
    .with_scope(uow.config().permissions().update(current, patch))
    .await?;
  Ok(Json(permission))
}

/// `DELETE /config/permissions/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<Permission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let permission = uow.config().permissions().get_required(id).await?;
  let permission =
    uow.with_scope(uow.config().permissions().delete(permission)).await?;
  Ok(Json(permission))
}

// ─── Grants ──────────────────────────────────────────────────────────────────

/// `POST /config/grants`
pub async fn grant(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Json(body): Json<UserPermissionCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let grant =
    uow.with_scope(uow.config().user_permissions().create(body)).await?;
  Ok((StatusCode::CREATED, Json(grant)))
}

/// `GET /config/grants?skip=<n>&limit=<n>`
pub async fn grants(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<UserPermission>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.config().user_permissions().all(page.into()).await?))
}

/// `GET /config/grants/:id`
pub async fn get_grant(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<UserPermission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.config().user_permissions().get_required(id).await?))
}

/// `PUT /config/grants/:id`
pub async fn update_grant(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
  Json(patch): Json<UserPermissionUpdate>,
) -> Result<Json<UserPermission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.config().user_permissions().get_required(id).await?;
  let grant = uow
    .with_scope(uow.config().user_permissions().update(current, patch))
    .await?;
  Ok(Json(grant))
}

/// `DELETE /config/grants/:id`
pub async fn delete_grant(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<UserPermission>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let grant = uow.config().user_permissions().get_required(id).await?;
  let grant =
    uow.with_scope(uow.config().user_permissions().delete(grant)).await?;
  Ok(Json(grant))
}
