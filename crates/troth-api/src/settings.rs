//! Handlers for `/config/settings` endpoints. Reads need an active user,
//! writes the superuser role.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Error, Repository as _,
  setting::{Setting, SettingCreate, SettingUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Superuser},
  error::ApiError,
};

/// `POST /config/settings`
pub async fn create(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Json(body): Json<SettingCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let setting = uow.with_scope(uow.config().settings().create(body)).await?;
  Ok((StatusCode::CREATED, Json(setting)))
}

/// `GET /config/settings?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Setting>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.config().settings().all(page.into()).await?))
}

/// A required setting with no value set yet is a configuration error, not a
/// readable state.
fn check_readable(setting: Setting) -> Result<Setting, Error> {
  if setting.required && setting.value.is_none() {
    return Err(Error::Invalid(format!(
      "required setting {} has no value",
      setting.name
    )));
  }
  Ok(setting)
}

/// `GET /config/settings/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Setting>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let setting = uow.config().settings().get_required(id).await?;
  Ok(Json(check_readable(setting)?))
}

/// `GET /config/settings/name/:name`
pub async fn get_by_name(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(name): Path<String>,
) -> Result<Json<Setting>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let setting = uow
    .config()
    .settings()
    .get_by_name(&name)
    .await?
    .ok_or_else(|| Error::not_found("setting", "name", &name))?;
  Ok(Json(check_readable(setting)?))
}

/// `PUT /config/settings/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
  Json(patch): Json<SettingUpdate>,
) -> Result<Json<Setting>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.config().settings().get_required(id).await?;
  let setting =
    uow.with_scope(uow.config().settings().update(current, patch)).await?;
  Ok(Json(setting))
}

/// `DELETE /config/settings/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<Setting>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let setting = uow.config().settings().get_required(id).await?;
  let setting =
    uow.with_scope(uow.config().settings().delete(setting)).await?;
  Ok(Json(setting))
}
