//! Handlers for `/names` endpoints. Reads need an active user, writes the
//! poweruser role.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Repository as _,
  name::{Name, NameCreate, NameUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Poweruser},
  error::ApiError,
};

/// `POST /names`
pub async fn create(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(body): Json<NameCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let name = uow.with_scope(uow.names().create(body)).await?;
  Ok((StatusCode::CREATED, Json(name)))
}

/// `GET /names?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Name>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.names().all(page.into()).await?))
}

/// `GET /names/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Name>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.names().get_required(id).await?))
}

/// `PUT /names/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
  Json(patch): Json<NameUpdate>,
) -> Result<Json<Name>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.names().get_required(id).await?;
  let name = uow.with_scope(uow.names().update(current, patch)).await?;
  Ok(Json(name))
}

/// `DELETE /names/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
) -> Result<Json<Name>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let name = uow.names().get_required(id).await?;
  let name = uow.with_scope(uow.names().delete(name)).await?;
  Ok(Json(name))
}
