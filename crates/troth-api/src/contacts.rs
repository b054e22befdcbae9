//! Handlers for `/contacts` endpoints. Reads need an active user, writes
//! the poweruser role.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Repository as _,
  contact::{ContactInfo, ContactInfoCreate, ContactInfoUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Poweruser},
  error::ApiError,
};

/// `POST /contacts`
pub async fn create(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(body): Json<ContactInfoCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let contact = uow.with_scope(uow.contacts().create(body)).await?;
  Ok((StatusCode::CREATED, Json(contact)))
}

/// `GET /contacts?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<ContactInfo>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.contacts().all(page.into()).await?))
}

/// `GET /contacts/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<ContactInfo>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.contacts().get_required(id).await?))
}

/// `PUT /contacts/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
  Json(patch): Json<ContactInfoUpdate>,
) -> Result<Json<ContactInfo>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.contacts().get_required(id).await?;
  let contact = uow.with_scope(uow.contacts().update(current, patch)).await?;
  Ok(Json(contact))
}

/// `DELETE /contacts/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
) -> Result<Json<ContactInfo>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let contact = uow.contacts().get_required(id).await?;
  let contact = uow.with_scope(uow.contacts().delete(contact)).await?;
  Ok(Json(contact))
}
