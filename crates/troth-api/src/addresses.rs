//! Handlers for `/addresses` endpoints. Reads need an active user, writes
//! the poweruser role.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Repository as _,
  address::{Address, AddressCreate, AddressUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Poweruser},
  error::ApiError,
};

/// `POST /addresses`
pub async fn create(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(body): Json<AddressCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let address = uow.with_scope(uow.addresses().create(body)).await?;
  Ok((StatusCode::CREATED, Json(address)))
}

/// `GET /addresses?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Address>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.addresses().all(page.into()).await?))
}

/// `GET /addresses/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Address>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.addresses().get_required(id).await?))
}

/// `PUT /addresses/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
  Json(patch): Json<AddressUpdate>,
) -> Result<Json<Address>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.addresses().get_required(id).await?;
  let address =
    uow.with_scope(uow.addresses().update(current, patch)).await?;
  Ok(Json(address))
}

/// `DELETE /addresses/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
) -> Result<Json<Address>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let address = uow.addresses().get_required(id).await?;
  let address = uow.with_scope(uow.addresses().delete(address)).await?;
  Ok(Json(address))
}
