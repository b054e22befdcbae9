//! Handlers for the `/wedding` singleton.
//!
//! There is exactly one wedding per deployment. `POST` creates it once,
//! `PUT` patches its slots.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use troth_core::wedding::{
  WeddingInfo, WeddingInfoCreate, WeddingInfoUpdate,
};

use crate::{
  AppState,
  auth::{ActiveUser, Poweruser, Superuser},
  error::ApiError,
};

/// `GET /wedding/info`
pub async fn get_info(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
) -> Result<Json<WeddingInfo>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.wedding().info().get_required().await?))
}

/// `POST /wedding/info` — 409 once the singleton exists.
pub async fn create_info(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Json(body): Json<WeddingInfoCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let info = uow.with_scope(uow.wedding().info().create(body)).await?;
  Ok((StatusCode::CREATED, Json(info)))
}

/// `PUT /wedding/info`
pub async fn update_info(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(patch): Json<WeddingInfoUpdate>,
) -> Result<Json<WeddingInfo>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.wedding().info().get_required().await?;
  let info =
    uow.with_scope(uow.wedding().info().update(current, patch)).await?;
  Ok(Json(info))
}
