//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Upcoming by default; `?start`/`?end` bound the window |
//! | `GET`  | `/events/all` | Full history, poweruser only |
//! | `POST` | `/events` | poweruser |
//! | `GET` `PUT` `DELETE` | `/events/:id` | Reads active, writes poweruser |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use troth_core::{
  Page, Repository as _,
  event::{Event, EventCreate, EventUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Poweruser},
  error::ApiError,
};

/// `POST /events`
pub async fn create(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(body): Json<EventCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let event = uow.with_scope(uow.events().create(body)).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Inclusive lower bound. Defaults to today.
  pub start: Option<NaiveDate>,
  /// Exclusive upper bound.
  pub end:   Option<NaiveDate>,
  pub skip:  Option<u64>,
  pub limit: Option<u64>,
}

/// `GET /events[?start=...][&end=...]` — upcoming events unless bounds are
/// given.
pub async fn list(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
  let start = params.start.unwrap_or_else(|| Utc::now().date_naive());
  let page = Page::new(params.skip, params.limit);

  let uow = state.db.unit_of_work().await?;
  let events =
    uow.events().all_in_range(Some(start), params.end, page).await?;
  Ok(Json(events))
}

/// `GET /events/all` — every event, past included.
pub async fn list_all(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.events().all(page.into()).await?))
}

/// `GET /events/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(_): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.events().get_required(id).await?))
}

/// `PUT /events/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
  Json(patch): Json<EventUpdate>,
) -> Result<Json<Event>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let current = uow.events().get_required(id).await?;
  let event = uow.with_scope(uow.events().update(current, patch)).await?;
  Ok(Json(event))
}

/// `DELETE /events/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let event = uow.events().get_required(id).await?;
  let event = uow.with_scope(uow.events().delete(event)).await?;
  Ok(Json(event))
}
