//! Handlers for `/people` endpoints.
//!
//! A plain user may read and edit the person linked to their own account;
//! everything else needs the poweruser role.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use troth_core::{
  Error, Repository as _,
  person::{Person, PersonCreate, PersonUpdate},
  refs::CreateRef,
  user::User,
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, Poweruser},
  error::ApiError,
};

fn own_person(user: &User) -> Result<&Person, Error> {
  user
    .person
    .as_ref()
    .ok_or_else(|| Error::not_found("person", "user", user.uid))
}

/// `POST /people`
pub async fn create(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Json(body): Json<PersonCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;

  // A name row links to at most one person.
  if let CreateRef::Id(name_id) = &body.name
    && uow.people().get_by_name_id(*name_id).await?.is_some()
  {
    return Err(Error::exists("person", "name", name_id).into());
  }

  let person = uow.with_scope(uow.people().create(body)).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /people?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.people().all(page.into()).await?))
}

/// `GET /people/me`
pub async fn me(
  ActiveUser(user): ActiveUser,
) -> Result<Json<Person>, ApiError> {
  Ok(Json(own_person(&user)?.clone()))
}

/// `PUT /people/me`
pub async fn update_me(
  State(state): State<AppState>,
  ActiveUser(user): ActiveUser,
  Json(patch): Json<PersonUpdate>,
) -> Result<Json<Person>, ApiError> {
  let current = own_person(&user)?.clone();
  let uow = state.db.unit_of_work().await?;
  let person = uow.with_scope(uow.people().update(current, patch)).await?;
  Ok(Json(person))
}

fn check_self_or_poweruser(user: &User, id: Uuid) -> Result<(), Error> {
  let own = user.person.as_ref().map(|p| p.uid);
  if own != Some(id) && !user.has_poweruser() {
    return Err(Error::Privilege("poweruser role required".to_string()));
  }
  Ok(())
}

/// `GET /people/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(caller): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  check_self_or_poweruser(&caller, id)?;
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.people().get_required(id).await?))
}

/// `PUT /people/:id`
pub async fn update_one(
  State(state): State<AppState>,
  ActiveUser(caller): ActiveUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<PersonUpdate>,
) -> Result<Json<Person>, ApiError> {
  check_self_or_poweruser(&caller, id)?;
  let uow = state.db.unit_of_work().await?;
  let current = uow.people().get_required(id).await?;
  let person = uow.with_scope(uow.people().update(current, patch)).await?;
  Ok(Json(person))
}

/// `DELETE /people/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Poweruser(_): Poweruser,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let person = uow.people().get_required(id).await?;
  let person = uow.with_scope(uow.people().delete(person)).await?;
  Ok(Json(person))
}
