//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Role |
//! |--------|------|------|
//! | `POST` | `/users` | superuser |
//! | `POST` | `/users/open` | none (when open registration is enabled) |
//! | `GET`  | `/users` | superuser |
//! | `GET`  | `/users/me` | any authenticated |
//! | `PUT`  | `/users/me` | any active (role fields refused) |
//! | `GET`  | `/users/:id` | self or superuser |
//! | `PUT`  | `/users/:id` | superuser (own superuser flag locked) |
//! | `DELETE` | `/users/:id` | superuser, not on themselves |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use troth_core::{
  Error, Repository as _,
  person::PersonCreate,
  refs::CreateRef,
  user::{User, UserCreate, UserUpdate},
};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::{ActiveUser, CurrentUser, Superuser},
  error::ApiError,
};

/// `POST /users`
pub async fn create(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Json(body): Json<UserCreate>,
) -> Result<impl IntoResponse, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let user = uow.with_scope(uow.users().create(body)).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// Self sign-up body: roles are not caller-controlled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenUserBody {
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub person:   Option<CreateRef<PersonCreate>>,
}

/// `POST /users/open` — self sign-up, gated by configuration.
pub async fn create_open(
  State(state): State<AppState>,
  Json(body): Json<OpenUserBody>,
) -> Result<impl IntoResponse, ApiError> {
  if !state.open_registration {
    return Err(
      Error::Privilege("open registration is disabled".to_string()).into(),
    );
  }

  let new = UserCreate {
    email:        body.email,
    password:     body.password,
    is_active:    true,
    is_poweruser: false,
    is_superuser: false,
    person:       body.person,
  };

  let uow = state.db.unit_of_work().await?;
  let user = uow.with_scope(uow.users().create(new)).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users?skip=<n>&limit=<n>`
pub async fn list(
  State(state): State<AppState>,
  Superuser(_): Superuser,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<User>>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.users().all(page.into()).await?))
}

/// `GET /users/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
  Json(user)
}

/// `PUT /users/me` — a user may change their own email, password, and
/// person, never their roles or active flag.
pub async fn update_me(
  State(state): State<AppState>,
  ActiveUser(user): ActiveUser,
  Json(patch): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
  if !patch.is_active.is_absent()
    || !patch.is_poweruser.is_absent()
    || !patch.is_superuser.is_absent()
  {
    return Err(
      Error::Privilege("cannot change own role or active flag".to_string())
        .into(),
    );
  }

  let uow = state.db.unit_of_work().await?;
  let user = uow.with_scope(uow.users().update(user, patch)).await?;
  Ok(Json(user))
}

/// `GET /users/:id`
pub async fn get_one(
  State(state): State<AppState>,
  ActiveUser(caller): ActiveUser,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  if caller.uid != id && !caller.is_superuser {
    return Err(
      Error::Privilege("superuser role required".to_string()).into(),
    );
  }

  let uow = state.db.unit_of_work().await?;
  Ok(Json(uow.users().get_required(id).await?))
}

/// `PUT /users/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Superuser(caller): Superuser,
  Path(id): Path<Uuid>,
  Json(patch): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
  if caller.uid == id && !patch.is_superuser.is_absent() {
    return Err(
      Error::Privilege(
        "superusers cannot change their own superuser flag".to_string(),
      )
      .into(),
    );
  }

  let uow = state.db.unit_of_work().await?;
  let current = uow.users().get_required(id).await?;
  let user = uow.with_scope(uow.users().update(current, patch)).await?;
  Ok(Json(user))
}

/// `DELETE /users/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Superuser(caller): Superuser,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  if caller.uid == id {
    return Err(
      Error::Invalid("superusers cannot delete themselves".to_string()).into(),
    );
  }

  let uow = state.db.unit_of_work().await?;
  let user = uow.users().get_required(id).await?;
  let user = uow.with_scope(uow.users().delete(user)).await?;
  Ok(Json(user))
}
