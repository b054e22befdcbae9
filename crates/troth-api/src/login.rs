//! Handlers for the login group.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login/access-token` | Body: [`Credentials`]; returns a bearer token |
//! | `POST` | `/login/test-token` | Returns the caller's user record |
//! | `POST` | `/password-recovery/:email` | Issues a reset token (logged, not mailed) |
//! | `POST` | `/reset-password` | Body: [`ResetBody`] |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use troth_core::{Error, Field, Repository as _, user::User, user::UserUpdate};

use crate::{
  AppState,
  auth::{ActiveUser, TokenKind},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   &'static str,
}

/// `POST /login/access-token`
pub async fn access_token(
  State(state): State<AppState>,
  Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let user = uow
    .users()
    .authenticate(&body.email, &body.password)
    .await?
    .ok_or_else(|| {
      Error::Unauthorized("incorrect email or password".to_string())
    })?;

  if !user.is_active {
    return Err(Error::Invalid("inactive user".to_string()).into());
  }

  Ok(Json(TokenResponse {
    access_token: state.auth.issue_access_token(user.uid)?,
    token_type:   "bearer",
  }))
}

/// `POST /login/test-token` — echoes the authenticated user.
pub async fn test_token(ActiveUser(user): ActiveUser) -> Json<User> {
  Json(user)
}

#[derive(Debug, Serialize)]
pub struct Message {
  pub message: String,
}

/// `POST /password-recovery/:email`
///
/// There is no mail pipeline; the reset token is written to the log for an
/// operator to relay.
pub async fn recover_password(
  State(state): State<AppState>,
  Path(email): Path<String>,
) -> Result<Json<Message>, ApiError> {
  let uow = state.db.unit_of_work().await?;
  let user = uow
    .users()
    .get_by_email(&email)
    .await?
    .ok_or_else(|| Error::not_found("user", "email", &email))?;

  let token = state.auth.issue_reset_token(user.uid)?;
  tracing::info!(%email, %token, "password reset token issued");

  Ok(Json(Message {
    message: "password recovery initiated".to_string(),
  }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBody {
  pub token:        String,
  pub new_password: String,
}

/// `POST /reset-password`
pub async fn reset_password(
  State(state): State<AppState>,
  Json(body): Json<ResetBody>,
) -> Result<Json<Message>, ApiError> {
  let claims = state.auth.verify(&body.token, TokenKind::Reset)?;

  let uow = state.db.unit_of_work().await?;
  let user = uow.users().get_required(claims.sub).await?;
  if !user.is_active {
    return Err(Error::Invalid("inactive user".to_string()).into());
  }

  let patch = UserUpdate {
    password: Field::Set(body.new_password),
    ..Default::default()
  };
  uow.with_scope(uow.users().update(user, patch)).await?;

  Ok(Json(Message {
    message: "password updated".to_string(),
  }))
}
