//! Bearer-token auth: JWT issue/verify and the role-gated extractors.
//!
//! Tokens are HS256 JWTs carrying the user's uid and a kind discriminant so
//! a password-reset token can never pass as an access token.

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use troth_core::{Error, Repository as _, Result, user::User};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Lifetime of a password-reset token.
const RESET_TOKEN_HOURS: i64 = 48;

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// What a token is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Reset,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// User uid.
  pub sub:  Uuid,
  /// Unix expiry timestamp.
  pub exp:  i64,
  pub kind: TokenKind,
}

/// Signing configuration shared by all handlers.
#[derive(Clone)]
pub struct JwtConfig {
  pub secret:                      String,
  pub access_token_expire_minutes: i64,
}

impl JwtConfig {
  pub fn issue_access_token(&self, user_uid: Uuid) -> Result<String> {
    let exp = Utc::now() + Duration::minutes(self.access_token_expire_minutes);
    self.issue(user_uid, exp.timestamp(), TokenKind::Access)
  }

  pub fn issue_reset_token(&self, user_uid: Uuid) -> Result<String> {
    let exp = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);
    self.issue(user_uid, exp.timestamp(), TokenKind::Reset)
  }

  fn issue(&self, sub: Uuid, exp: i64, kind: TokenKind) -> Result<String> {
    let claims = Claims { sub, exp, kind };
    jsonwebtoken::encode(
      &Header::default(),
      &claims,
      &EncodingKey::from_secret(self.secret.as_bytes()),
    )
    .map_err(Error::storage)
  }

  /// Decode a token and check its signature, expiry, and kind.
  pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims> {
    let data = jsonwebtoken::decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.secret.as_bytes()),
      &Validation::default(),
    )
    .map_err(|_| Error::Unauthorized("invalid token".to_string()))?;

    if data.claims.kind != kind {
      return Err(Error::Unauthorized("wrong token kind".to_string()));
    }
    Ok(data.claims)
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn bearer_token(parts: &Parts) -> Result<&str> {
  parts
    .headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))
}

async fn load_current_user(
  parts: &Parts,
  state: &AppState,
) -> Result<User> {
  let claims = state.auth.verify(bearer_token(parts)?, TokenKind::Access)?;
  let uow = state.db.unit_of_work().await?;
  uow.users().get_required(claims.sub).await
}

/// The user named by the bearer token, whatever their state.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    Ok(Self(load_current_user(parts, state).await?))
  }
}

/// An authenticated user whose account is active.
#[derive(Debug)]
pub struct ActiveUser(pub User);

impl FromRequestParts<AppState> for ActiveUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let user = load_current_user(parts, state).await?;
    if !user.is_active {
      return Err(Error::Invalid("inactive user".to_string()).into());
    }
    Ok(Self(user))
  }
}

/// An active user holding at least the poweruser role. Superusers qualify.
#[derive(Debug)]
pub struct Poweruser(pub User);

impl FromRequestParts<AppState> for Poweruser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let ActiveUser(user) = ActiveUser::from_request_parts(parts, state).await?;
    if !user.has_poweruser() {
      return Err(
        Error::Privilege("poweruser role required".to_string()).into(),
      );
    }
    Ok(Self(user))
  }
}

/// An active superuser.
#[derive(Debug)]
pub struct Superuser(pub User);

impl FromRequestParts<AppState> for Superuser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let ActiveUser(user) = ActiveUser::from_request_parts(parts, state).await?;
    if !user.is_superuser {
      return Err(
        Error::Privilege("superuser role required".to_string()).into(),
      );
    }
    Ok(Self(user))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{body::Body, http::Request};
  use troth_core::{Repository as _, user::UserCreate};
  use troth_store_sqlite::Database;

  use super::*;

  async fn make_state() -> AppState {
    AppState {
      db:                Arc::new(Database::open_in_memory().await.unwrap()),
      auth:              Arc::new(JwtConfig {
        secret:                      "test-secret".to_string(),
        access_token_expire_minutes: 15,
      }),
      open_registration: false,
    }
  }

  async fn make_user(
    state: &AppState,
    email: &str,
    is_active: bool,
    is_poweruser: bool,
    is_superuser: bool,
  ) -> User {
    let uow = state.db.unit_of_work().await.unwrap();
    uow
      .users()
      .create(UserCreate {
        email: email.to_string(),
        password: "pw".to_string(),
        is_active,
        is_poweruser,
        is_superuser,
        person: None,
      })
      .await
      .unwrap()
  }

  fn request_with(token: &str) -> Parts {
    let req = Request::builder()
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty())
      .unwrap();
    req.into_parts().0
  }

  #[tokio::test]
  async fn valid_token_resolves_user() {
    let state = make_state().await;
    let user = make_user(&state, "a@example.com", true, false, false).await;
    let token = state.auth.issue_access_token(user.uid).unwrap();

    let mut parts = request_with(&token);
    let ActiveUser(got) =
      ActiveUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(got.uid, user.uid);
  }

  #[tokio::test]
  async fn missing_header_is_unauthorized() {
    let state = make_state().await;
    let req = Request::builder().body(Body::empty()).unwrap();
    let mut parts = req.into_parts().0;

    let err = CurrentUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert!(matches!(err.0, Error::Unauthorized(_)));
  }

  #[tokio::test]
  async fn garbage_token_is_unauthorized() {
    let state = make_state().await;
    let mut parts = request_with("not-a-jwt");

    let err = CurrentUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert!(matches!(err.0, Error::Unauthorized(_)));
  }

  #[tokio::test]
  async fn token_signed_with_other_secret_is_unauthorized() {
    let state = make_state().await;
    let user = make_user(&state, "a@example.com", true, false, false).await;

    let other = JwtConfig {
      secret:                      "other-secret".to_string(),
      access_token_expire_minutes: 15,
    };
    let token = other.issue_access_token(user.uid).unwrap();
    let mut parts = request_with(&token);

    let err = CurrentUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert!(matches!(err.0, Error::Unauthorized(_)));
  }

  #[tokio::test]
  async fn reset_token_cannot_authenticate() {
    let state = make_state().await;
    let user = make_user(&state, "a@example.com", true, false, false).await;
    let token = state.auth.issue_reset_token(user.uid).unwrap();
    let mut parts = request_with(&token);

    let err = CurrentUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert!(matches!(err.0, Error::Unauthorized(_)));
  }

  #[tokio::test]
  async fn inactive_user_is_rejected() {
    let state = make_state().await;
    let user = make_user(&state, "a@example.com", false, false, false).await;
    let token = state.auth.issue_access_token(user.uid).unwrap();
    let mut parts = request_with(&token);

    let err = ActiveUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert!(matches!(err.0, Error::Invalid(_)));
  }

  #[tokio::test]
  async fn role_gates_stack() {
    let state = make_state().await;
    let plain = make_user(&state, "a@example.com", true, false, false).await;
    let power = make_user(&state, "b@example.com", true, true, false).await;
    let sup = make_user(&state, "c@example.com", true, false, true).await;

    // Plain user fails the poweruser gate.
    let token = state.auth.issue_access_token(plain.uid).unwrap();
    let mut parts = request_with(&token);
    let err =
      Poweruser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert!(matches!(err.0, Error::Privilege(_)));

    // Poweruser passes poweruser but fails superuser.
    let token = state.auth.issue_access_token(power.uid).unwrap();
    let mut parts = request_with(&token);
    assert!(Poweruser::from_request_parts(&mut parts, &state).await.is_ok());
    let mut parts = request_with(&token);
    let err =
      Superuser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert!(matches!(err.0, Error::Privilege(_)));

    // Superuser passes both gates.
    let token = state.auth.issue_access_token(sup.uid).unwrap();
    let mut parts = request_with(&token);
    assert!(Poweruser::from_request_parts(&mut parts, &state).await.is_ok());
    let mut parts = request_with(&token);
    assert!(Superuser::from_request_parts(&mut parts, &state).await.is_ok());
  }
}
