//! JSON REST API for Troth.
//!
//! Exposes an axum [`Router`] backed by a [`troth_store_sqlite::Database`].
//! Every route except the login group requires a bearer token; mutating
//! routes are gated on the caller's role.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", troth_api::api_router(state))
//! ```

pub mod addresses;
pub mod auth;
pub mod contacts;
pub mod error;
pub mod events;
pub mod login;
pub mod names;
pub mod people;
pub mod permissions;
pub mod settings;
pub mod users;
pub mod wedding;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use troth_core::Page;
use troth_store_sqlite::Database;

pub use auth::JwtConfig;
pub use error::ApiError;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub db:                Arc<Database>,
  pub auth:              Arc<JwtConfig>,
  /// Whether `POST /users/open` (self sign-up) is enabled.
  pub open_registration: bool,
}

/// `?skip=<n>&limit=<n>` pagination, shared by all list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub skip:  Option<u64>,
  pub limit: Option<u64>,
}

impl From<PageParams> for Page {
  fn from(p: PageParams) -> Self {
    Page::new(p.skip, p.limit)
  }
}

/// Build a fully-materialised API router for `state`.
pub fn api_router(state: AppState) -> Router<()> {
  Router::new()
    // Login
    .route("/login/access-token", post(login::access_token))
    .route("/login/test-token", post(login::test_token))
    .route("/password-recovery/{email}", post(login::recover_password))
    .route("/reset-password", post(login::reset_password))
    // Users
    .route("/users", post(users::create).get(users::list))
    .route("/users/open", post(users::create_open))
    .route("/users/me", get(users::me).put(users::update_me))
    .route(
      "/users/{id}",
      get(users::get_one).put(users::update_one).delete(users::delete_one),
    )
    // People
    .route("/people", post(people::create).get(people::list))
    .route("/people/me", get(people::me).put(people::update_me))
    .route(
      "/people/{id}",
      get(people::get_one)
        .put(people::update_one)
        .delete(people::delete_one),
    )
    // Names
    .route("/names", post(names::create).get(names::list))
    .route(
      "/names/{id}",
      get(names::get_one).put(names::update_one).delete(names::delete_one),
    )
    // Addresses
    .route("/addresses", post(addresses::create).get(addresses::list))
    .route(
      "/addresses/{id}",
      get(addresses::get_one)
        .put(addresses::update_one)
        .delete(addresses::delete_one),
    )
    // Contact info
    .route("/contacts", post(contacts::create).get(contacts::list))
    .route(
      "/contacts/{id}",
      get(contacts::get_one)
        .put(contacts::update_one)
        .delete(contacts::delete_one),
    )
    // Events
    .route("/events", post(events::create).get(events::list))
    .route("/events/all", get(events::list_all))
    .route(
      "/events/{id}",
      get(events::get_one)
        .put(events::update_one)
        .delete(events::delete_one),
    )
    // Settings
    .route(
      "/config/settings",
      post(settings::create).get(settings::list),
    )
    .route("/config/settings/name/{name}", get(settings::get_by_name))
    .route(
      "/config/settings/{id}",
      get(settings::get_one)
        .put(settings::update_one)
        .delete(settings::delete_one),
    )
    // Permissions and grants
    .route(
      "/config/permissions",
      post(permissions::create).get(permissions::list),
    )
    .route(
      "/config/permissions/{id}",
      get(permissions::get_one)
        .put(permissions::update_one)
        .delete(permissions::delete_one),
    )
    .route(
      "/config/grants",
      post(permissions::grant).get(permissions::grants),
    )
    .route(
      "/config/grants/{id}",
      get(permissions::get_grant)
        .put(permissions::update_grant)
        .delete(permissions::delete_grant),
    )
    // Wedding info
    .route(
      "/wedding/info",
      get(wedding::get_info)
        .post(wedding::create_info)
        .put(wedding::update_info),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use troth_core::{Repository as _, user::UserCreate};
  use uuid::Uuid;

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
    is_poweruser: bool,
    is_superuser: bool,
  ) -> String {
    let uow = state.db.unit_of_work().await.unwrap();
    let user = uow
      .users()
      .create(UserCreate {
        email: email.to_string(),
        password: "s3cret".to_string(),
        is_active: true,
        is_poweruser,
        is_superuser,
        person: None,
      })
      .await
      .unwrap();
    state.auth.issue_access_token(user.uid).unwrap()
  }

  async fn oneshot_json(
    state: AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder =
        builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();

    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── Login ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_round_trip() {
    let state = make_state().await;
    make_user(&state, "ada@example.com", false, false).await;

    let (status, body) = oneshot_json(
      state.clone(),
      "POST",
      "/login/access-token",
      None,
      Some(json!({ "email": "ada@example.com", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "bearer");

    let token = body["accessToken"].as_str().unwrap().to_string();
    let (status, body) =
      oneshot_json(state, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    // The hash never leaves the server.
    assert!(body.get("hashedPassword").is_none());
  }

  #[tokio::test]
  async fn login_with_wrong_password_is_401() {
    let state = make_state().await;
    make_user(&state, "ada@example.com", false, false).await;

    let (status, _) = oneshot_json(
      state,
      "POST",
      "/login/access-token",
      None,
      Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Role gates ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn plain_user_cannot_write_names() {
    let state = make_state().await;
    let plain = make_user(&state, "a@example.com", false, false).await;
    let power = make_user(&state, "b@example.com", true, false).await;

    let payload = json!({ "first": "Ada", "last": "Lovelace" });
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/names",
      Some(&plain),
      Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
      oneshot_json(state.clone(), "POST", "/names", Some(&power), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first"], "Ada");

    // Reads are open to any active user.
    let (status, body) =
      oneshot_json(state, "GET", "/names", Some(&plain), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn unauthenticated_request_is_401() {
    let state = make_state().await;
    let (status, _) = oneshot_json(state, "GET", "/names", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Error mapping ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_row_is_404() {
    let state = make_state().await;
    let power = make_user(&state, "a@example.com", true, false).await;

    let uri = format!("/names/{}", Uuid::new_v4());
    let (status, body) =
      oneshot_json(state, "GET", &uri, Some(&power), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("does not exist"));
  }

  #[tokio::test]
  async fn duplicate_user_email_is_409() {
    let state = make_state().await;
    let sup = make_user(&state, "root@example.com", false, true).await;

    let payload = json!({ "email": "dup@example.com", "password": "pw" });
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/users",
      Some(&sup),
      Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
      oneshot_json(state, "POST", "/users", Some(&sup), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn open_registration_gate() {
    let state = make_state().await;
    let payload = json!({ "email": "new@example.com", "password": "pw" });

    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/users/open",
      None,
      Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut open = state.clone();
    open.open_registration = true;
    let (status, body) =
      oneshot_json(open, "POST", "/users/open", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isSuperuser"], false);
  }

  // ── Wedding singleton ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn second_wedding_is_409() {
    let state = make_state().await;
    let sup = make_user(&state, "root@example.com", false, true).await;

    let payload = json!({
      "wedding": { "name": "ceremony", "date": "2026-06-20" }
    });
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/wedding/info",
      Some(&sup),
      Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/wedding/info",
      Some(&sup),
      Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) =
      oneshot_json(state, "GET", "/wedding/info", Some(&sup), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wedding"]["name"], "ceremony");
  }
}
