//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use troth_core::Error;

/// An error returned by an API handler. Thin wrapper over the core error so
/// handlers can use `?` on repository calls directly.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
  fn from(err: Error) -> Self {
    Self(err)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::NotFound { .. } => StatusCode::NOT_FOUND,
      Error::Exists { .. } => StatusCode::CONFLICT,
      Error::Invalid(_) => StatusCode::BAD_REQUEST,
      Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Error::Privilege(_) => StatusCode::FORBIDDEN,
      Error::ScopeActive | Error::Storage(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self.0, "internal error");
    }

    let body = Json(json!({ "error": self.0.to_string() }));
    if status == StatusCode::UNAUTHORIZED {
      return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body)
        .into_response();
    }
    (status, body).into_response()
  }
}
