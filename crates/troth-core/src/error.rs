//! Error types for `troth-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} with {field} {value} does not exist")]
  NotFound {
    entity: &'static str,
    field:  &'static str,
    value:  String,
  },

  #[error("{entity} with {field} {value} already exists")]
  Exists {
    entity: &'static str,
    field:  &'static str,
    value:  String,
  },

  #[error("insufficient privileges: {0}")]
  Privilege(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("invalid: {0}")]
  Invalid(String),

  #[error("a transactional scope is already active")]
  ScopeActive,

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box an arbitrary backend error into the storage variant.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Storage(Box::new(err))
  }

  pub fn not_found(
    entity: &'static str,
    field: &'static str,
    value: impl ToString,
  ) -> Self {
    Error::NotFound { entity, field, value: value.to_string() }
  }

  pub fn exists(
    entity: &'static str,
    field: &'static str,
    value: impl ToString,
  ) -> Self {
    Error::Exists { entity, field, value: value.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
