//! Runtime server configuration, deserialised from `config.toml` and the
//! `TROTH_*` environment.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,

  pub db_path:    PathBuf,
  /// HS256 signing key for access and reset tokens.
  pub secret_key: String,

  /// Eight days, matching the default session length of the web frontend.
  #[serde(default = "default_token_minutes")]
  pub access_token_expire_minutes: i64,

  /// Whether `POST /users/open` (self sign-up) is enabled.
  #[serde(default)]
  pub open_registration: bool,

  /// If both are set, this account is created at startup when missing.
  #[serde(default)]
  pub superuser_email:    Option<String>,
  #[serde(default)]
  pub superuser_password: Option<String>,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8000
}

fn default_token_minutes() -> i64 {
  60 * 24 * 8
}
