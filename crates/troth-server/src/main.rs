//! Troth server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite database, and serves the JSON API under `/api`.
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string by hand (e.g. for manual database
//! surgery):
//!
//! ```
//! cargo run -p troth-server -- --hash-password
//! ```

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use troth_api::{AppState, JwtConfig};
use troth_core::{Repository as _, security, user::UserCreate};
use troth_store_sqlite::Database;

use settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Troth wedding administration server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create the configured superuser account (if missing) and exit without
  /// serving.
  #[arg(long)]
  init_superuser: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = password_from_stdin()?;
    let hash = security::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let raw = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TROTH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = raw
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the database.
  let db_path = expand_tilde(&server_cfg.db_path);
  let db = Database::open(&db_path)
    .await
    .with_context(|| format!("failed to open database at {db_path:?}"))?;

  bootstrap_superuser(&db, &server_cfg).await?;
  if cli.init_superuser {
    return Ok(());
  }

  // Build application state.
  let state = AppState {
    db:                Arc::new(db),
    auth:              Arc::new(JwtConfig {
      secret:                      server_cfg.secret_key.clone(),
      access_token_expire_minutes: server_cfg.access_token_expire_minutes,
    }),
    open_registration: server_cfg.open_registration,
  };

  let app =
    axum::Router::new().nest("/api", troth_api::api_router(state));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Create the configured superuser account if it does not exist yet.
async fn bootstrap_superuser(
  db: &Database,
  cfg: &ServerConfig,
) -> anyhow::Result<()> {
  let (Some(email), Some(password)) =
    (&cfg.superuser_email, &cfg.superuser_password)
  else {
    return Ok(());
  };

  let uow = db.unit_of_work().await?;
  if uow.users().get_by_email(email).await?.is_some() {
    return Ok(());
  }

  uow
    .with_scope(uow.users().create(UserCreate {
      email:        email.clone(),
      password:     password.clone(),
      is_active:    true,
      is_poweruser: false,
      is_superuser: true,
      person:       None,
    }))
    .await?;
  tracing::info!(%email, "created superuser account");
  Ok(())
}

/// Read a password from stdin.
fn password_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
