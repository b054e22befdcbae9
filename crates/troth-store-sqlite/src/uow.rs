//! [`Database`] and [`UnitOfWork`] — connection lifecycle and transactional
//! scopes.
//!
//! A `Database` owns the canonical connection used for schema init and hands
//! out one fresh connection per [`UnitOfWork`]. A unit of work is the span
//! of one request: it lends out lazily-built repositories that all share its
//! connection, and it brackets mutations in a single transactional scope.

use std::{
  path::Path,
  sync::{
    OnceLock,
    atomic::{AtomicU32, Ordering},
  },
};

use tokio_rusqlite::Connection;
use troth_core::{Error, Result};
use uuid::Uuid;

use crate::{
  repos::{
    AddressRepo, ContactInfoRepo, EventRepo, NameRepo, PermissionRepo,
    PersonRepo, SettingRepo, UserPermissionRepo, UserRepo, WeddingInfoRepo,
  },
  schema::SCHEMA,
};

// Applied to every checked-out connection; journal mode is a property of the
// database file and is set once by the schema batch.
const CONN_PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
";

// ─── Database ────────────────────────────────────────────────────────────────

/// Handle to one SQLite database.
///
/// The anchor connection stays open for the life of the handle; for
/// shared-memory databases that is what keeps the contents alive between
/// per-request connections.
pub struct Database {
  uri:     String,
  _anchor: Connection,
}

impl Database {
  /// Open (or create) a database file at `path` and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_uri(path.as_ref().to_string_lossy().into_owned()).await
  }

  /// Open a private shared-memory database — useful for testing the full
  /// per-request connection flow without a file on disk.
  pub async fn open_in_memory() -> Result<Self> {
    let uri =
      format!("file:troth-{}?mode=memory&cache=shared", Uuid::new_v4());
    Self::open_uri(uri).await
  }

  async fn open_uri(uri: String) -> Result<Self> {
    let anchor = Connection::open(&uri).await.map_err(Error::storage)?;
    anchor
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    Ok(Self { uri, _anchor: anchor })
  }

  /// Check out a fresh connection wrapped in a [`UnitOfWork`]. One per
  /// request; scopes on different units never interleave on a connection.
  pub async fn unit_of_work(&self) -> Result<UnitOfWork> {
    let conn = Connection::open(&self.uri).await.map_err(Error::storage)?;
    conn
      .call(|conn| {
        conn.execute_batch(CONN_PRAGMAS)?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    Ok(UnitOfWork::new(conn))
  }
}

// ─── UnitOfWork ──────────────────────────────────────────────────────────────

/// One connection, one optional transactional scope, and the repositories
/// that share them.
///
/// Repositories are built on first access and cached for the life of the
/// unit. The scope guard is a 0/1 level: a `begin` while a scope is active
/// is refused rather than silently joined.
pub struct UnitOfWork {
  conn:  Connection,
  level: AtomicU32,

  names:     OnceLock<NameRepo>,
  addresses: OnceLock<AddressRepo>,
  contacts:  OnceLock<ContactInfoRepo>,
  people:    OnceLock<PersonRepo>,
  events:    OnceLock<EventRepo>,
  users:     OnceLock<UserRepo>,
  config:    OnceLock<ConfigRepos>,
  wedding:   OnceLock<WeddingRepos>,
}

impl UnitOfWork {
  pub(crate) fn new(conn: Connection) -> Self {
    Self {
      conn,
      level: AtomicU32::new(0),
      names: OnceLock::new(),
      addresses: OnceLock::new(),
      contacts: OnceLock::new(),
      people: OnceLock::new(),
      events: OnceLock::new(),
      users: OnceLock::new(),
      config: OnceLock::new(),
      wedding: OnceLock::new(),
    }
  }

  /// Open a standalone in-memory unit — useful for testing repositories
  /// directly.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().await.map_err(Error::storage)?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    Ok(Self::new(conn))
  }

  // ── Repositories ──────────────────────────────────────────────────────────

  pub fn names(&self) -> &NameRepo {
    self.names.get_or_init(|| NameRepo::new(self.conn.clone()))
  }

  pub fn addresses(&self) -> &AddressRepo {
    self.addresses.get_or_init(|| AddressRepo::new(self.conn.clone()))
  }

  pub fn contacts(&self) -> &ContactInfoRepo {
    self.contacts.get_or_init(|| ContactInfoRepo::new(self.conn.clone()))
  }

  pub fn people(&self) -> &PersonRepo {
    self.people.get_or_init(|| PersonRepo::new(self.conn.clone()))
  }

  pub fn events(&self) -> &EventRepo {
    self.events.get_or_init(|| EventRepo::new(self.conn.clone()))
  }

  pub fn users(&self) -> &UserRepo {
    self.users.get_or_init(|| UserRepo::new(self.conn.clone()))
  }

  pub fn config(&self) -> &ConfigRepos {
    self.config.get_or_init(|| ConfigRepos::new(self.conn.clone()))
  }

  pub fn wedding(&self) -> &WeddingRepos {
    self.wedding.get_or_init(|| WeddingRepos::new(self.conn.clone()))
  }

  // ── Transactional scope ───────────────────────────────────────────────────

  /// Open a transactional scope. Refused with [`Error::ScopeActive`] while
  /// another scope is open on this unit.
  pub async fn begin(&self) -> Result<()> {
    if self
      .level
      .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return Err(Error::ScopeActive);
    }

    let res = self
      .conn
      .call(|conn| {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
      })
      .await;

    if let Err(e) = res {
      self.level.store(0, Ordering::SeqCst);
      return Err(Error::storage(e));
    }
    Ok(())
  }

  pub async fn commit(&self) -> Result<()> {
    if self.level.load(Ordering::SeqCst) == 0 {
      return Err(Error::Invalid("no active scope to commit".to_string()));
    }
    self
      .conn
      .call(|conn| {
        conn.execute_batch("COMMIT")?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    self.level.store(0, Ordering::SeqCst);
    Ok(())
  }

  pub async fn rollback(&self) -> Result<()> {
    if self.level.load(Ordering::SeqCst) == 0 {
      return Err(Error::Invalid("no active scope to roll back".to_string()));
    }
    self
      .conn
      .call(|conn| {
        conn.execute_batch("ROLLBACK")?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    self.level.store(0, Ordering::SeqCst);
    Ok(())
  }

  /// Run `fut` inside a scope: commit on success, roll back on failure. The
  /// future's own error is what the caller sees, not the rollback's.
  pub async fn with_scope<T, F>(&self, fut: F) -> Result<T>
  where
    F: Future<Output = Result<T>>,
  {
    self.begin().await?;
    match fut.await {
      Ok(value) => {
        self.commit().await?;
        Ok(value)
      }
      Err(err) => {
        let _ = self.rollback().await;
        Err(err)
      }
    }
  }
}

// ─── Repository groups ───────────────────────────────────────────────────────

/// Settings, permissions, and per-user grants, sharing the unit's
/// connection.
pub struct ConfigRepos {
  conn: Connection,

  settings:         OnceLock<SettingRepo>,
  permissions:      OnceLock<PermissionRepo>,
  user_permissions: OnceLock<UserPermissionRepo>,
}

impl ConfigRepos {
  fn new(conn: Connection) -> Self {
    Self {
      conn,
      settings: OnceLock::new(),
      permissions: OnceLock::new(),
      user_permissions: OnceLock::new(),
    }
  }

  pub fn settings(&self) -> &SettingRepo {
    self.settings.get_or_init(|| SettingRepo::new(self.conn.clone()))
  }

  pub fn permissions(&self) -> &PermissionRepo {
    self.permissions.get_or_init(|| PermissionRepo::new(self.conn.clone()))
  }

  pub fn user_permissions(&self) -> &UserPermissionRepo {
    self
      .user_permissions
      .get_or_init(|| UserPermissionRepo::new(self.conn.clone()))
  }
}

/// Wedding-scoped repositories.
pub struct WeddingRepos {
  conn: Connection,
  info: OnceLock<WeddingInfoRepo>,
}

impl WeddingRepos {
  fn new(conn: Connection) -> Self {
    Self { conn, info: OnceLock::new() }
  }

  pub fn info(&self) -> &WeddingInfoRepo {
    self.info.get_or_init(|| WeddingInfoRepo::new(self.conn.clone()))
  }
}
