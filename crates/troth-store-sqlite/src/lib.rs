//! SQLite backend for the Troth repositories.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Each request checks out its own
//! connection through [`Database::unit_of_work`], so transactional scopes
//! never interleave.

mod encode;
mod schema;
mod uow;

pub mod repos;

pub use repos::{
  AddressRepo, ContactInfoRepo, EventRepo, NameRepo, PermissionRepo,
  PersonRepo, SettingRepo, UserPermissionRepo, UserRepo, WeddingInfoRepo,
};
pub use uow::{ConfigRepos, Database, UnitOfWork, WeddingRepos};

#[cfg(test)]
mod tests;
