//! The abstract repository contract.
//!
//! Each entity gets one concrete repository in the store crate; this trait
//! pins the shared CRUD surface and provides the reference-resolution
//! combinators on top of it, so handlers never branch on reference shape
//! themselves.

use uuid::Uuid;

use crate::{
  error::{Error, Result},
  refs::{ChangeRef, CreateRef, UpdateRef},
};

/// Pagination window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub skip:  u64,
  pub limit: u64,
}

impl Page {
  pub const DEFAULT_LIMIT: u64 = 100;

  pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
    Self {
      skip:  skip.unwrap_or(0),
      limit: limit.unwrap_or(Self::DEFAULT_LIMIT),
    }
  }
}

impl Default for Page {
  fn default() -> Self {
    Self::new(None, None)
  }
}

/// CRUD access to one entity type.
///
/// `update` takes the current entity (not its id) so a handler that already
/// fetched the row never pays a second lookup, and so partial updates apply
/// on top of known-current state.
pub trait Repository {
  type Entity;
  type Create;
  /// A create payload used against an existing entity degrades to a full
  /// replacement, hence the conversion bound.
  type Update: From<Self::Create>;

  /// Entity name used in error messages.
  const ENTITY: &'static str;

  async fn get(&self, id: Uuid) -> Result<Option<Self::Entity>>;
  async fn all(&self, page: Page) -> Result<Vec<Self::Entity>>;
  async fn create(&self, new: Self::Create) -> Result<Self::Entity>;
  async fn update(
    &self,
    current: Self::Entity,
    patch: Self::Update,
  ) -> Result<Self::Entity>;
  /// Removes the row and hands back the last-seen state of the entity.
  async fn delete(&self, obj: Self::Entity) -> Result<Self::Entity>;

  /// `get` that treats absence as an error.
  async fn get_required(&self, id: Uuid) -> Result<Self::Entity> {
    self
      .get(id)
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, "id", id))
  }

  /// Resolve a link-or-create reference.
  async fn get_or_create(
    &self,
    reference: CreateRef<Self::Create>,
  ) -> Result<Self::Entity> {
    match reference {
      CreateRef::Id(id) => self.get_required(id).await,
      CreateRef::Create(new) => self.create(new).await,
    }
  }

  /// Resolve a link-or-patch reference against the currently linked entity.
  async fn get_or_update(
    &self,
    current: Self::Entity,
    reference: UpdateRef<Self::Update>,
  ) -> Result<Self::Entity> {
    match reference {
      UpdateRef::Id(id) => self.get_required(id).await,
      UpdateRef::Update(patch) => self.update(current, patch).await,
    }
  }

  /// Resolve a fully tri-state reference against an optionally filled slot.
  async fn get_create_or_update(
    &self,
    current: Option<Self::Entity>,
    reference: ChangeRef<Self::Create, Self::Update>,
  ) -> Result<Self::Entity> {
    match (current, reference) {
      (_, ChangeRef::Id(id)) => self.get_required(id).await,
      (None, ChangeRef::Create(new)) => self.create(new).await,
      (Some(cur), ChangeRef::Create(new)) => {
        self.update(cur, new.into()).await
      }
      (Some(cur), ChangeRef::Update(patch)) => self.update(cur, patch).await,
      (None, ChangeRef::Update(_)) => Err(Error::Invalid(format!(
        "cannot apply a partial {} update: no current value",
        Self::ENTITY
      ))),
    }
  }
}
