//! [`PermissionRepo`] — named permissions over the `permissions` table.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Field, Page, Repository, Result,
  permission::{Permission, PermissionCreate, PermissionUpdate},
};
use uuid::Uuid;

use crate::encode::{RawPermission, encode_uuid};

#[derive(Clone)]
pub struct PermissionRepo {
  conn: tokio_rusqlite::Connection,
}

impl PermissionRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  pub async fn get_by_name(&self, name: &str) -> Result<Option<Permission>> {
    let name = name.to_owned();
    let raw: Option<RawPermission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM permissions WHERE name = ?1",
                RawPermission::COLUMNS
              ),
              rusqlite::params![name],
              |row| RawPermission::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawPermission::into_permission).transpose()
  }

  async fn write_row(
    &self,
    permission: &Permission,
    insert: bool,
  ) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO permissions
         (uid, name, description, create_default, read_default,
          update_default, delete_default)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    } else {
      "UPDATE permissions
       SET name = ?2, description = ?3, create_default = ?4,
           read_default = ?5, update_default = ?6, delete_default = ?7
       WHERE uid = ?1"
    };

    let uid            = encode_uuid(permission.uid);
    let name           = permission.name.clone();
    let description    = permission.description.clone();
    let create_default = permission.create_default;
    let read_default   = permission.read_default;
    let update_default = permission.update_default;
    let delete_default = permission.delete_default;

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid,
            name,
            description,
            create_default,
            read_default,
            update_default,
            delete_default,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for PermissionRepo {
  type Create = PermissionCreate;
  type Entity = Permission;
  type Update = PermissionUpdate;

  const ENTITY: &'static str = "permission";

  async fn get(&self, id: Uuid) -> Result<Option<Permission>> {
    let uid = encode_uuid(id);
    let raw: Option<RawPermission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM permissions WHERE uid = ?1",
                RawPermission::COLUMNS
              ),
              rusqlite::params![uid],
              |row| RawPermission::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawPermission::into_permission).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Permission>> {
    let raws: Vec<RawPermission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM permissions ORDER BY name LIMIT ?1 OFFSET ?2",
          RawPermission::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawPermission::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws
      .into_iter()
      .map(RawPermission::into_permission)
      .collect()
  }

  async fn create(&self, new: PermissionCreate) -> Result<Permission> {
    if self.get_by_name(&new.name).await?.is_some() {
      return Err(Error::exists(Self::ENTITY, "name", &new.name));
    }

    let permission = Permission {
      uid:            Uuid::new_v4(),
      name:           new.name,
      description:    new.description,
      create_default: new.create_default,
      read_default:   new.read_default,
      update_default: new.update_default,
      delete_default: new.delete_default,
    };
    self.write_row(&permission, true).await?;
    Ok(permission)
  }

  async fn update(
    &self,
    mut current: Permission,
    patch: PermissionUpdate,
  ) -> Result<Permission> {
    if let Field::Set(new_name) = &patch.name {
      if *new_name != current.name
        && self.get_by_name(new_name).await?.is_some()
      {
        return Err(Error::exists(Self::ENTITY, "name", new_name));
      }
    }

    patch.apply(&mut current)?;
    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: Permission) -> Result<Permission> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM permissions WHERE uid = ?1",
          rusqlite::params![uid],
        )?)
      })
      .await
      .map_err(Error::storage)?;

    if deleted == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", obj.uid));
    }
    Ok(obj)
  }
}
