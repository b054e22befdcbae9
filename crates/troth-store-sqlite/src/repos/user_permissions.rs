//! [`UserPermissionRepo`] — per-user grants over the `user_permissions`
//! table.
//!
//! Grant rows store the flags and the links; the embedded repositories
//! hydrate the full user and permission aggregates on read.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Page, Repository, Result,
  permission::{
    UserPermission, UserPermissionCreate, UserPermissionUpdate,
  },
};
use uuid::Uuid;

use crate::{
  encode::{RawUserPermission, decode_uuid, encode_uuid},
  repos::{PermissionRepo, UserRepo},
};

// Link uids come back through scalar subqueries so reads never join the full
// user aggregate.
const SELECT: &str = "SELECT up.uid,
   (SELECT uid FROM users WHERE id = up.user_id),
   (SELECT uid FROM permissions WHERE id = up.permission_id),
   up.can_create, up.can_read, up.can_update, up.can_delete
 FROM user_permissions up";

#[derive(Clone)]
pub struct UserPermissionRepo {
  conn:        tokio_rusqlite::Connection,
  users:       UserRepo,
  permissions: PermissionRepo,
}

impl UserPermissionRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self {
      users:       UserRepo::new(conn.clone()),
      permissions: PermissionRepo::new(conn.clone()),
      conn,
    }
  }

  pub async fn get_by_user_and_permission(
    &self,
    user_id: Uuid,
    permission_id: Uuid,
  ) -> Result<Option<UserPermission>> {
    let user_uid = encode_uuid(user_id);
    let permission_uid = encode_uuid(permission_id);

    let raw: Option<RawUserPermission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "{SELECT}
                 WHERE up.user_id =
                         (SELECT id FROM users WHERE uid = ?1)
                   AND up.permission_id =
                         (SELECT id FROM permissions WHERE uid = ?2)"
              ),
              rusqlite::params![user_uid, permission_uid],
              |row| RawUserPermission::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    match raw {
      Some(raw) => Ok(Some(self.hydrate(raw).await?)),
      None => Ok(None),
    }
  }

  async fn hydrate(&self, raw: RawUserPermission) -> Result<UserPermission> {
    let user = self.users.get_required(decode_uuid(&raw.user_uid)?).await?;
    let permission = self
      .permissions
      .get_required(decode_uuid(&raw.permission_uid)?)
      .await?;

    Ok(UserPermission {
      uid: decode_uuid(&raw.uid)?,
      user,
      permission,
      create: raw.can_create,
      read: raw.can_read,
      update: raw.can_update,
      delete: raw.can_delete,
    })
  }

  async fn write_flags(
    &self,
    grant: &UserPermission,
    insert: bool,
  ) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO user_permissions
         (uid, user_id, permission_id, can_create, can_read, can_update,
          can_delete)
       VALUES (?1,
               (SELECT id FROM users WHERE uid = ?2),
               (SELECT id FROM permissions WHERE uid = ?3),
               ?4, ?5, ?6, ?7)"
    } else {
      "UPDATE user_permissions
       SET can_create = ?4, can_read = ?5, can_update = ?6, can_delete = ?7
       WHERE uid = ?1"
    };

    let uid            = encode_uuid(grant.uid);
    let user_uid       = encode_uuid(grant.user.uid);
    let permission_uid = encode_uuid(grant.permission.uid);
    let can_create     = grant.create;
    let can_read       = grant.read;
    let can_update     = grant.update;
    let can_delete     = grant.delete;

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid,
            user_uid,
            permission_uid,
            can_create,
            can_read,
            can_update,
            can_delete,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for UserPermissionRepo {
  type Create = UserPermissionCreate;
  type Entity = UserPermission;
  type Update = UserPermissionUpdate;

  const ENTITY: &'static str = "user permission";

  async fn get(&self, id: Uuid) -> Result<Option<UserPermission>> {
    let uid = encode_uuid(id);
    let raw: Option<RawUserPermission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE up.uid = ?1"),
              rusqlite::params![uid],
              |row| RawUserPermission::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    match raw {
      Some(raw) => Ok(Some(self.hydrate(raw).await?)),
      None => Ok(None),
    }
  }

  async fn all(&self, page: Page) -> Result<Vec<UserPermission>> {
    let raws: Vec<RawUserPermission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("{SELECT} ORDER BY up.id LIMIT ?1 OFFSET ?2"))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawUserPermission::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    let mut grants = Vec::with_capacity(raws.len());
    for raw in raws {
      grants.push(self.hydrate(raw).await?);
    }
    Ok(grants)
  }

  async fn create(&self, new: UserPermissionCreate) -> Result<UserPermission> {
    let user = self.users.get_required(new.user).await?;
    let permission = self.permissions.get_required(new.permission).await?;

    if self
      .get_by_user_and_permission(user.uid, permission.uid)
      .await?
      .is_some()
    {
      return Err(Error::exists(
        Self::ENTITY,
        "user and permission",
        format!("{} / {}", user.email, permission.name),
      ));
    }

    // Unset flags inherit the permission's defaults.
    let grant = UserPermission {
      uid:    Uuid::new_v4(),
      create: new.create.unwrap_or(permission.create_default),
      read:   new.read.unwrap_or(permission.read_default),
      update: new.update.unwrap_or(permission.update_default),
      delete: new.delete.unwrap_or(permission.delete_default),
      user,
      permission,
    };
    self.write_flags(&grant, true).await?;
    Ok(grant)
  }

  async fn update(
    &self,
    mut current: UserPermission,
    patch: UserPermissionUpdate,
  ) -> Result<UserPermission> {
    patch.apply(&mut current)?;
    let changed = self.write_flags(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: UserPermission) -> Result<UserPermission> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM user_permissions WHERE uid = ?1",
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
