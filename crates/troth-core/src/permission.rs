//! Named permissions and their per-user grants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Field, Result, user::User};

/// A named permission with the CRUD defaults new grants inherit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
  pub uid:            Uuid,
  pub name:           String,
  pub description:    Option<String>,
  pub create_default: bool,
  pub read_default:   bool,
  pub update_default: bool,
  pub delete_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCreate {
  pub name:           String,
  #[serde(default)]
  pub description:    Option<String>,
  #[serde(default)]
  pub create_default: bool,
  #[serde(default)]
  pub read_default:   bool,
  #[serde(default)]
  pub update_default: bool,
  #[serde(default)]
  pub delete_default: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:           Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub description:    Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub create_default: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub read_default:   Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub update_default: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub delete_default: Field<bool>,
}

impl PermissionUpdate {
  pub fn apply(self, current: &mut Permission) -> Result<()> {
    self.name.apply(&mut current.name, "name")?;
    self.description.apply_opt(&mut current.description);
    self.create_default.apply(&mut current.create_default, "createDefault")?;
    self.read_default.apply(&mut current.read_default, "readDefault")?;
    self.update_default.apply(&mut current.update_default, "updateDefault")?;
    self.delete_default.apply(&mut current.delete_default, "deleteDefault")?;
    Ok(())
  }
}

impl From<PermissionCreate> for PermissionUpdate {
  fn from(new: PermissionCreate) -> Self {
    Self {
      name:           Field::Set(new.name),
      description:    new.description.into(),
      create_default: Field::Set(new.create_default),
      read_default:   Field::Set(new.read_default),
      update_default: Field::Set(new.update_default),
      delete_default: Field::Set(new.delete_default),
    }
  }
}

/// A grant of one permission to one user. The (user, permission) pair is
/// unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPermission {
  pub uid:        Uuid,
  pub user:       User,
  pub permission: Permission,
  pub create:     bool,
  pub read:       bool,
  pub update:     bool,
  pub delete:     bool,
}

/// Flags left unset inherit the permission's `*_default` values when the
/// grant is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPermissionCreate {
  pub user:       Uuid,
  pub permission: Uuid,
  #[serde(default)]
  pub create:     Option<bool>,
  #[serde(default)]
  pub read:       Option<bool>,
  #[serde(default)]
  pub update:     Option<bool>,
  #[serde(default)]
  pub delete:     Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPermissionUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub create: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub read:   Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub update: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub delete: Field<bool>,
}

impl UserPermissionUpdate {
  pub fn apply(self, current: &mut UserPermission) -> Result<()> {
    self.create.apply(&mut current.create, "create")?;
    self.read.apply(&mut current.read, "read")?;
    self.update.apply(&mut current.update, "update")?;
    self.delete.apply(&mut current.delete, "delete")?;
    Ok(())
  }
}

impl From<UserPermissionCreate> for UserPermissionUpdate {
  fn from(new: UserPermissionCreate) -> Self {
    let field = |flag: Option<bool>| match flag {
      Some(v) => Field::Set(v),
      None => Field::Absent,
    };
    Self {
      create: field(new.create),
      read:   field(new.read),
      update: field(new.update),
      delete: field(new.delete),
    }
  }
}
