//! Application accounts and the role ladder.
//!
//! Roles stack: a superuser can do everything a poweruser can, and a
//! poweruser everything a plain user can. The flags are independent columns
//! so demotion never loses information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Field,
  person::{Person, PersonCreate, PersonUpdate},
  refs::{ChangeRef, CreateRef},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub uid:             Uuid,
  pub email:           String,
  /// argon2 PHC string; never serialised.
  #[serde(skip_serializing)]
  pub hashed_password: String,
  pub is_active:       bool,
  pub is_poweruser:    bool,
  pub is_superuser:    bool,
  pub person:          Option<Person>,
}

impl User {
  /// A superuser outranks a poweruser.
  pub fn has_poweruser(&self) -> bool {
    self.is_poweruser || self.is_superuser
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
  pub email:        String,
  /// Plaintext; hashed at the repository boundary.
  pub password:     String,
  #[serde(default = "default_true")]
  pub is_active:    bool,
  #[serde(default)]
  pub is_poweruser: bool,
  #[serde(default)]
  pub is_superuser: bool,
  #[serde(default)]
  pub person:       Option<CreateRef<PersonCreate>>,
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub email:        Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub password:     Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_active:    Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_poweruser: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_superuser: Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub person:       Field<ChangeRef<PersonCreate, PersonUpdate>>,
}

impl From<UserCreate> for UserUpdate {
  fn from(new: UserCreate) -> Self {
    Self {
      email:        Field::Set(new.email),
      password:     Field::Set(new.password),
      is_active:    Field::Set(new.is_active),
      is_poweruser: Field::Set(new.is_poweruser),
      is_superuser: Field::Set(new.is_superuser),
      person:       match new.person {
        None => Field::Null,
        Some(CreateRef::Id(id)) => Field::Set(ChangeRef::Id(id)),
        Some(CreateRef::Create(c)) => Field::Set(ChangeRef::Create(c)),
      },
    }
  }
}
