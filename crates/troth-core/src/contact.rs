//! Contact information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Field, Result};

/// Which channel a person prefers to be reached on. `Other` pairs with the
/// free-text `other_type`/`other_value` members.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PreferredMethod {
  Phone,
  Mobile,
  #[default]
  Email,
  Other,
}

impl PreferredMethod {
  /// The column/wire name of the contact member this preference points at.
  pub fn field(&self) -> &'static str {
    match self {
      Self::Phone => "phone",
      Self::Mobile => "mobile",
      Self::Email => "email",
      Self::Other => "otherType",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
  pub uid:              Uuid,
  pub name:             Option<String>,
  pub phone:            Option<String>,
  pub mobile:           Option<String>,
  pub email:            String,
  pub other_type:       Option<String>,
  pub other_value:      Option<String>,
  pub preferred_method: PreferredMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoCreate {
  #[serde(default)]
  pub name:             Option<String>,
  #[serde(default)]
  pub phone:            Option<String>,
  #[serde(default)]
  pub mobile:           Option<String>,
  pub email:            String,
  #[serde(default)]
  pub other_type:       Option<String>,
  #[serde(default)]
  pub other_value:      Option<String>,
  #[serde(default)]
  pub preferred_method: PreferredMethod,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:             Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub phone:            Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub mobile:           Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub email:            Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub other_type:       Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub other_value:      Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub preferred_method: Field<PreferredMethod>,
}

impl ContactInfoUpdate {
  pub fn apply(self, current: &mut ContactInfo) -> Result<()> {
    self.name.apply_opt(&mut current.name);
    self.phone.apply_opt(&mut current.phone);
    self.mobile.apply_opt(&mut current.mobile);
    self.email.apply(&mut current.email, "email")?;
    self.other_type.apply_opt(&mut current.other_type);
    self.other_value.apply_opt(&mut current.other_value);
    self
      .preferred_method
      .apply(&mut current.preferred_method, "preferredMethod")?;
    Ok(())
  }
}

impl From<ContactInfoCreate> for ContactInfoUpdate {
  fn from(new: ContactInfoCreate) -> Self {
    Self {
      name:             new.name.into(),
      phone:            new.phone.into(),
      mobile:           new.mobile.into(),
      email:            Field::Set(new.email),
      other_type:       new.other_type.into(),
      other_value:      new.other_value.into(),
      preferred_method: Field::Set(new.preferred_method),
    }
  }
}
