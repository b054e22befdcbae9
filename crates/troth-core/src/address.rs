//! Postal addresses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Field, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub uid:      Uuid,
  /// Label for the place itself, e.g. "The Grand Hotel".
  pub name:     Option<String>,
  pub line_1:   String,
  pub line_2:   Option<String>,
  pub line_3:   Option<String>,
  pub city:     String,
  pub state:    Option<String>,
  pub zip_code: Option<u32>,
  pub country:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreate {
  #[serde(default)]
  pub name:     Option<String>,
  pub line_1:   String,
  #[serde(default)]
  pub line_2:   Option<String>,
  #[serde(default)]
  pub line_3:   Option<String>,
  pub city:     String,
  #[serde(default)]
  pub state:    Option<String>,
  #[serde(default)]
  pub zip_code: Option<u32>,
  #[serde(default)]
  pub country:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:     Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub line_1:   Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub line_2:   Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub line_3:   Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub city:     Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub state:    Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub zip_code: Field<u32>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub country:  Field<String>,
}

impl AddressUpdate {
  pub fn apply(self, current: &mut Address) -> Result<()> {
    self.name.apply_opt(&mut current.name);
    self.line_1.apply(&mut current.line_1, "line1")?;
    self.line_2.apply_opt(&mut current.line_2);
    self.line_3.apply_opt(&mut current.line_3);
    self.city.apply(&mut current.city, "city")?;
    self.state.apply_opt(&mut current.state);
    self.zip_code.apply_opt(&mut current.zip_code);
    self.country.apply_opt(&mut current.country);
    Ok(())
  }
}

impl From<AddressCreate> for AddressUpdate {
  fn from(new: AddressCreate) -> Self {
    Self {
      name:     new.name.into(),
      line_1:   Field::Set(new.line_1),
      line_2:   new.line_2.into(),
      line_3:   new.line_3.into(),
      city:     Field::Set(new.city),
      state:    new.state.into(),
      zip_code: new.zip_code.into(),
      country:  new.country.into(),
    }
  }
}
