//! Person names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Field, Result};

/// A structured personal name. `short` is the informal form used in
/// invitations ("Bob" for "Robert").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
  pub uid:    Uuid,
  pub title:  Option<String>,
  pub first:  String,
  pub middle: Option<String>,
  pub last:   String,
  pub suffix: Option<String>,
  pub short:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameCreate {
  #[serde(default)]
  pub title:  Option<String>,
  pub first:  String,
  #[serde(default)]
  pub middle: Option<String>,
  pub last:   String,
  #[serde(default)]
  pub suffix: Option<String>,
  #[serde(default)]
  pub short:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NameUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub title:  Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub first:  Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub middle: Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub last:   Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub suffix: Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub short:  Field<String>,
}

impl NameUpdate {
  /// Fold the patch into the current entity.
  pub fn apply(self, current: &mut Name) -> Result<()> {
    self.title.apply_opt(&mut current.title);
    self.first.apply(&mut current.first, "first")?;
    self.middle.apply_opt(&mut current.middle);
    self.last.apply(&mut current.last, "last")?;
    self.suffix.apply_opt(&mut current.suffix);
    self.short.apply_opt(&mut current.short);
    Ok(())
  }
}

impl From<NameCreate> for NameUpdate {
  fn from(new: NameCreate) -> Self {
    Self {
      title:  new.title.into(),
      first:  Field::Set(new.first),
      middle: new.middle.into(),
      last:   Field::Set(new.last),
      suffix: new.suffix.into(),
      short:  new.short.into(),
    }
  }
}
