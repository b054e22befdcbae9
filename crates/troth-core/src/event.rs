//! Calendar events — rehearsal dinners, the ceremony, brunches.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Field, Result,
  address::{Address, AddressCreate, AddressUpdate},
  refs::{ChangeRef, CreateRef},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub uid:     Uuid,
  pub name:    String,
  pub date:    NaiveDate,
  pub start:   Option<NaiveTime>,
  pub end:     Option<NaiveTime>,
  pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCreate {
  pub name:    String,
  pub date:    NaiveDate,
  #[serde(default)]
  pub start:   Option<NaiveTime>,
  #[serde(default)]
  pub end:     Option<NaiveTime>,
  #[serde(default)]
  pub address: Option<CreateRef<AddressCreate>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:    Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub date:    Field<NaiveDate>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub start:   Field<NaiveTime>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub end:     Field<NaiveTime>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub address: Field<ChangeRef<AddressCreate, AddressUpdate>>,
}

impl EventUpdate {
  /// Fold the scalar members of the patch into the current entity. The
  /// `address` reference is resolved by the store before this runs.
  pub fn apply_scalars(self, current: &mut Event) -> Result<()> {
    self.name.apply(&mut current.name, "name")?;
    self.date.apply(&mut current.date, "date")?;
    self.start.apply_opt(&mut current.start);
    self.end.apply_opt(&mut current.end);
    Ok(())
  }
}

impl From<EventCreate> for EventUpdate {
  fn from(new: EventCreate) -> Self {
    Self {
      name:    Field::Set(new.name),
      date:    Field::Set(new.date),
      start:   new.start.into(),
      end:     new.end.into(),
      address: match new.address {
        None => Field::Null,
        Some(CreateRef::Id(id)) => Field::Set(ChangeRef::Id(id)),
        Some(CreateRef::Create(c)) => Field::Set(ChangeRef::Create(c)),
      },
    }
  }
}
