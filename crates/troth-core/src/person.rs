//! People — the aggregate of a name, contact information, and an optional
//! postal address.
//!
//! Reference resolution for the embedded sub-entities happens in the store
//! layer; the payload types here only carry the tri-state references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Field,
  address::{Address, AddressCreate, AddressUpdate},
  contact::{ContactInfo, ContactInfoCreate, ContactInfoUpdate},
  name::{Name, NameCreate, NameUpdate},
  refs::{ChangeRef, CreateRef, UpdateRef},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub uid:     Uuid,
  pub name:    Name,
  pub contact: ContactInfo,
  pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonCreate {
  pub name:    CreateRef<NameCreate>,
  pub contact: CreateRef<ContactInfoCreate>,
  #[serde(default)]
  pub address: Option<CreateRef<AddressCreate>>,
}

/// `name` and `contact` always exist on a person, so a patch may only relink
/// or edit them; the optional `address` slot takes the full tri-state form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:    Field<UpdateRef<NameUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub contact: Field<UpdateRef<ContactInfoUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub address: Field<ChangeRef<AddressCreate, AddressUpdate>>,
}

impl From<PersonCreate> for PersonUpdate {
  fn from(new: PersonCreate) -> Self {
    Self {
      name:    Field::Set(new.name.into()),
      contact: Field::Set(new.contact.into()),
      address: match new.address {
        None => Field::Null,
        Some(CreateRef::Id(id)) => Field::Set(ChangeRef::Id(id)),
        Some(CreateRef::Create(c)) => Field::Set(ChangeRef::Create(c)),
      },
    }
  }
}
