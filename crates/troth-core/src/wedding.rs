//! The wedding itself — a singleton aggregate linking the couple and the
//! headline events.

use serde::{Deserialize, Serialize};

use crate::{
  Field,
  event::{Event, EventCreate, EventUpdate},
  person::{Person, PersonCreate, PersonUpdate},
  refs::{ChangeRef, CreateRef},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingInfo {
  pub bride: Option<Person>,
  pub groom: Option<Person>,

  pub engagement_party: Option<Event>,
  pub welcome:          Option<Event>,
  pub rehearsal_dinner: Option<Event>,
  pub wedding:          Option<Event>,
  pub reception:        Option<Event>,
  pub brunch:           Option<Event>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingInfoCreate {
  #[serde(default)]
  pub bride: Option<CreateRef<PersonCreate>>,
  #[serde(default)]
  pub groom: Option<CreateRef<PersonCreate>>,

  #[serde(default)]
  pub engagement_party: Option<CreateRef<EventCreate>>,
  #[serde(default)]
  pub welcome:          Option<CreateRef<EventCreate>>,
  #[serde(default)]
  pub rehearsal_dinner: Option<CreateRef<EventCreate>>,
  #[serde(default)]
  pub wedding:          Option<CreateRef<EventCreate>>,
  #[serde(default)]
  pub reception:        Option<CreateRef<EventCreate>>,
  #[serde(default)]
  pub brunch:           Option<CreateRef<EventCreate>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingInfoUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub bride: Field<ChangeRef<PersonCreate, PersonUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub groom: Field<ChangeRef<PersonCreate, PersonUpdate>>,

  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub engagement_party: Field<ChangeRef<EventCreate, EventUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub welcome:          Field<ChangeRef<EventCreate, EventUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub rehearsal_dinner: Field<ChangeRef<EventCreate, EventUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub wedding:          Field<ChangeRef<EventCreate, EventUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub reception:        Field<ChangeRef<EventCreate, EventUpdate>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub brunch:           Field<ChangeRef<EventCreate, EventUpdate>>,
}
