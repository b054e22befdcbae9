//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates, times, and timestamps are stored as ISO 8601 strings. UUIDs are
//! stored as hyphenated lowercase strings. Booleans ride on rusqlite's
//! native integer conversion.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use troth_core::{
  Error, Result,
  address::Address,
  contact::{ContactInfo, PreferredMethod},
  event::Event,
  name::Name,
  permission::Permission,
  person::Person,
  setting::{Setting, SettingValue, ValueType},
  user::User,
};
use uuid::Uuid;

/// A column held something the domain cannot decode. Surfaces as a storage
/// error, never as caller input validation.
fn corrupt(msg: String) -> Error {
  Error::Storage(msg.into())
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::storage)
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(Error::storage)
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(Error::storage)
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(Error::storage)
}

// ─── PreferredMethod ─────────────────────────────────────────────────────────

pub fn encode_preferred_method(m: PreferredMethod) -> &'static str {
  match m {
    PreferredMethod::Phone => "phone",
    PreferredMethod::Mobile => "mobile",
    PreferredMethod::Email => "email",
    PreferredMethod::Other => "other",
  }
}

pub fn decode_preferred_method(s: &str) -> Result<PreferredMethod> {
  match s {
    "phone" => Ok(PreferredMethod::Phone),
    "mobile" => Ok(PreferredMethod::Mobile),
    "email" => Ok(PreferredMethod::Email),
    "other" => Ok(PreferredMethod::Other),
    other => Err(corrupt(format!("unknown preferred method: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Raw structs carry column values verbatim; decoding happens outside the
// connection closure. `from_row` takes the offset of the row's first column
// so the same struct works standalone and inside a JOIN projection.

pub struct RawName {
  pub uid:    String,
  pub title:  Option<String>,
  pub first:  String,
  pub middle: Option<String>,
  pub last:   String,
  pub suffix: Option<String>,
  pub short:  Option<String>,
}

impl RawName {
  /// Projection: `uid, title, first, middle, last, suffix, short`.
  pub const COLUMNS: &'static str =
    "uid, title, first, middle, last, suffix, short";

  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:    row.get(base)?,
      title:  row.get(base + 1)?,
      first:  row.get(base + 2)?,
      middle: row.get(base + 3)?,
      last:   row.get(base + 4)?,
      suffix: row.get(base + 5)?,
      short:  row.get(base + 6)?,
    })
  }

  pub fn into_name(self) -> Result<Name> {
    Ok(Name {
      uid:    decode_uuid(&self.uid)?,
      title:  self.title,
      first:  self.first,
      middle: self.middle,
      last:   self.last,
      suffix: self.suffix,
      short:  self.short,
    })
  }
}

pub struct RawAddress {
  pub uid:      String,
  pub name:     Option<String>,
  pub line_1:   String,
  pub line_2:   Option<String>,
  pub line_3:   Option<String>,
  pub city:     String,
  pub state:    Option<String>,
  pub zip_code: Option<u32>,
  pub country:  Option<String>,
}

impl RawAddress {
  /// Projection: `uid, name, line_1, line_2, line_3, city, state, zip_code,
  /// country`.
  pub const COLUMNS: &'static str =
    "uid, name, line_1, line_2, line_3, city, state, zip_code, country";

  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:      row.get(base)?,
      name:     row.get(base + 1)?,
      line_1:   row.get(base + 2)?,
      line_2:   row.get(base + 3)?,
      line_3:   row.get(base + 4)?,
      city:     row.get(base + 5)?,
      state:    row.get(base + 6)?,
      zip_code: row.get(base + 7)?,
      country:  row.get(base + 8)?,
    })
  }

  pub fn into_address(self) -> Result<Address> {
    Ok(Address {
      uid:      decode_uuid(&self.uid)?,
      name:     self.name,
      line_1:   self.line_1,
      line_2:   self.line_2,
      line_3:   self.line_3,
      city:     self.city,
      state:    self.state,
      zip_code: self.zip_code,
      country:  self.country,
    })
  }
}

pub struct RawContactInfo {
  pub uid:              String,
  pub name:             Option<String>,
  pub phone:            Option<String>,
  pub mobile:           Option<String>,
  pub email:            String,
  pub other_type:       Option<String>,
  pub other_value:      Option<String>,
  pub preferred_method: String,
}

impl RawContactInfo {
  /// Projection: `uid, name, phone, mobile, email, other_type, other_value,
  /// preferred_method`.
  pub const COLUMNS: &'static str =
    "uid, name, phone, mobile, email, other_type, other_value, \
     preferred_method";

  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:              row.get(base)?,
      name:             row.get(base + 1)?,
      phone:            row.get(base + 2)?,
      mobile:           row.get(base + 3)?,
      email:            row.get(base + 4)?,
      other_type:       row.get(base + 5)?,
      other_value:      row.get(base + 6)?,
      preferred_method: row.get(base + 7)?,
    })
  }

  pub fn into_contact_info(self) -> Result<ContactInfo> {
    Ok(ContactInfo {
      uid:              decode_uuid(&self.uid)?,
      name:             self.name,
      phone:            self.phone,
      mobile:           self.mobile,
      email:            self.email,
      other_type:       self.other_type,
      other_value:      self.other_value,
      preferred_method: decode_preferred_method(&self.preferred_method)?,
    })
  }
}

/// A person row joined with its name, contact, and optional address rows.
/// Offsets inside the projection: name at `base + 1`, contact at `base + 8`,
/// address at `base + 16`.
pub struct RawPerson {
  pub uid:     String,
  pub name:    RawName,
  pub contact: RawContactInfo,
  pub address: Option<RawAddress>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    let address_uid: Option<String> = row.get(base + 16)?;
    Ok(Self {
      uid:     row.get(base)?,
      name:    RawName::from_row(row, base + 1)?,
      contact: RawContactInfo::from_row(row, base + 8)?,
      address: address_uid
        .is_some()
        .then(|| RawAddress::from_row(row, base + 16))
        .transpose()?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      uid:     decode_uuid(&self.uid)?,
      name:    self.name.into_name()?,
      contact: self.contact.into_contact_info()?,
      address: self.address.map(RawAddress::into_address).transpose()?,
    })
  }
}

/// An event row joined with its optional address row (at `base + 5`).
pub struct RawEvent {
  pub uid:     String,
  pub name:    String,
  pub date:    String,
  pub start:   Option<String>,
  pub end:     Option<String>,
  pub address: Option<RawAddress>,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    let address_uid: Option<String> = row.get(base + 5)?;
    Ok(Self {
      uid:     row.get(base)?,
      name:    row.get(base + 1)?,
      date:    row.get(base + 2)?,
      start:   row.get(base + 3)?,
      end:     row.get(base + 4)?,
      address: address_uid
        .is_some()
        .then(|| RawAddress::from_row(row, base + 5))
        .transpose()?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      uid:     decode_uuid(&self.uid)?,
      name:    self.name,
      date:    decode_date(&self.date)?,
      start:   self.start.as_deref().map(decode_time).transpose()?,
      end:     self.end.as_deref().map(decode_time).transpose()?,
      address: self.address.map(RawAddress::into_address).transpose()?,
    })
  }
}

/// A user row joined with its optional person aggregate (at `base + 6`).
pub struct RawUser {
  pub uid:             String,
  pub email:           String,
  pub hashed_password: String,
  pub is_active:       bool,
  pub is_poweruser:    bool,
  pub is_superuser:    bool,
  pub person:          Option<RawPerson>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    let person_uid: Option<String> = row.get(base + 6)?;
    Ok(Self {
      uid:             row.get(base)?,
      email:           row.get(base + 1)?,
      hashed_password: row.get(base + 2)?,
      is_active:       row.get(base + 3)?,
      is_poweruser:    row.get(base + 4)?,
      is_superuser:    row.get(base + 5)?,
      person:          person_uid
        .is_some()
        .then(|| RawPerson::from_row(row, base + 6))
        .transpose()?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      uid:             decode_uuid(&self.uid)?,
      email:           self.email,
      hashed_password: self.hashed_password,
      is_active:       self.is_active,
      is_poweruser:    self.is_poweruser,
      is_superuser:    self.is_superuser,
      person:          self.person.map(RawPerson::into_person).transpose()?,
    })
  }
}

pub struct RawSetting {
  pub uid:            String,
  pub name:           String,
  pub required:       bool,
  pub value_type:     String,
  pub value_text:     Option<String>,
  pub value_int:      Option<i64>,
  pub value_real:     Option<f64>,
  pub value_bool:     Option<bool>,
  pub value_datetime: Option<String>,
  pub value_uuid:     Option<String>,
}

impl RawSetting {
  /// Projection: `uid, name, required, value_type, value_text, value_int,
  /// value_real, value_bool, value_datetime, value_uuid`.
  pub const COLUMNS: &'static str =
    "uid, name, required, value_type, value_text, value_int, value_real, \
     value_bool, value_datetime, value_uuid";

  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:            row.get(base)?,
      name:           row.get(base + 1)?,
      required:       row.get(base + 2)?,
      value_type:     row.get(base + 3)?,
      value_text:     row.get(base + 4)?,
      value_int:      row.get(base + 5)?,
      value_real:     row.get(base + 6)?,
      value_bool:     row.get(base + 7)?,
      value_datetime: row.get(base + 8)?,
      value_uuid:     row.get(base + 9)?,
    })
  }

  pub fn into_setting(self) -> Result<Setting> {
    let value_type = ValueType::from_discriminant(&self.value_type)
      .map_err(|_| corrupt(format!("unknown value type: {}", self.value_type)))?;

    let value = match value_type {
      ValueType::String => self.value_text.map(SettingValue::String),
      ValueType::Integer => self.value_int.map(SettingValue::Integer),
      ValueType::Float => self.value_real.map(SettingValue::Float),
      ValueType::Boolean => self.value_bool.map(SettingValue::Boolean),
      ValueType::Datetime => self
        .value_datetime
        .as_deref()
        .map(decode_dt)
        .transpose()?
        .map(SettingValue::Datetime),
      ValueType::Uuid => self
        .value_uuid
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(SettingValue::Uuid),
    };

    Ok(Setting {
      uid: decode_uuid(&self.uid)?,
      name: self.name,
      required: self.required,
      value_type,
      value,
    })
  }
}

/// Spread a [`SettingValue`] across the per-type columns; exactly one of the
/// six is populated.
pub struct SettingColumns {
  pub text:     Option<String>,
  pub int:      Option<i64>,
  pub real:     Option<f64>,
  pub bool:     Option<bool>,
  pub datetime: Option<String>,
  pub uuid:     Option<String>,
}

impl SettingColumns {
  pub fn from_value(value: Option<&SettingValue>) -> Self {
    let mut cols = Self {
      text:     None,
      int:      None,
      real:     None,
      bool:     None,
      datetime: None,
      uuid:     None,
    };
    match value {
      None => {}
      Some(SettingValue::String(s)) => cols.text = Some(s.clone()),
      Some(SettingValue::Integer(i)) => cols.int = Some(*i),
      Some(SettingValue::Float(f)) => cols.real = Some(*f),
      Some(SettingValue::Boolean(b)) => cols.bool = Some(*b),
      Some(SettingValue::Datetime(dt)) => cols.datetime = Some(encode_dt(*dt)),
      Some(SettingValue::Uuid(id)) => cols.uuid = Some(encode_uuid(*id)),
    }
    cols
  }
}

pub struct RawPermission {
  pub uid:            String,
  pub name:           String,
  pub description:    Option<String>,
  pub create_default: bool,
  pub read_default:   bool,
  pub update_default: bool,
  pub delete_default: bool,
}

impl RawPermission {
  /// Projection: `uid, name, description, create_default, read_default,
  /// update_default, delete_default`.
  pub const COLUMNS: &'static str =
    "uid, name, description, create_default, read_default, update_default, \
     delete_default";

  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:            row.get(base)?,
      name:           row.get(base + 1)?,
      description:    row.get(base + 2)?,
      create_default: row.get(base + 3)?,
      read_default:   row.get(base + 4)?,
      update_default: row.get(base + 5)?,
      delete_default: row.get(base + 6)?,
    })
  }

  pub fn into_permission(self) -> Result<Permission> {
    Ok(Permission {
      uid:            decode_uuid(&self.uid)?,
      name:           self.name,
      description:    self.description,
      create_default: self.create_default,
      read_default:   self.read_default,
      update_default: self.update_default,
      delete_default: self.delete_default,
    })
  }
}

/// A grant row with the linked uids resolved by scalar subqueries; the full
/// user and permission aggregates are hydrated by the repositories.
pub struct RawUserPermission {
  pub uid:            String,
  pub user_uid:       String,
  pub permission_uid: String,
  pub can_create:     bool,
  pub can_read:       bool,
  pub can_update:     bool,
  pub can_delete:     bool,
}

impl RawUserPermission {
  pub fn from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      uid:            row.get(base)?,
      user_uid:       row.get(base + 1)?,
      permission_uid: row.get(base + 2)?,
      can_create:     row.get(base + 3)?,
      can_read:       row.get(base + 4)?,
      can_update:     row.get(base + 5)?,
      can_delete:     row.get(base + 6)?,
    })
  }
}

/// The singleton wedding row: slot uids resolved by scalar subqueries,
/// aggregates hydrated by the repositories.
pub struct RawWeddingInfo {
  pub bride:            Option<String>,
  pub groom:            Option<String>,
  pub engagement_party: Option<String>,
  pub welcome:          Option<String>,
  pub rehearsal_dinner: Option<String>,
  pub wedding:          Option<String>,
  pub reception:        Option<String>,
  pub brunch:           Option<String>,
}

impl RawWeddingInfo {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      bride:            row.get(0)?,
      groom:            row.get(1)?,
      engagement_party: row.get(2)?,
      welcome:          row.get(3)?,
      rehearsal_dinner: row.get(4)?,
      wedding:          row.get(5)?,
      reception:        row.get(6)?,
      brunch:           row.get(7)?,
    })
  }
}
