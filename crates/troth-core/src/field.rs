//! Tri-state update member.
//!
//! Partial-update payloads must distinguish "key not sent" from "key sent as
//! null". `Option<Option<T>>` expresses that but reads poorly and serde
//! flattens it; `Field` makes the three states explicit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A member of an update payload that may be left alone, cleared, or set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
  /// The key was not present in the payload; keep the current value.
  #[default]
  Absent,
  /// The key was explicitly `null`; clear the current value.
  Null,
  /// The key carried a value; replace the current value.
  Set(T),
}

impl<T> Field<T> {
  pub fn is_absent(&self) -> bool {
    matches!(self, Field::Absent)
  }

  pub fn is_set(&self) -> bool {
    matches!(self, Field::Set(_))
  }

  pub fn as_ref(&self) -> Field<&T> {
    match self {
      Field::Absent => Field::Absent,
      Field::Null => Field::Null,
      Field::Set(v) => Field::Set(v),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
    match self {
      Field::Absent => Field::Absent,
      Field::Null => Field::Null,
      Field::Set(v) => Field::Set(f(v)),
    }
  }

  /// Apply to an optional member: `Set` replaces, `Null` clears, `Absent`
  /// keeps.
  pub fn apply_opt(self, current: &mut Option<T>) {
    match self {
      Field::Absent => {}
      Field::Null => *current = None,
      Field::Set(v) => *current = Some(v),
    }
  }

  /// Apply to a required member: `Null` is rejected, the member cannot be
  /// cleared.
  pub fn apply(self, current: &mut T, field: &str) -> Result<()> {
    match self {
      Field::Absent => Ok(()),
      Field::Null => {
        Err(Error::Invalid(format!("field {field} cannot be null")))
      }
      Field::Set(v) => {
        *current = v;
        Ok(())
      }
    }
  }
}

impl<T> From<Option<T>> for Field<T> {
  fn from(value: Option<T>) -> Self {
    match value {
      Some(v) => Field::Set(v),
      None => Field::Null,
    }
  }
}

// Serde treats a missing key as `Default::default()` (`Absent`) when the
// containing struct annotates the member with `#[serde(default)]`. A present
// key round-trips through `Option<T>`.
impl<T: Serialize> Serialize for Field<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      // Reachable only without `skip_serializing_if = "Field::is_absent"`;
      // renders the same as an explicit null.
      Field::Absent | Field::Null => serializer.serialize_none(),
      Field::Set(v) => serializer.serialize_some(v),
    }
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    Ok(Option::<T>::deserialize(deserializer)?.into())
  }
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;

  use super::*;

  #[derive(Debug, Deserialize)]
  struct Patch {
    #[serde(default)]
    nickname: Field<String>,
  }

  #[test]
  fn missing_key_is_absent() {
    let patch: Patch = serde_json::from_str("{}").unwrap();
    assert_eq!(patch.nickname, Field::Absent);
  }

  #[test]
  fn explicit_null_is_null() {
    let patch: Patch = serde_json::from_str(r#"{"nickname": null}"#).unwrap();
    assert_eq!(patch.nickname, Field::Null);
  }

  #[test]
  fn value_is_set() {
    let patch: Patch = serde_json::from_str(r#"{"nickname": "Mo"}"#).unwrap();
    assert_eq!(patch.nickname, Field::Set("Mo".to_string()));
  }

  #[test]
  fn apply_opt_states() {
    let mut current = Some("old".to_string());
    Field::Absent.apply_opt(&mut current);
    assert_eq!(current.as_deref(), Some("old"));

    Field::Set("new".to_string()).apply_opt(&mut current);
    assert_eq!(current.as_deref(), Some("new"));

    Field::<String>::Null.apply_opt(&mut current);
    assert_eq!(current, None);
  }

  #[test]
  fn apply_rejects_null_on_required() {
    let mut current = "kept".to_string();
    assert!(Field::<String>::Null.apply(&mut current, "first").is_err());
    assert_eq!(current, "kept");
  }
}
