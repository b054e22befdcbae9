//! Typed application settings.
//!
//! A setting is a named value with a declared type tag. The tag may be given
//! explicitly or inferred from the value's JSON shape; once stored, the tag
//! constrains what values the setting accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Field, Result};

/// Type tag stored alongside a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
  String,
  Integer,
  Float,
  Boolean,
  Datetime,
  Uuid,
}

impl ValueType {
  /// The discriminant string stored in the `value_type` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::String => "string",
      Self::Integer => "integer",
      Self::Float => "float",
      Self::Boolean => "boolean",
      Self::Datetime => "datetime",
      Self::Uuid => "uuid",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    Ok(match s {
      "string" => Self::String,
      "integer" => Self::Integer,
      "float" => Self::Float,
      "boolean" => Self::Boolean,
      "datetime" => Self::Datetime,
      "uuid" => Self::Uuid,
      other => {
        return Err(Error::Invalid(format!("unknown value type: {other}")));
      }
    })
  }
}

/// A setting value in one of the supported shapes.
///
/// Untagged decode order matters: booleans and integers before floats so
/// `true` and `3` keep their shape, and datetime/uuid strings before the
/// plain-string catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
  Boolean(bool),
  Integer(i64),
  Float(f64),
  Datetime(DateTime<Utc>),
  Uuid(Uuid),
  String(String),
}

impl SettingValue {
  /// The type tag matching this value's shape.
  pub fn value_type(&self) -> ValueType {
    match self {
      Self::Boolean(_) => ValueType::Boolean,
      Self::Integer(_) => ValueType::Integer,
      Self::Float(_) => ValueType::Float,
      Self::Datetime(_) => ValueType::Datetime,
      Self::Uuid(_) => ValueType::Uuid,
      Self::String(_) => ValueType::String,
    }
  }

  /// Fit this value to a declared tag. Lossless widenings are applied
  /// (integer to float, datetime or uuid to string); any other mismatch is
  /// rejected.
  pub fn coerce_to(self, ty: ValueType) -> Result<Self> {
    if self.value_type() == ty {
      return Ok(self);
    }
    match (self, ty) {
      (Self::Integer(i), ValueType::Float) => Ok(Self::Float(i as f64)),
      (Self::Datetime(dt), ValueType::String) => {
        Ok(Self::String(dt.to_rfc3339()))
      }
      (Self::Uuid(id), ValueType::String) => Ok(Self::String(id.to_string())),
      (value, ty) => Err(Error::Invalid(format!(
        "value {:?} does not match declared type {}",
        value,
        ty.discriminant()
      ))),
    }
  }
}

/// Decide the stored tag for a create payload: an explicit tag wins, else
/// the value's shape, else `String` for a valueless setting.
pub fn resolve_value_type(
  declared: Option<ValueType>,
  value: Option<&SettingValue>,
) -> ValueType {
  declared
    .or_else(|| value.map(SettingValue::value_type))
    .unwrap_or(ValueType::String)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
  pub uid:        Uuid,
  pub name:       String,
  pub required:   bool,
  #[serde(rename = "type")]
  pub value_type: ValueType,
  pub value:      Option<SettingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingCreate {
  pub name:       String,
  #[serde(default)]
  pub required:   bool,
  #[serde(default, rename = "type")]
  pub value_type: Option<ValueType>,
  #[serde(default)]
  pub value:      Option<SettingValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingUpdate {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:       Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub required:   Field<bool>,
  #[serde(default, rename = "type", skip_serializing_if = "Field::is_absent")]
  pub value_type: Field<ValueType>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub value:      Field<SettingValue>,
}

impl SettingUpdate {
  /// Fold the patch into the current setting. A new tag re-checks the
  /// surviving value; a new value without a tag must fit the current tag.
  pub fn apply(self, current: &mut Setting) -> Result<()> {
    self.name.apply(&mut current.name, "name")?;
    self.required.apply(&mut current.required, "required")?;
    self.value_type.apply(&mut current.value_type, "type")?;
    self.value.apply_opt(&mut current.value);
    current.value = current
      .value
      .take()
      .map(|v| v.coerce_to(current.value_type))
      .transpose()?;
    Ok(())
  }
}

impl From<SettingCreate> for SettingUpdate {
  fn from(new: SettingCreate) -> Self {
    let value_type = resolve_value_type(new.value_type, new.value.as_ref());
    Self {
      name:       Field::Set(new.name),
      required:   Field::Set(new.required),
      value_type: Field::Set(value_type),
      value:      new.value.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn untagged_decode_keeps_shapes() {
    let v: SettingValue = serde_json::from_str("true").unwrap();
    assert_eq!(v, SettingValue::Boolean(true));

    let v: SettingValue = serde_json::from_str("42").unwrap();
    assert_eq!(v, SettingValue::Integer(42));

    let v: SettingValue = serde_json::from_str("2.5").unwrap();
    assert_eq!(v, SettingValue::Float(2.5));

    let v: SettingValue =
      serde_json::from_str(r#""2026-06-20T14:00:00Z""#).unwrap();
    assert!(matches!(v, SettingValue::Datetime(_)));

    let v: SettingValue =
      serde_json::from_str(r#""4a3cc77e-7da6-4b38-a657-b767b49c3a26""#)
        .unwrap();
    assert!(matches!(v, SettingValue::Uuid(_)));

    let v: SettingValue = serde_json::from_str(r#""plain text""#).unwrap();
    assert_eq!(v, SettingValue::String("plain text".to_string()));
  }

  #[test]
  fn explicit_tag_wins_over_shape() {
    let ty = resolve_value_type(
      Some(ValueType::Float),
      Some(&SettingValue::Integer(3)),
    );
    assert_eq!(ty, ValueType::Float);
  }

  #[test]
  fn tag_inferred_from_value() {
    let ty = resolve_value_type(None, Some(&SettingValue::Boolean(true)));
    assert_eq!(ty, ValueType::Boolean);
  }

  #[test]
  fn valueless_setting_defaults_to_string() {
    assert_eq!(resolve_value_type(None, None), ValueType::String);
  }

  #[test]
  fn integer_widens_to_float() {
    let v = SettingValue::Integer(3).coerce_to(ValueType::Float).unwrap();
    assert_eq!(v, SettingValue::Float(3.0));
  }

  #[test]
  fn string_does_not_narrow_to_integer() {
    let r = SettingValue::String("3".into()).coerce_to(ValueType::Integer);
    assert!(matches!(r, Err(Error::Invalid(_))));
  }

  #[test]
  fn update_value_must_fit_current_tag() {
    let mut setting = Setting {
      uid:        Uuid::new_v4(),
      name:       "guest_limit".to_string(),
      required:   false,
      value_type: ValueType::Integer,
      value:      Some(SettingValue::Integer(120)),
    };

    let ok = SettingUpdate {
      value: Field::Set(SettingValue::Integer(150)),
      ..Default::default()
    };
    ok.apply(&mut setting).unwrap();
    assert_eq!(setting.value, Some(SettingValue::Integer(150)));

    let bad = SettingUpdate {
      value: Field::Set(SettingValue::Boolean(true)),
      ..Default::default()
    };
    assert!(bad.apply(&mut setting).is_err());
  }

  #[test]
  fn update_can_clear_value() {
    let mut setting = Setting {
      uid:        Uuid::new_v4(),
      name:       "venue_id".to_string(),
      required:   false,
      value_type: ValueType::Uuid,
      value:      Some(SettingValue::Uuid(Uuid::new_v4())),
    };
    let patch = SettingUpdate { value: Field::Null, ..Default::default() };
    patch.apply(&mut setting).unwrap();
    assert_eq!(setting.value, None);
  }
}
