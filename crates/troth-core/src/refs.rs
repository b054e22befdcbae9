//! Tri-state sub-entity references.
//!
//! A payload may point at a related entity by its UUID, carry a full create
//! payload for a new one, or carry a partial update for the one already
//! linked. Which of the three are admissible depends on the slot; each gets
//! its own untagged union so the wire format stays a bare UUID string or a
//! plain object.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference admissible where a related entity may be linked or created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateRef<C> {
  Id(Uuid),
  Create(C),
}

/// Reference admissible where an already-linked entity may be swapped by id
/// or patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateRef<U> {
  Id(Uuid),
  Update(U),
}

/// Reference admissible where a slot may be relinked, filled with a new
/// entity, or have its current occupant patched. Decode order matters: a
/// UUID string is unambiguous, and a create payload (all required fields
/// present) is tried before the weaker update shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeRef<C, U> {
  Id(Uuid),
  Create(C),
  Update(U),
}

// A create payload used where only link-or-patch is admissible degrades to a
// full replacement of the linked entity.
impl<C, U: From<C>> From<CreateRef<C>> for UpdateRef<U> {
  fn from(reference: CreateRef<C>) -> Self {
    match reference {
      CreateRef::Id(id) => UpdateRef::Id(id),
      CreateRef::Create(c) => UpdateRef::Update(c.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::name::{NameCreate, NameUpdate};

  #[test]
  fn decodes_uuid_string_as_id() {
    let id = Uuid::new_v4();
    let json = format!("\"{id}\"");
    let r: ChangeRef<NameCreate, NameUpdate> =
      serde_json::from_str(&json).unwrap();
    assert_eq!(r, ChangeRef::Id(id));
  }

  #[test]
  fn decodes_complete_object_as_create() {
    let json = r#"{"first": "Ada", "last": "Lovelace"}"#;
    let r: ChangeRef<NameCreate, NameUpdate> =
      serde_json::from_str(json).unwrap();
    assert!(matches!(r, ChangeRef::Create(_)));
  }

  #[test]
  fn decodes_partial_object_as_update() {
    let json = r#"{"last": "King"}"#;
    let r: ChangeRef<NameCreate, NameUpdate> =
      serde_json::from_str(json).unwrap();
    match r {
      ChangeRef::Update(u) => {
        assert!(u.first.is_absent());
        assert_eq!(u.last, crate::Field::Set("King".to_string()));
      }
      other => panic!("expected update, got {other:?}"),
    }
  }
}
