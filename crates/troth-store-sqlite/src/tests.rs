//! Integration tests for the SQLite repositories against an in-memory
//! database.

use chrono::NaiveDate;
use troth_core::{
  Error, Field, Page, Repository,
  address::AddressCreate,
  contact::{ContactInfoCreate, PreferredMethod},
  event::{EventCreate, EventUpdate},
  name::{NameCreate, NameUpdate},
  permission::{PermissionCreate, UserPermissionCreate},
  person::{PersonCreate, PersonUpdate},
  refs::{ChangeRef, CreateRef, UpdateRef},
  setting::{SettingCreate, SettingUpdate, SettingValue, ValueType},
  user::{UserCreate, UserUpdate},
  wedding::{WeddingInfoCreate, WeddingInfoUpdate},
};
use uuid::Uuid;

use crate::{Database, UnitOfWork};

async fn uow() -> UnitOfWork {
  UnitOfWork::open_in_memory().await.expect("in-memory unit")
}

fn name_create(first: &str, last: &str) -> NameCreate {
  NameCreate {
    title:  None,
    first:  first.into(),
    middle: None,
    last:   last.into(),
    suffix: None,
    short:  None,
  }
}

fn contact_create(email: &str) -> ContactInfoCreate {
  ContactInfoCreate {
    name:             None,
    phone:            None,
    mobile:           Some("+1 555 0100".into()),
    email:            email.into(),
    other_type:       None,
    other_value:      None,
    preferred_method: PreferredMethod::Email,
  }
}

fn address_create(city: &str) -> AddressCreate {
  AddressCreate {
    name:     None,
    line_1:   "12 Orchard Lane".into(),
    line_2:   None,
    line_3:   None,
    city:     city.into(),
    state:    Some("VT".into()),
    zip_code: Some(5401),
    country:  Some("USA".into()),
  }
}

fn person_create(first: &str, last: &str, email: &str) -> PersonCreate {
  PersonCreate {
    name:    CreateRef::Create(name_create(first, last)),
    contact: CreateRef::Create(contact_create(email)),
    address: None,
  }
}

fn event_create(name: &str, date: &str) -> EventCreate {
  EventCreate {
    name:    name.into(),
    date:    date.parse().unwrap(),
    start:   Some("17:00:00".parse().unwrap()),
    end:     None,
    address: None,
  }
}

fn user_create(email: &str, password: &str) -> UserCreate {
  UserCreate {
    email:        email.into(),
    password:     password.into(),
    is_active:    true,
    is_poweruser: false,
    is_superuser: false,
    person:       None,
  }
}

// ─── Names ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_name() {
  let u = uow().await;

  let name = u.names().create(name_create("Ada", "Lovelace")).await.unwrap();
  let fetched = u.names().get(name.uid).await.unwrap().unwrap();
  assert_eq!(fetched, name);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let u = uow().await;
  assert!(u.names().get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn get_required_missing_errors() {
  let u = uow().await;
  let err = u.names().get_required(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "name", .. }));
}

#[tokio::test]
async fn partial_update_touches_only_set_fields() {
  let u = uow().await;
  let mut create = name_create("Ada", "Lovelace");
  create.title = Some("Countess".into());
  let name = u.names().create(create).await.unwrap();

  // `last` set, `title` explicitly cleared, everything else untouched.
  let patch = NameUpdate {
    last: Field::Set("King".into()),
    title: Field::Null,
    ..Default::default()
  };
  let updated = u.names().update(name, patch).await.unwrap();

  assert_eq!(updated.first, "Ada");
  assert_eq!(updated.last, "King");
  assert_eq!(updated.title, None);

  let fetched = u.names().get(updated.uid).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn required_field_cannot_be_cleared() {
  let u = uow().await;
  let name = u.names().create(name_create("Ada", "Lovelace")).await.unwrap();

  let patch = NameUpdate { first: Field::Null, ..Default::default() };
  let err = u.names().update(name, patch).await.unwrap_err();
  assert!(matches!(err, Error::Invalid(_)));
}

#[tokio::test]
async fn delete_removes_row() {
  let u = uow().await;
  let name = u.names().create(name_create("Ada", "Lovelace")).await.unwrap();

  u.names().delete(name.clone()).await.unwrap();
  assert!(u.names().get(name.uid).await.unwrap().is_none());

  let err = u.names().delete(name).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn all_paginates() {
  let u = uow().await;
  for i in 0..5 {
    u.names()
      .create(name_create(&format!("Guest{i}"), "Smith"))
      .await
      .unwrap();
  }

  let page = u.names().all(Page { skip: 2, limit: 2 }).await.unwrap();
  assert_eq!(page.len(), 2);
  assert_eq!(page[0].first, "Guest2");
}

// ─── Reference resolution ────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_with_id_fetches() {
  let u = uow().await;
  let name = u.names().create(name_create("Ada", "Lovelace")).await.unwrap();

  let resolved =
    u.names().get_or_create(CreateRef::Id(name.uid)).await.unwrap();
  assert_eq!(resolved, name);
}

#[tokio::test]
async fn get_or_create_with_unknown_id_errors() {
  let u = uow().await;
  let err = u
    .names()
    .get_or_create(CreateRef::Id(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn get_create_or_update_three_ways() {
  let u = uow().await;

  // No current value + create payload: a new row.
  let created = u
    .names()
    .get_create_or_update(None, ChangeRef::Create(name_create("Ada", "L")))
    .await
    .unwrap();

  // Current value + update payload: a patch.
  let patched = u
    .names()
    .get_create_or_update(
      Some(created.clone()),
      ChangeRef::Update(NameUpdate {
        last: Field::Set("Lovelace".into()),
        ..Default::default()
      }),
    )
    .await
    .unwrap();
  assert_eq!(patched.uid, created.uid);
  assert_eq!(patched.last, "Lovelace");

  // Identifier always wins, with or without a current value.
  let other = u.names().create(name_create("Grace", "Hopper")).await.unwrap();
  let resolved = u
    .names()
    .get_create_or_update(Some(patched), ChangeRef::Id(other.uid))
    .await
    .unwrap();
  assert_eq!(resolved.uid, other.uid);

  // No current value + update payload is refused.
  let err = u
    .names()
    .get_create_or_update(
      None,
      ChangeRef::Update(NameUpdate::default()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Invalid(_)));
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_person_with_nested_creates() {
  let u = uow().await;

  let person = u
    .people()
    .create(PersonCreate {
      name:    CreateRef::Create(name_create("Rosalind", "Franklin")),
      contact: CreateRef::Create(contact_create("rosalind@example.com")),
      address: Some(CreateRef::Create(address_create("Burlington"))),
    })
    .await
    .unwrap();

  assert_eq!(person.name.first, "Rosalind");
  assert_eq!(person.contact.email, "rosalind@example.com");
  assert_eq!(person.address.as_ref().unwrap().city, "Burlington");

  let fetched = u.people().get(person.uid).await.unwrap().unwrap();
  assert_eq!(fetched, person);
}

#[tokio::test]
async fn create_person_linking_existing_rows() {
  let u = uow().await;
  let name = u.names().create(name_create("Marie", "Curie")).await.unwrap();
  let contact =
    u.contacts().create(contact_create("marie@example.com")).await.unwrap();

  let person = u
    .people()
    .create(PersonCreate {
      name:    CreateRef::Id(name.uid),
      contact: CreateRef::Id(contact.uid),
      address: None,
    })
    .await
    .unwrap();

  assert_eq!(person.name, name);
  assert_eq!(person.contact, contact);
  assert!(person.address.is_none());
}

#[tokio::test]
async fn update_person_mixed_references() {
  let u = uow().await;
  let person = u
    .people()
    .create(person_create("Rosalind", "Franklin", "rosalind@example.com"))
    .await
    .unwrap();

  // Patch the linked name in place, attach a brand-new address.
  let updated = u
    .people()
    .update(person.clone(), PersonUpdate {
      name:    Field::Set(UpdateRef::Update(NameUpdate {
        short: Field::Set("Ros".into()),
        ..Default::default()
      })),
      contact: Field::Absent,
      address: Field::Set(ChangeRef::Create(address_create("Montpelier"))),
    })
    .await
    .unwrap();

  assert_eq!(updated.uid, person.uid);
  assert_eq!(updated.name.uid, person.name.uid);
  assert_eq!(updated.name.short.as_deref(), Some("Ros"));
  assert_eq!(updated.address.as_ref().unwrap().city, "Montpelier");

  // Null clears the optional address slot again.
  let cleared = u
    .people()
    .update(updated, PersonUpdate {
      address: Field::Null,
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(cleared.address.is_none());

  let fetched = u.people().get(person.uid).await.unwrap().unwrap();
  assert!(fetched.address.is_none());
}

#[tokio::test]
async fn get_person_by_name_id() {
  let u = uow().await;
  let person = u
    .people()
    .create(person_create("Grace", "Hopper", "grace@example.com"))
    .await
    .unwrap();

  let found =
    u.people().get_by_name_id(person.name.uid).await.unwrap().unwrap();
  assert_eq!(found.uid, person.uid);

  assert!(u.people().get_by_name_id(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_range_is_half_open() {
  let u = uow().await;
  for (name, date) in [
    ("engagement party", "2026-05-01"),
    ("rehearsal dinner", "2026-06-19"),
    ("wedding", "2026-06-20"),
    ("brunch", "2026-06-21"),
  ] {
    u.events().create(event_create(name, date)).await.unwrap();
  }

  let start = NaiveDate::from_ymd_opt(2026, 6, 19).unwrap();
  let end = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();

  // End date excluded, start date included.
  let in_range = u
    .events()
    .all_in_range(Some(start), Some(end), Page::default())
    .await
    .unwrap();
  let names: Vec<_> = in_range.iter().map(|e| e.name.as_str()).collect();
  assert_eq!(names, ["rehearsal dinner", "wedding"]);

  // Open-ended lower bound.
  let upcoming = u
    .events()
    .all_in_range(Some(start), None, Page::default())
    .await
    .unwrap();
  assert_eq!(upcoming.len(), 3);

  // No bounds at all: everything.
  let all = u
    .events()
    .all_in_range(None, None, Page::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn event_address_lifecycle() {
  let u = uow().await;
  let mut create = event_create("reception", "2026-06-20");
  create.address = Some(CreateRef::Create(address_create("Stowe")));
  let event = u.events().create(create).await.unwrap();
  let address_uid = event.address.as_ref().unwrap().uid;

  let by_address =
    u.events().get_by_address_id(address_uid).await.unwrap();
  assert_eq!(by_address.len(), 1);

  // Swap to a different address by id.
  let other = u.addresses().create(address_create("Woodstock")).await.unwrap();
  let updated = u
    .events()
    .update(event, EventUpdate {
      address: Field::Set(ChangeRef::Id(other.uid)),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.address.as_ref().unwrap().uid, other.uid);

  let by_date = u
    .events()
    .get_by_date("2026-06-20".parse().unwrap())
    .await
    .unwrap();
  assert_eq!(by_date.len(), 1);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_email_is_unique() {
  let u = uow().await;
  u.users().create(user_create("ada@example.com", "s3cret")).await.unwrap();

  let err = u
    .users()
    .create(user_create("ada@example.com", "other"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Exists { entity: "user", .. }));
}

#[tokio::test]
async fn authenticate_checks_password() {
  let u = uow().await;
  let user =
    u.users().create(user_create("ada@example.com", "s3cret")).await.unwrap();
  assert_ne!(user.hashed_password, "s3cret");

  let ok = u.users().authenticate("ada@example.com", "s3cret").await.unwrap();
  assert_eq!(ok.unwrap().uid, user.uid);

  let bad_pw =
    u.users().authenticate("ada@example.com", "wrong").await.unwrap();
  assert!(bad_pw.is_none());

  let bad_email =
    u.users().authenticate("nobody@example.com", "s3cret").await.unwrap();
  assert!(bad_email.is_none());
}

#[tokio::test]
async fn update_user_password_rehashes() {
  let u = uow().await;
  let user =
    u.users().create(user_create("ada@example.com", "s3cret")).await.unwrap();

  let updated = u
    .users()
    .update(user, UserUpdate {
      password: Field::Set("newpass".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert!(
    u.users()
      .authenticate("ada@example.com", "newpass")
      .await
      .unwrap()
      .is_some()
  );
  assert!(
    u.users()
      .authenticate("ada@example.com", "s3cret")
      .await
      .unwrap()
      .is_none()
  );
  assert_eq!(updated.email, "ada@example.com");
}

#[tokio::test]
async fn user_person_slot() {
  let u = uow().await;
  let mut create = user_create("ada@example.com", "s3cret");
  create.person = Some(CreateRef::Create(person_create(
    "Ada",
    "Lovelace",
    "ada@example.com",
  )));
  let user = u.users().create(create).await.unwrap();
  assert_eq!(user.person.as_ref().unwrap().name.first, "Ada");

  let fetched = u.users().get(user.uid).await.unwrap().unwrap();
  assert_eq!(fetched.person, user.person);

  let unlinked = u
    .users()
    .update(fetched, UserUpdate {
      person: Field::Null,
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(unlinked.person.is_none());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn setting_type_inferred_from_value() {
  let u = uow().await;
  let setting = u
    .config()
    .settings()
    .create(SettingCreate {
      name:       "guest_limit".into(),
      required:   false,
      value_type: None,
      value:      Some(SettingValue::Integer(120)),
    })
    .await
    .unwrap();

  assert_eq!(setting.value_type, ValueType::Integer);

  let fetched =
    u.config().settings().get_by_name("guest_limit").await.unwrap().unwrap();
  assert_eq!(fetched.value, Some(SettingValue::Integer(120)));
}

#[tokio::test]
async fn setting_explicit_type_coerces_value() {
  let u = uow().await;
  let setting = u
    .config()
    .settings()
    .create(SettingCreate {
      name:       "budget".into(),
      required:   false,
      value_type: Some(ValueType::Float),
      value:      Some(SettingValue::Integer(25000)),
    })
    .await
    .unwrap();

  assert_eq!(setting.value_type, ValueType::Float);
  assert_eq!(setting.value, Some(SettingValue::Float(25000.0)));
}

#[tokio::test]
async fn setting_value_type_mismatch_is_invalid() {
  let u = uow().await;
  let err = u
    .config()
    .settings()
    .create(SettingCreate {
      name:       "open_registration".into(),
      required:   false,
      value_type: Some(ValueType::Boolean),
      value:      Some(SettingValue::String("yes".into())),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Invalid(_)));
}

#[tokio::test]
async fn setting_name_is_unique() {
  let u = uow().await;
  let create = SettingCreate {
    name:       "theme".into(),
    required:   false,
    value_type: None,
    value:      Some(SettingValue::String("rustic".into())),
  };
  u.config().settings().create(create.clone()).await.unwrap();

  let err = u.config().settings().create(create).await.unwrap_err();
  assert!(matches!(err, Error::Exists { entity: "setting", .. }));
}

#[tokio::test]
async fn setting_update_keeps_tag_honest() {
  let u = uow().await;
  let setting = u
    .config()
    .settings()
    .create(SettingCreate {
      name:       "venue_id".into(),
      required:   true,
      value_type: None,
      value:      Some(SettingValue::Uuid(Uuid::new_v4())),
    })
    .await
    .unwrap();

  let err = u
    .config()
    .settings()
    .update(setting.clone(), SettingUpdate {
      value: Field::Set(SettingValue::Integer(7)),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Invalid(_)));

  let cleared = u
    .config()
    .settings()
    .update(setting, SettingUpdate {
      value: Field::Null,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(cleared.value, None);
  assert!(cleared.required);
}

// ─── Permissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn grant_inherits_permission_defaults() {
  let u = uow().await;
  let user =
    u.users().create(user_create("ada@example.com", "s3cret")).await.unwrap();
  let permission = u
    .config()
    .permissions()
    .create(PermissionCreate {
      name:           "events".into(),
      description:    None,
      create_default: false,
      read_default:   true,
      update_default: false,
      delete_default: false,
    })
    .await
    .unwrap();

  let grant = u
    .config()
    .user_permissions()
    .create(UserPermissionCreate {
      user:       user.uid,
      permission: permission.uid,
      create:     Some(true),
      read:       None,
      update:     None,
      delete:     None,
    })
    .await
    .unwrap();

  // Explicit flag kept, the rest from the permission's defaults.
  assert!(grant.create);
  assert!(grant.read);
  assert!(!grant.update);
  assert!(!grant.delete);

  let fetched = u
    .config()
    .user_permissions()
    .get_by_user_and_permission(user.uid, permission.uid)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.uid, grant.uid);
}

#[tokio::test]
async fn grant_pair_is_unique() {
  let u = uow().await;
  let user =
    u.users().create(user_create("ada@example.com", "s3cret")).await.unwrap();
  let permission = u
    .config()
    .permissions()
    .create(PermissionCreate {
      name:           "events".into(),
      description:    None,
      create_default: false,
      read_default:   false,
      update_default: false,
      delete_default: false,
    })
    .await
    .unwrap();

  let create = UserPermissionCreate {
    user:       user.uid,
    permission: permission.uid,
    create:     None,
    read:       None,
    update:     None,
    delete:     None,
  };
  u.config().user_permissions().create(create.clone()).await.unwrap();

  let err =
    u.config().user_permissions().create(create).await.unwrap_err();
  assert!(matches!(err, Error::Exists { .. }));
}

// ─── Wedding info ────────────────────────────────────────────────────────────

#[tokio::test]
async fn wedding_info_is_a_singleton() {
  let u = uow().await;
  assert!(u.wedding().info().get().await.unwrap().is_none());

  u.wedding()
    .info()
    .create(WeddingInfoCreate {
      bride: Some(CreateRef::Create(person_create(
        "June",
        "Ward",
        "june@example.com",
      ))),
      wedding: Some(CreateRef::Create(event_create(
        "ceremony",
        "2026-06-20",
      ))),
      ..Default::default()
    })
    .await
    .unwrap();

  let err = u
    .wedding()
    .info()
    .create(WeddingInfoCreate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Exists { .. }));
}

#[tokio::test]
async fn wedding_info_update_fills_and_clears_slots() {
  let u = uow().await;
  let info = u
    .wedding()
    .info()
    .create(WeddingInfoCreate {
      bride: Some(CreateRef::Create(person_create(
        "June",
        "Ward",
        "june@example.com",
      ))),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(info.groom.is_none());

  let groom = u
    .people()
    .create(person_create("Theo", "Ward", "theo@example.com"))
    .await
    .unwrap();

  let updated = u
    .wedding()
    .info()
    .update(info, WeddingInfoUpdate {
      groom: Field::Set(ChangeRef::Id(groom.uid)),
      brunch: Field::Set(ChangeRef::Create(event_create(
        "farewell brunch",
        "2026-06-21",
      ))),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.groom.as_ref().unwrap().uid, groom.uid);
  assert_eq!(updated.brunch.as_ref().unwrap().name, "farewell brunch");

  let cleared = u
    .wedding()
    .info()
    .update(updated, WeddingInfoUpdate {
      brunch: Field::Null,
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(cleared.brunch.is_none());

  let fetched = u.wedding().info().get().await.unwrap().unwrap();
  assert_eq!(fetched.groom.as_ref().unwrap().uid, groom.uid);
  assert!(fetched.brunch.is_none());
}

// ─── Transactional scopes ────────────────────────────────────────────────────

#[tokio::test]
async fn scope_commits_on_success() {
  let db = Database::open_in_memory().await.unwrap();
  let u = db.unit_of_work().await.unwrap();

  u.with_scope(async {
    u.names().create(name_create("Ada", "Lovelace")).await?;
    Ok(())
  })
  .await
  .unwrap();

  // Visible from a separate connection only if committed.
  let other = db.unit_of_work().await.unwrap();
  let all = other.names().all(Page::default()).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn scope_rolls_back_on_error() {
  let db = Database::open_in_memory().await.unwrap();
  let u = db.unit_of_work().await.unwrap();

  let err = u
    .with_scope(async {
      u.names().create(name_create("Ada", "Lovelace")).await?;
      Err::<(), _>(Error::Invalid("boom".into()))
    })
    .await
    .unwrap_err();

  // The original error survives the rollback.
  assert!(matches!(err, Error::Invalid(msg) if msg == "boom"));

  let other = db.unit_of_work().await.unwrap();
  let all = other.names().all(Page::default()).await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn second_scope_on_same_unit_is_refused() {
  let u = uow().await;

  u.begin().await.unwrap();
  let err = u.begin().await.unwrap_err();
  assert!(matches!(err, Error::ScopeActive));

  u.rollback().await.unwrap();
  // After the scope closes, a new one is fine.
  u.begin().await.unwrap();
  u.commit().await.unwrap();
}

#[tokio::test]
async fn commit_without_scope_is_invalid() {
  let u = uow().await;
  assert!(matches!(u.commit().await.unwrap_err(), Error::Invalid(_)));
  assert!(matches!(u.rollback().await.unwrap_err(), Error::Invalid(_)));
}
