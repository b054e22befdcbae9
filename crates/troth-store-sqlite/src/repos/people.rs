//! [`PersonRepo`] — the person aggregate over the `people` table.
//!
//! A person row only links a name, a contact-info row, and optionally an
//! address. The embedded repositories resolve the tri-state references first
//! so the link row always points at existing rows.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Field, Page, Repository, Result,
  person::{Person, PersonCreate, PersonUpdate},
};
use uuid::Uuid;

use crate::{
  encode::{RawPerson, encode_uuid},
  repos::{AddressRepo, ContactInfoRepo, NameRepo},
};

// RawPerson offsets: person uid 0, name 1..=7, contact 8..=15, address
// 16..=24.
const SELECT: &str = "SELECT p.uid,
   n.uid, n.title, n.first, n.middle, n.last, n.suffix, n.short,
   c.uid, c.name, c.phone, c.mobile, c.email, c.other_type, c.other_value,
   c.preferred_method,
   a.uid, a.name, a.line_1, a.line_2, a.line_3, a.city, a.state, a.zip_code,
   a.country
 FROM people p
 JOIN names n          ON n.id = p.name_id
 JOIN contact_info c   ON c.id = p.contact_id
 LEFT JOIN addresses a ON a.id = p.address_id";

#[derive(Clone)]
pub struct PersonRepo {
  conn:      tokio_rusqlite::Connection,
  names:     NameRepo,
  contacts:  ContactInfoRepo,
  addresses: AddressRepo,
}

impl PersonRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self {
      names:     NameRepo::new(conn.clone()),
      contacts:  ContactInfoRepo::new(conn.clone()),
      addresses: AddressRepo::new(conn.clone()),
      conn,
    }
  }

  /// The person whose name row is `name_id`, if any. Used to refuse a second
  /// person claiming an existing name.
  pub async fn get_by_name_id(&self, name_id: Uuid) -> Result<Option<Person>> {
    let name_uid = encode_uuid(name_id);
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE n.uid = ?1"),
              rusqlite::params![name_uid],
              |row| RawPerson::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn write_links(&self, person: &Person, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO people (uid, name_id, contact_id, address_id)
       VALUES (?1,
               (SELECT id FROM names WHERE uid = ?2),
               (SELECT id FROM contact_info WHERE uid = ?3),
               (SELECT id FROM addresses WHERE uid = ?4))"
    } else {
      "UPDATE people
       SET name_id    = (SELECT id FROM names WHERE uid = ?2),
           contact_id = (SELECT id FROM contact_info WHERE uid = ?3),
           address_id = (SELECT id FROM addresses WHERE uid = ?4)
       WHERE uid = ?1"
    };

    let uid         = encode_uuid(person.uid);
    let name_uid    = encode_uuid(person.name.uid);
    let contact_uid = encode_uuid(person.contact.uid);
    let address_uid = person.address.as_ref().map(|a| encode_uuid(a.uid));

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![uid, name_uid, contact_uid, address_uid],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for PersonRepo {
  type Create = PersonCreate;
  type Entity = Person;
  type Update = PersonUpdate;

  const ENTITY: &'static str = "person";

  async fn get(&self, id: Uuid) -> Result<Option<Person>> {
    let uid = encode_uuid(id);
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE p.uid = ?1"),
              rusqlite::params![uid],
              |row| RawPerson::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("{SELECT} ORDER BY p.id LIMIT ?1 OFFSET ?2"))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawPerson::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn create(&self, new: PersonCreate) -> Result<Person> {
    let name = self.names.get_or_create(new.name).await?;
    let contact = self.contacts.get_or_create(new.contact).await?;
    let address = match new.address {
      Some(reference) => Some(self.addresses.get_or_create(reference).await?),
      None => None,
    };

    let person = Person { uid: Uuid::new_v4(), name, contact, address };
    self.write_links(&person, true).await?;
    Ok(person)
  }

  async fn update(
    &self,
    current: Person,
    patch: PersonUpdate,
  ) -> Result<Person> {
    let Person { uid, name, contact, address } = current;

    let name = match patch.name {
      Field::Absent => name,
      Field::Null => {
        return Err(Error::Invalid("person name cannot be null".to_string()));
      }
      Field::Set(r) => self.names.get_or_update(name, r).await?,
    };

    let contact = match patch.contact {
      Field::Absent => contact,
      Field::Null => {
        return Err(Error::Invalid(
          "person contact cannot be null".to_string(),
        ));
      }
      Field::Set(r) => self.contacts.get_or_update(contact, r).await?,
    };

    let address = match patch.address {
      Field::Absent => address,
      Field::Null => None,
      Field::Set(r) => {
        Some(self.addresses.get_create_or_update(address, r).await?)
      }
    };

    let person = Person { uid, name, contact, address };
    let changed = self.write_links(&person, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", person.uid));
    }
    Ok(person)
  }

  async fn delete(&self, obj: Person) -> Result<Person> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM people WHERE uid = ?1",
          rusqlite::params![uid],
        )?)
      })
      .await
      .map_err(Error::storage)?;

    if deleted == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", obj.uid));
    }
    Ok(obj)
  }
}
