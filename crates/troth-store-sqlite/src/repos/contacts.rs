//! [`ContactInfoRepo`] — CRUD over the `contact_info` table.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Page, Repository, Result,
  contact::{ContactInfo, ContactInfoCreate, ContactInfoUpdate},
};
use uuid::Uuid;

use crate::encode::{RawContactInfo, encode_preferred_method, encode_uuid};

#[derive(Clone)]
pub struct ContactInfoRepo {
  conn: tokio_rusqlite::Connection,
}

impl ContactInfoRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  async fn write_row(
    &self,
    contact: &ContactInfo,
    insert: bool,
  ) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO contact_info
         (uid, name, phone, mobile, email, other_type, other_value,
          preferred_method)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
    } else {
      "UPDATE contact_info
       SET name = ?2, phone = ?3, mobile = ?4, email = ?5, other_type = ?6,
           other_value = ?7, preferred_method = ?8
       WHERE uid = ?1"
    };

    let uid         = encode_uuid(contact.uid);
    let name        = contact.name.clone();
    let phone       = contact.phone.clone();
    let mobile      = contact.mobile.clone();
    let email       = contact.email.clone();
    let other_type  = contact.other_type.clone();
    let other_value = contact.other_value.clone();
    let preferred   =
      encode_preferred_method(contact.preferred_method).to_owned();

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid, name, phone, mobile, email, other_type, other_value,
            preferred,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for ContactInfoRepo {
  type Create = ContactInfoCreate;
  type Entity = ContactInfo;
  type Update = ContactInfoUpdate;

  const ENTITY: &'static str = "contact info";

  async fn get(&self, id: Uuid) -> Result<Option<ContactInfo>> {
    let uid = encode_uuid(id);
    let raw: Option<RawContactInfo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM contact_info WHERE uid = ?1",
                RawContactInfo::COLUMNS
              ),
              rusqlite::params![uid],
              |row| RawContactInfo::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawContactInfo::into_contact_info).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<ContactInfo>> {
    let raws: Vec<RawContactInfo> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM contact_info ORDER BY id LIMIT ?1 OFFSET ?2",
          RawContactInfo::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawContactInfo::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws
      .into_iter()
      .map(RawContactInfo::into_contact_info)
      .collect()
  }

  async fn create(&self, new: ContactInfoCreate) -> Result<ContactInfo> {
    let contact = ContactInfo {
      uid:              Uuid::new_v4(),
      name:             new.name,
      phone:            new.phone,
      mobile:           new.mobile,
      email:            new.email,
      other_type:       new.other_type,
      other_value:      new.other_value,
      preferred_method: new.preferred_method,
    };
    self.write_row(&contact, true).await?;
    Ok(contact)
  }

  async fn update(
    &self,
    mut current: ContactInfo,
    patch: ContactInfoUpdate,
  ) -> Result<ContactInfo> {
    patch.apply(&mut current)?;
    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: ContactInfo) -> Result<ContactInfo> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contact_info WHERE uid = ?1",
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
