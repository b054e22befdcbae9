//! [`NameRepo`] — CRUD over the `names` table.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Page, Repository, Result,
  name::{Name, NameCreate, NameUpdate},
};
use uuid::Uuid;

use crate::encode::{RawName, encode_uuid};

#[derive(Clone)]
pub struct NameRepo {
  conn: tokio_rusqlite::Connection,
}

impl NameRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  async fn write_row(&self, name: &Name, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO names (uid, title, first, middle, last, suffix, short)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    } else {
      "UPDATE names
       SET title = ?2, first = ?3, middle = ?4, last = ?5, suffix = ?6,
           short = ?7
       WHERE uid = ?1"
    };

    let uid    = encode_uuid(name.uid);
    let title  = name.title.clone();
    let first  = name.first.clone();
    let middle = name.middle.clone();
    let last   = name.last.clone();
    let suffix = name.suffix.clone();
    let short  = name.short.clone();

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![uid, title, first, middle, last, suffix, short],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for NameRepo {
  type Create = NameCreate;
  type Entity = Name;
  type Update = NameUpdate;

  const ENTITY: &'static str = "name";

  async fn get(&self, id: Uuid) -> Result<Option<Name>> {
    let uid = encode_uuid(id);
    let raw: Option<RawName> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM names WHERE uid = ?1",
                RawName::COLUMNS
              ),
              rusqlite::params![uid],
              |row| RawName::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawName::into_name).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Name>> {
    let raws: Vec<RawName> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM names ORDER BY id LIMIT ?1 OFFSET ?2",
          RawName::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawName::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawName::into_name).collect()
  }

  async fn create(&self, new: NameCreate) -> Result<Name> {
    let name = Name {
      uid:    Uuid::new_v4(),
      title:  new.title,
      first:  new.first,
      middle: new.middle,
      last:   new.last,
      suffix: new.suffix,
      short:  new.short,
    };
    self.write_row(&name, true).await?;
    Ok(name)
  }

  async fn update(&self, mut current: Name, patch: NameUpdate) -> Result<Name> {
    patch.apply(&mut current)?;
    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: Name) -> Result<Name> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM names WHERE uid = ?1",
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
