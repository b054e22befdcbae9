//! [`AddressRepo`] — CRUD over the `addresses` table.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Page, Repository, Result,
  address::{Address, AddressCreate, AddressUpdate},
};
use uuid::Uuid;

use crate::encode::{RawAddress, encode_uuid};

#[derive(Clone)]
pub struct AddressRepo {
  conn: tokio_rusqlite::Connection,
}

impl AddressRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  async fn write_row(&self, address: &Address, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO addresses
         (uid, name, line_1, line_2, line_3, city, state, zip_code, country)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    } else {
      "UPDATE addresses
       SET name = ?2, line_1 = ?3, line_2 = ?4, line_3 = ?5, city = ?6,
           state = ?7, zip_code = ?8, country = ?9
       WHERE uid = ?1"
    };

    let uid      = encode_uuid(address.uid);
    let name     = address.name.clone();
    let line_1   = address.line_1.clone();
    let line_2   = address.line_2.clone();
    let line_3   = address.line_3.clone();
    let city     = address.city.clone();
    let state    = address.state.clone();
    let zip_code = address.zip_code;
    let country  = address.country.clone();

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid, name, line_1, line_2, line_3, city, state, zip_code, country,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for AddressRepo {
  type Create = AddressCreate;
  type Entity = Address;
  type Update = AddressUpdate;

  const ENTITY: &'static str = "address";

  async fn get(&self, id: Uuid) -> Result<Option<Address>> {
    let uid = encode_uuid(id);
    let raw: Option<RawAddress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM addresses WHERE uid = ?1",
                RawAddress::COLUMNS
              ),
              rusqlite::params![uid],
              |row| RawAddress::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawAddress::into_address).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Address>> {
    let raws: Vec<RawAddress> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM addresses ORDER BY id LIMIT ?1 OFFSET ?2",
          RawAddress::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawAddress::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawAddress::into_address).collect()
  }

  async fn create(&self, new: AddressCreate) -> Result<Address> {
    let address = Address {
      uid:      Uuid::new_v4(),
      name:     new.name,
      line_1:   new.line_1,
      line_2:   new.line_2,
      line_3:   new.line_3,
      city:     new.city,
      state:    new.state,
      zip_code: new.zip_code,
      country:  new.country,
    };
    self.write_row(&address, true).await?;
    Ok(address)
  }

  async fn update(
    &self,
    mut current: Address,
    patch: AddressUpdate,
  ) -> Result<Address> {
    patch.apply(&mut current)?;
    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: Address) -> Result<Address> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM addresses WHERE uid = ?1",
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
