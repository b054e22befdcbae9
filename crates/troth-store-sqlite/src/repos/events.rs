//! [`EventRepo`] — the event aggregate over the `events` table.

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Field, Page, Repository, Result,
  event::{Event, EventCreate, EventUpdate},
};
use uuid::Uuid;

use crate::{
  encode::{RawEvent, encode_date, encode_time, encode_uuid},
  repos::AddressRepo,
};

// RawEvent offsets: event 0..=4, address 5..=13.
const SELECT: &str = "SELECT e.uid, e.name, e.date, e.start_time, e.end_time,
   a.uid, a.name, a.line_1, a.line_2, a.line_3, a.city, a.state, a.zip_code,
   a.country
 FROM events e
 LEFT JOIN addresses a ON a.id = e.address_id";

#[derive(Clone)]
pub struct EventRepo {
  conn:      tokio_rusqlite::Connection,
  addresses: AddressRepo,
}

impl EventRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { addresses: AddressRepo::new(conn.clone()), conn }
  }

  /// Events with `start <= date < end`; either bound may be open.
  pub async fn all_in_range(
    &self,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    page: Page,
  ) -> Result<Vec<Event>> {
    let start_str = start.map(encode_date);
    let end_str   = end.map(encode_date);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; param indices stay fixed.
        let mut conds: Vec<&'static str> = vec![];
        if start_str.is_some() {
          conds.push("e.date >= ?1");
        }
        if end_str.is_some() {
          conds.push("e.date < ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "{SELECT} {where_clause} ORDER BY e.date, e.start_time
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              start_str.as_deref(),
              end_str.as_deref(),
              page.limit as i64,
              page.skip as i64,
            ],
            |row| RawEvent::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  pub async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
    let date_str = encode_date(date);
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT} WHERE e.date = ?1 ORDER BY e.start_time"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            RawEvent::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  pub async fn get_by_address_id(
    &self,
    address_id: Uuid,
  ) -> Result<Vec<Event>> {
    let address_uid = encode_uuid(address_id);
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT} WHERE a.uid = ?1 ORDER BY e.date"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![address_uid], |row| {
            RawEvent::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn write_row(&self, event: &Event, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO events (uid, name, date, start_time, end_time, address_id)
       VALUES (?1, ?2, ?3, ?4, ?5,
               (SELECT id FROM addresses WHERE uid = ?6))"
    } else {
      "UPDATE events
       SET name = ?2, date = ?3, start_time = ?4, end_time = ?5,
           address_id = (SELECT id FROM addresses WHERE uid = ?6)
       WHERE uid = ?1"
    };

    let uid         = encode_uuid(event.uid);
    let name        = event.name.clone();
    let date        = encode_date(event.date);
    let start       = event.start.map(encode_time);
    let end         = event.end.map(encode_time);
    let address_uid = event.address.as_ref().map(|a| encode_uuid(a.uid));

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![uid, name, date, start, end, address_uid],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for EventRepo {
  type Create = EventCreate;
  type Entity = Event;
  type Update = EventUpdate;

  const ENTITY: &'static str = "event";

  async fn get(&self, id: Uuid) -> Result<Option<Event>> {
    let uid = encode_uuid(id);
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE e.uid = ?1"),
              rusqlite::params![uid],
              |row| RawEvent::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT} ORDER BY e.date, e.start_time LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawEvent::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn create(&self, new: EventCreate) -> Result<Event> {
    let address = match new.address {
      Some(reference) => Some(self.addresses.get_or_create(reference).await?),
      None => None,
    };

    let event = Event {
      uid: Uuid::new_v4(),
      name: new.name,
      date: new.date,
      start: new.start,
      end: new.end,
      address,
    };
    self.write_row(&event, true).await?;
    Ok(event)
  }

  async fn update(
    &self,
    mut current: Event,
    mut patch: EventUpdate,
  ) -> Result<Event> {
    let address = std::mem::take(&mut current.address);
    current.address = match std::mem::take(&mut patch.address) {
      Field::Absent => address,
      Field::Null => None,
      Field::Set(r) => {
        Some(self.addresses.get_create_or_update(address, r).await?)
      }
    };

    patch.apply_scalars(&mut current)?;

    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: Event) -> Result<Event> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM events WHERE uid = ?1",
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
