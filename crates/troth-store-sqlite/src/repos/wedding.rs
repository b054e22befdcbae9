//! [`WeddingInfoRepo`] — the singleton wedding row.
//!
//! There is at most one `wedding_info` row; `create` refuses a second. The
//! row only links people and events, so the embedded repositories do all the
//! heavy lifting.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Field, Repository as _, Result,
  event::{Event, EventCreate, EventUpdate},
  person::{Person, PersonCreate, PersonUpdate},
  refs::{ChangeRef, CreateRef},
  wedding::{WeddingInfo, WeddingInfoCreate, WeddingInfoUpdate},
};

use crate::{
  encode::{RawWeddingInfo, decode_uuid, encode_uuid},
  repos::{EventRepo, PersonRepo},
};

const SELECT: &str = "SELECT
   (SELECT uid FROM people WHERE id = w.bride_id),
   (SELECT uid FROM people WHERE id = w.groom_id),
   (SELECT uid FROM events WHERE id = w.engagement_party_id),
   (SELECT uid FROM events WHERE id = w.welcome_id),
   (SELECT uid FROM events WHERE id = w.rehearsal_dinner_id),
   (SELECT uid FROM events WHERE id = w.wedding_id),
   (SELECT uid FROM events WHERE id = w.reception_id),
   (SELECT uid FROM events WHERE id = w.brunch_id)
 FROM wedding_info w";

#[derive(Clone)]
pub struct WeddingInfoRepo {
  conn:   tokio_rusqlite::Connection,
  people: PersonRepo,
  events: EventRepo,
}

impl WeddingInfoRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self {
      people: PersonRepo::new(conn.clone()),
      events: EventRepo::new(conn.clone()),
      conn,
    }
  }

  pub async fn get(&self) -> Result<Option<WeddingInfo>> {
    let raw: Option<RawWeddingInfo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT, [], RawWeddingInfo::from_row)
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    match raw {
      Some(raw) => Ok(Some(self.hydrate(raw).await?)),
      None => Ok(None),
    }
  }

  pub async fn get_required(&self) -> Result<WeddingInfo> {
    self
      .get()
      .await?
      .ok_or_else(|| Error::not_found("wedding info", "id", 1))
  }

  pub async fn create(&self, new: WeddingInfoCreate) -> Result<WeddingInfo> {
    if self.get().await?.is_some() {
      return Err(Error::exists("wedding info", "id", 1));
    }

    let info = WeddingInfo {
      bride:            self.create_person_slot(new.bride).await?,
      groom:            self.create_person_slot(new.groom).await?,
      engagement_party: self.create_event_slot(new.engagement_party).await?,
      welcome:          self.create_event_slot(new.welcome).await?,
      rehearsal_dinner: self.create_event_slot(new.rehearsal_dinner).await?,
      wedding:          self.create_event_slot(new.wedding).await?,
      reception:        self.create_event_slot(new.reception).await?,
      brunch:           self.create_event_slot(new.brunch).await?,
    };
    self.write_links(&info, true).await?;
    Ok(info)
  }

  pub async fn update(
    &self,
    current: WeddingInfo,
    patch: WeddingInfoUpdate,
  ) -> Result<WeddingInfo> {
    let info = WeddingInfo {
      bride: self.update_person_slot(current.bride, patch.bride).await?,
      groom: self.update_person_slot(current.groom, patch.groom).await?,
      engagement_party: self
        .update_event_slot(current.engagement_party, patch.engagement_party)
        .await?,
      welcome: self
        .update_event_slot(current.welcome, patch.welcome)
        .await?,
      rehearsal_dinner: self
        .update_event_slot(current.rehearsal_dinner, patch.rehearsal_dinner)
        .await?,
      wedding: self
        .update_event_slot(current.wedding, patch.wedding)
        .await?,
      reception: self
        .update_event_slot(current.reception, patch.reception)
        .await?,
      brunch: self.update_event_slot(current.brunch, patch.brunch).await?,
    };
    let changed = self.write_links(&info, false).await?;
    if changed == 0 {
      return Err(Error::not_found("wedding info", "id", 1));
    }
    Ok(info)
  }

  async fn hydrate(&self, raw: RawWeddingInfo) -> Result<WeddingInfo> {
    Ok(WeddingInfo {
      bride:            self.hydrate_person(raw.bride).await?,
      groom:            self.hydrate_person(raw.groom).await?,
      engagement_party: self.hydrate_event(raw.engagement_party).await?,
      welcome:          self.hydrate_event(raw.welcome).await?,
      rehearsal_dinner: self.hydrate_event(raw.rehearsal_dinner).await?,
      wedding:          self.hydrate_event(raw.wedding).await?,
      reception:        self.hydrate_event(raw.reception).await?,
      brunch:           self.hydrate_event(raw.brunch).await?,
    })
  }

  async fn hydrate_person(
    &self,
    uid: Option<String>,
  ) -> Result<Option<Person>> {
    match uid {
      Some(uid) => {
        Ok(Some(self.people.get_required(decode_uuid(&uid)?).await?))
      }
      None => Ok(None),
    }
  }

  async fn hydrate_event(&self, uid: Option<String>) -> Result<Option<Event>> {
    match uid {
      Some(uid) => {
        Ok(Some(self.events.get_required(decode_uuid(&uid)?).await?))
      }
      None => Ok(None),
    }
  }

  async fn create_person_slot(
    &self,
    reference: Option<CreateRef<PersonCreate>>,
  ) -> Result<Option<Person>> {
    match reference {
      Some(r) => Ok(Some(self.people.get_or_create(r).await?)),
      None => Ok(None),
    }
  }

  async fn create_event_slot(
    &self,
    reference: Option<CreateRef<EventCreate>>,
  ) -> Result<Option<Event>> {
    match reference {
      Some(r) => Ok(Some(self.events.get_or_create(r).await?)),
      None => Ok(None),
    }
  }

  async fn update_person_slot(
    &self,
    current: Option<Person>,
    patch: Field<ChangeRef<PersonCreate, PersonUpdate>>,
  ) -> Result<Option<Person>> {
    match patch {
      Field::Absent => Ok(current),
      Field::Null => Ok(None),
      Field::Set(r) => {
        Ok(Some(self.people.get_create_or_update(current, r).await?))
      }
    }
  }

  async fn update_event_slot(
    &self,
    current: Option<Event>,
    patch: Field<ChangeRef<EventCreate, EventUpdate>>,
  ) -> Result<Option<Event>> {
    match patch {
      Field::Absent => Ok(current),
      Field::Null => Ok(None),
      Field::Set(r) => {
        Ok(Some(self.events.get_create_or_update(current, r).await?))
      }
    }
  }

  async fn write_links(&self, info: &WeddingInfo, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO wedding_info
         (bride_id, groom_id, engagement_party_id, welcome_id,
          rehearsal_dinner_id, wedding_id, reception_id, brunch_id)
       VALUES ((SELECT id FROM people WHERE uid = ?1),
               (SELECT id FROM people WHERE uid = ?2),
               (SELECT id FROM events WHERE uid = ?3),
               (SELECT id FROM events WHERE uid = ?4),
               (SELECT id FROM events WHERE uid = ?5),
               (SELECT id FROM events WHERE uid = ?6),
               (SELECT id FROM events WHERE uid = ?7),
               (SELECT id FROM events WHERE uid = ?8))"
    } else {
      "UPDATE wedding_info
       SET bride_id            = (SELECT id FROM people WHERE uid = ?1),
           groom_id            = (SELECT id FROM people WHERE uid = ?2),
           engagement_party_id = (SELECT id FROM events WHERE uid = ?3),
           welcome_id          = (SELECT id FROM events WHERE uid = ?4),
           rehearsal_dinner_id = (SELECT id FROM events WHERE uid = ?5),
           wedding_id          = (SELECT id FROM events WHERE uid = ?6),
           reception_id        = (SELECT id FROM events WHERE uid = ?7),
           brunch_id           = (SELECT id FROM events WHERE uid = ?8)"
    };

    let bride   = info.bride.as_ref().map(|p| encode_uuid(p.uid));
    let groom   = info.groom.as_ref().map(|p| encode_uuid(p.uid));
    let engage  = info.engagement_party.as_ref().map(|e| encode_uuid(e.uid));
    let welcome = info.welcome.as_ref().map(|e| encode_uuid(e.uid));
    let dinner  = info.rehearsal_dinner.as_ref().map(|e| encode_uuid(e.uid));
    let wedding = info.wedding.as_ref().map(|e| encode_uuid(e.uid));
    let recept  = info.reception.as_ref().map(|e| encode_uuid(e.uid));
    let brunch  = info.brunch.as_ref().map(|e| encode_uuid(e.uid));

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            bride, groom, engage, welcome, dinner, wedding, recept, brunch,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}
