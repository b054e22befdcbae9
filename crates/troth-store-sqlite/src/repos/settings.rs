//! [`SettingRepo`] — typed settings over the `settings` table.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Page, Repository, Result,
  setting::{
    Setting, SettingCreate, SettingUpdate, resolve_value_type,
  },
};
use uuid::Uuid;

use crate::encode::{RawSetting, SettingColumns, encode_uuid};

#[derive(Clone)]
pub struct SettingRepo {
  conn: tokio_rusqlite::Connection,
}

impl SettingRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  pub async fn get_by_name(&self, name: &str) -> Result<Option<Setting>> {
    let name = name.to_owned();
    let raw: Option<RawSetting> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM settings WHERE name = ?1",
                RawSetting::COLUMNS
              ),
              rusqlite::params![name],
              |row| RawSetting::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawSetting::into_setting).transpose()
  }

  async fn write_row(&self, setting: &Setting, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO settings
         (uid, name, required, value_type, value_text, value_int, value_real,
          value_bool, value_datetime, value_uuid)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
    } else {
      "UPDATE settings
       SET name = ?2, required = ?3, value_type = ?4, value_text = ?5,
           value_int = ?6, value_real = ?7, value_bool = ?8,
           value_datetime = ?9, value_uuid = ?10
       WHERE uid = ?1"
    };

    let uid        = encode_uuid(setting.uid);
    let name       = setting.name.clone();
    let required   = setting.required;
    let value_type = setting.value_type.discriminant();
    let cols       = SettingColumns::from_value(setting.value.as_ref());

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid,
            name,
            required,
            value_type,
            cols.text,
            cols.int,
            cols.real,
            cols.bool,
            cols.datetime,
            cols.uuid,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for SettingRepo {
  type Create = SettingCreate;
  type Entity = Setting;
  type Update = SettingUpdate;

  const ENTITY: &'static str = "setting";

  async fn get(&self, id: Uuid) -> Result<Option<Setting>> {
    let uid = encode_uuid(id);
    let raw: Option<RawSetting> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM settings WHERE uid = ?1",
                RawSetting::COLUMNS
              ),
              rusqlite::params![uid],
              |row| RawSetting::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawSetting::into_setting).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<Setting>> {
    let raws: Vec<RawSetting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM settings ORDER BY name LIMIT ?1 OFFSET ?2",
          RawSetting::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawSetting::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawSetting::into_setting).collect()
  }

  async fn create(&self, new: SettingCreate) -> Result<Setting> {
    if self.get_by_name(&new.name).await?.is_some() {
      return Err(Error::exists(Self::ENTITY, "name", &new.name));
    }

    let value_type = resolve_value_type(new.value_type, new.value.as_ref());
    let value = new.value.map(|v| v.coerce_to(value_type)).transpose()?;

    let setting = Setting {
      uid: Uuid::new_v4(),
      name: new.name,
      required: new.required,
      value_type,
      value,
    };
    self.write_row(&setting, true).await?;
    Ok(setting)
  }

  async fn update(
    &self,
    mut current: Setting,
    patch: SettingUpdate,
  ) -> Result<Setting> {
    if let troth_core::Field::Set(new_name) = &patch.name {
      if *new_name != current.name
        && self.get_by_name(new_name).await?.is_some()
      {
        return Err(Error::exists(Self::ENTITY, "name", new_name));
      }
    }

    patch.apply(&mut current)?;
    let changed = self.write_row(&current, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", current.uid));
    }
    Ok(current)
  }

  async fn delete(&self, obj: Setting) -> Result<Setting> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM settings WHERE uid = ?1",
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
