//! [`UserRepo`] — accounts over the `users` table.
//!
//! Plaintext passwords are hashed here, at the storage boundary; nothing
//! below this point ever sees one.

use rusqlite::OptionalExtension as _;
use troth_core::{
  Error, Field, Page, Repository, Result, security,
  user::{User, UserCreate, UserUpdate},
};
use uuid::Uuid;

use crate::{
  encode::{RawUser, encode_uuid},
  repos::PersonRepo,
};

// RawUser offsets: user 0..=5, person aggregate from 6 (name 7, contact 14,
// address 22).
const SELECT: &str = "SELECT u.uid, u.email, u.hashed_password, u.is_active,
   u.is_poweruser, u.is_superuser,
   p.uid,
   n.uid, n.title, n.first, n.middle, n.last, n.suffix, n.short,
   c.uid, c.name, c.phone, c.mobile, c.email, c.other_type, c.other_value,
   c.preferred_method,
   a.uid, a.name, a.line_1, a.line_2, a.line_3, a.city, a.state, a.zip_code,
   a.country
 FROM users u
 LEFT JOIN people p       ON p.id = u.person_id
 LEFT JOIN names n        ON n.id = p.name_id
 LEFT JOIN contact_info c ON c.id = p.contact_id
 LEFT JOIN addresses a    ON a.id = p.address_id";

#[derive(Clone)]
pub struct UserRepo {
  conn:   tokio_rusqlite::Connection,
  people: PersonRepo,
}

impl UserRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { people: PersonRepo::new(conn.clone()), conn }
  }

  pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE u.email = ?1"),
              rusqlite::params![email],
              |row| RawUser::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawUser::into_user).transpose()
  }

  /// The user matching the credentials, or `None` when either the email is
  /// unknown or the password does not verify. The caller cannot tell which.
  pub async fn authenticate(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Option<User>> {
    let Some(user) = self.get_by_email(email).await? else {
      return Ok(None);
    };
    if !security::verify_password(password, &user.hashed_password) {
      return Ok(None);
    }
    Ok(Some(user))
  }

  async fn write_row(&self, user: &User, insert: bool) -> Result<usize> {
    let sql = if insert {
      "INSERT INTO users
         (uid, email, hashed_password, is_active, is_poweruser, is_superuser,
          person_id)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6,
               (SELECT id FROM people WHERE uid = ?7))"
    } else {
      "UPDATE users
       SET email = ?2, hashed_password = ?3, is_active = ?4,
           is_poweruser = ?5, is_superuser = ?6,
           person_id = (SELECT id FROM people WHERE uid = ?7)
       WHERE uid = ?1"
    };

    let uid          = encode_uuid(user.uid);
    let email        = user.email.clone();
    let hashed       = user.hashed_password.clone();
    let is_active    = user.is_active;
    let is_poweruser = user.is_poweruser;
    let is_superuser = user.is_superuser;
    let person_uid   = user.person.as_ref().map(|p| encode_uuid(p.uid));

    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            uid, email, hashed, is_active, is_poweruser, is_superuser,
            person_uid,
          ],
        )?)
      })
      .await
      .map_err(Error::storage)
  }
}

impl Repository for UserRepo {
  type Create = UserCreate;
  type Entity = User;
  type Update = UserUpdate;

  const ENTITY: &'static str = "user";

  async fn get(&self, id: Uuid) -> Result<Option<User>> {
    let uid = encode_uuid(id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT} WHERE u.uid = ?1"),
              rusqlite::params![uid],
              |row| RawUser::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn all(&self, page: Page) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("{SELECT} ORDER BY u.id LIMIT ?1 OFFSET ?2"))?;
        let rows = stmt
          .query_map(
            rusqlite::params![page.limit as i64, page.skip as i64],
            |row| RawUser::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn create(&self, new: UserCreate) -> Result<User> {
    if self.get_by_email(&new.email).await?.is_some() {
      return Err(Error::exists(Self::ENTITY, "email", &new.email));
    }

    let person = match new.person {
      Some(reference) => Some(self.people.get_or_create(reference).await?),
      None => None,
    };

    let user = User {
      uid:             Uuid::new_v4(),
      email:           new.email,
      hashed_password: security::hash_password(&new.password)?,
      is_active:       new.is_active,
      is_poweruser:    new.is_poweruser,
      is_superuser:    new.is_superuser,
      person,
    };
    self.write_row(&user, true).await?;
    Ok(user)
  }

  async fn update(&self, current: User, patch: UserUpdate) -> Result<User> {
    let User {
      uid,
      mut email,
      hashed_password,
      mut is_active,
      mut is_poweruser,
      mut is_superuser,
      person,
    } = current;

    if let Field::Set(new_email) = &patch.email {
      if *new_email != email
        && self.get_by_email(new_email).await?.is_some()
      {
        return Err(Error::exists(Self::ENTITY, "email", new_email));
      }
    }
    patch.email.apply(&mut email, "email")?;

    let hashed_password = match patch.password {
      Field::Absent => hashed_password,
      Field::Null => {
        return Err(Error::Invalid("password cannot be null".to_string()));
      }
      Field::Set(plain) => security::hash_password(&plain)?,
    };

    patch.is_active.apply(&mut is_active, "isActive")?;
    patch.is_poweruser.apply(&mut is_poweruser, "isPoweruser")?;
    patch.is_superuser.apply(&mut is_superuser, "isSuperuser")?;

    let person = match patch.person {
      Field::Absent => person,
      Field::Null => None,
      Field::Set(r) => {
        Some(self.people.get_create_or_update(person, r).await?)
      }
    };

    let user = User {
      uid,
      email,
      hashed_password,
      is_active,
      is_poweruser,
      is_superuser,
      person,
    };
    let changed = self.write_row(&user, false).await?;
    if changed == 0 {
      return Err(Error::not_found(Self::ENTITY, "id", user.uid));
    }
    Ok(user)
  }

  async fn delete(&self, obj: User) -> Result<User> {
    let uid = encode_uuid(obj.uid);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE uid = ?1",
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
