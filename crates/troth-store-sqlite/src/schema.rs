//! SQL schema for the Troth SQLite store.
//!
//! Executed once per connection via `PRAGMA user_version`. Future migrations
//! will be gated on that version number.
//!
//! Every table carries an internal integer key plus an externally-exposed
//! `uid`. Foreign keys link the integer ids; the `uid` is the only
//! identifier that crosses the store boundary.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS names (
    id     INTEGER PRIMARY KEY,
    uid    TEXT NOT NULL UNIQUE,
    title  TEXT,
    first  TEXT NOT NULL,
    middle TEXT,
    last   TEXT NOT NULL,
    suffix TEXT,
    short  TEXT
);

CREATE TABLE IF NOT EXISTS addresses (
    id       INTEGER PRIMARY KEY,
    uid      TEXT NOT NULL UNIQUE,
    name     TEXT,
    line_1   TEXT NOT NULL,
    line_2   TEXT,
    line_3   TEXT,
    city     TEXT NOT NULL,
    state    TEXT,
    zip_code INTEGER,
    country  TEXT
);

CREATE TABLE IF NOT EXISTS contact_info (
    id               INTEGER PRIMARY KEY,
    uid              TEXT NOT NULL UNIQUE,
    name             TEXT,
    phone            TEXT,
    mobile           TEXT,
    email            TEXT NOT NULL,
    other_type       TEXT,
    other_value      TEXT,
    preferred_method TEXT NOT NULL DEFAULT 'email'
);

CREATE TABLE IF NOT EXISTS people (
    id         INTEGER PRIMARY KEY,
    uid        TEXT NOT NULL UNIQUE,
    name_id    INTEGER NOT NULL REFERENCES names(id),
    contact_id INTEGER NOT NULL REFERENCES contact_info(id),
    address_id INTEGER REFERENCES addresses(id)
);

-- start/end carry a _time suffix; END is an SQL keyword.
CREATE TABLE IF NOT EXISTS events (
    id         INTEGER PRIMARY KEY,
    uid        TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    date       TEXT NOT NULL,   -- ISO 8601 calendar date
    start_time TEXT,
    end_time   TEXT,
    address_id INTEGER REFERENCES addresses(id)
);

CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY,
    uid             TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    is_poweruser    INTEGER NOT NULL DEFAULT 0,
    is_superuser    INTEGER NOT NULL DEFAULT 0,
    person_id       INTEGER REFERENCES people(id)
);

-- One value column per supported type; value_type says which one is live.
CREATE TABLE IF NOT EXISTS settings (
    id             INTEGER PRIMARY KEY,
    uid            TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL UNIQUE,
    required       INTEGER NOT NULL DEFAULT 0,
    value_type     TEXT NOT NULL,
    value_text     TEXT,
    value_int      INTEGER,
    value_real     REAL,
    value_bool     INTEGER,
    value_datetime TEXT,
    value_uuid     TEXT
);

CREATE TABLE IF NOT EXISTS permissions (
    id             INTEGER PRIMARY KEY,
    uid            TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL UNIQUE,
    description    TEXT,
    create_default INTEGER NOT NULL DEFAULT 0,
    read_default   INTEGER NOT NULL DEFAULT 0,
    update_default INTEGER NOT NULL DEFAULT 0,
    delete_default INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS user_permissions (
    id            INTEGER PRIMARY KEY,
    uid           TEXT NOT NULL UNIQUE,
    user_id       INTEGER NOT NULL REFERENCES users(id),
    permission_id INTEGER NOT NULL REFERENCES permissions(id),
    can_create    INTEGER NOT NULL DEFAULT 0,
    can_read      INTEGER NOT NULL DEFAULT 0,
    can_update    INTEGER NOT NULL DEFAULT 0,
    can_delete    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, permission_id)
);

-- Singleton; creation refuses a second row.
CREATE TABLE IF NOT EXISTS wedding_info (
    id                  INTEGER PRIMARY KEY,
    bride_id            INTEGER REFERENCES people(id),
    groom_id            INTEGER REFERENCES people(id),
    engagement_party_id INTEGER REFERENCES events(id),
    welcome_id          INTEGER REFERENCES events(id),
    rehearsal_dinner_id INTEGER REFERENCES events(id),
    wedding_id          INTEGER REFERENCES events(id),
    reception_id        INTEGER REFERENCES events(id),
    brunch_id           INTEGER REFERENCES events(id)
);

CREATE INDEX IF NOT EXISTS people_name_idx   ON people(name_id);
CREATE INDEX IF NOT EXISTS events_date_idx   ON events(date);
CREATE INDEX IF NOT EXISTS users_email_idx   ON users(email);

PRAGMA user_version = 1;
";
