//! SQL schema for the Approdo SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `persons.person_id` is `AUTOINCREMENT` so an identifier is never reissued
/// after its record is deleted. `full_name` is generated in the database so
/// combined-name search and sorting read one column.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id              INTEGER PRIMARY KEY AUTOINCREMENT,
    christian_name         TEXT NOT NULL,
    surname                TEXT NOT NULL,
    full_name              TEXT GENERATED ALWAYS AS (christian_name || ' ' || surname) VIRTUAL,
    date_of_birth          INTEGER,        -- year only; the registers rarely carry full dates
    place_of_birth         TEXT,
    date_of_death          INTEGER,        -- year only
    occupation             TEXT,
    additional_notes       TEXT,
    reference              TEXT,
    id_card_no             TEXT,
    photos                 TEXT NOT NULL DEFAULT '[]',  -- JSON array; first entry is the primary photo
    has_photo              INTEGER NOT NULL DEFAULT 0,  -- kept in lockstep with photos on every write
    names_of_parents       TEXT,
    names_of_children      TEXT,
    date_of_naturalisation TEXT,            -- ISO 8601 date
    no_of_cert             TEXT,
    issued_at              TEXT,
    town_or_city           TEXT,
    home_at_death          TEXT,
    date_of_arrival_aus    TEXT,            -- ISO 8601 date
    date_of_arrival_nt     TEXT,            -- ISO 8601 date
    arrival_period         TEXT,
    data_source            TEXT,
    created_at             TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at             TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_name_idx       ON persons(surname, christian_name);
CREATE INDEX IF NOT EXISTS persons_birth_year_idx ON persons(date_of_birth);
CREATE INDEX IF NOT EXISTS persons_birthplace_idx ON persons(place_of_birth);
CREATE INDEX IF NOT EXISTS persons_town_idx       ON persons(town_or_city);
CREATE INDEX IF NOT EXISTS persons_arrival_idx    ON persons(date_of_arrival_nt);

CREATE TABLE IF NOT EXISTS admins (
    admin_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,   -- stored lower-cased
    password_hash   TEXT NOT NULL,          -- argon2 PHC string; never leaves the store layer
    role            TEXT NOT NULL DEFAULT 'Viewer',
    status          TEXT NOT NULL DEFAULT 'Active',
    profile_picture TEXT,
    created_at      TEXT NOT NULL,
    last_login      TEXT
);

PRAGMA user_version = 1;
";
