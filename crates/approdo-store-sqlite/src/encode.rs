//! Encoding/decoding helpers between domain types and their SQLite column
//! representations.
//!
//! Timestamps are stored as RFC 3339 text, calendar dates as ISO 8601 dates,
//! the photo list as a compact JSON array.

use approdo_core::{
  admin::{Admin, AdminRole, AdminStatus},
  person::{Family, Migration, Naturalization, NewPerson, Person, Residence},
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("bad date {s:?}: {e}")))
}

// ─── Photo lists ─────────────────────────────────────────────────────────────

pub fn encode_photos(photos: &[String]) -> Result<String> {
  Ok(serde_json::to_string(photos)?)
}

pub fn decode_photos(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Admin role and status ───────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<AdminRole> {
  AdminRole::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown admin role: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<AdminStatus> {
  AdminStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown admin status: {s:?}")))
}

// ─── Person rows ─────────────────────────────────────────────────────────────

/// Column list shared by every `persons` SELECT, in [`RawPerson`] field
/// order. `full_name` and `has_photo` are derived columns and are not read
/// back.
pub const PERSON_COLUMNS: &str = "person_id, christian_name, surname, \
   date_of_birth, place_of_birth, date_of_death, occupation, \
   additional_notes, reference, id_card_no, photos, names_of_parents, \
   names_of_children, date_of_naturalisation, no_of_cert, issued_at, \
   town_or_city, home_at_death, date_of_arrival_aus, date_of_arrival_nt, \
   arrival_period, data_source, created_at, updated_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:              i64,
  pub christian_name:         String,
  pub surname:                String,
  pub date_of_birth:          Option<i32>,
  pub place_of_birth:         Option<String>,
  pub date_of_death:          Option<i32>,
  pub occupation:             Option<String>,
  pub additional_notes:       Option<String>,
  pub reference:              Option<String>,
  pub id_card_no:             Option<String>,
  pub photos:                 String,
  pub names_of_parents:       Option<String>,
  pub names_of_children:      Option<String>,
  pub date_of_naturalisation: Option<String>,
  pub no_of_cert:             Option<String>,
  pub issued_at:              Option<String>,
  pub town_or_city:           Option<String>,
  pub home_at_death:          Option<String>,
  pub date_of_arrival_aus:    Option<String>,
  pub date_of_arrival_nt:     Option<String>,
  pub arrival_period:         Option<String>,
  pub data_source:            Option<String>,
  pub created_at:             String,
  pub updated_at:             String,
}

impl RawPerson {
  /// Read one row laid out as [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:              row.get(0)?,
      christian_name:         row.get(1)?,
      surname:                row.get(2)?,
      date_of_birth:          row.get(3)?,
      place_of_birth:         row.get(4)?,
      date_of_death:          row.get(5)?,
      occupation:             row.get(6)?,
      additional_notes:       row.get(7)?,
      reference:              row.get(8)?,
      id_card_no:             row.get(9)?,
      photos:                 row.get(10)?,
      names_of_parents:       row.get(11)?,
      names_of_children:      row.get(12)?,
      date_of_naturalisation: row.get(13)?,
      no_of_cert:             row.get(14)?,
      issued_at:              row.get(15)?,
      town_or_city:           row.get(16)?,
      home_at_death:          row.get(17)?,
      date_of_arrival_aus:    row.get(18)?,
      date_of_arrival_nt:     row.get(19)?,
      arrival_period:         row.get(20)?,
      data_source:            row.get(21)?,
      created_at:             row.get(22)?,
      updated_at:             row.get(23)?,
    })
  }

  /// Decode the raw row into the domain type.
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:        self.person_id,
      christian_name:   self.christian_name,
      surname:          self.surname,
      date_of_birth:    self.date_of_birth,
      place_of_birth:   self.place_of_birth,
      date_of_death:    self.date_of_death,
      occupation:       self.occupation,
      additional_notes: self.additional_notes,
      reference:        self.reference,
      id_card_no:       self.id_card_no,
      photos:           decode_photos(&self.photos)?,
      family:           Family {
        names_of_parents:  self.names_of_parents,
        names_of_children: self.names_of_children,
      },
      naturalization:   Naturalization {
        date_of_naturalisation: self
          .date_of_naturalisation
          .as_deref()
          .map(decode_date)
          .transpose()?,
        no_of_cert:             self.no_of_cert,
        issued_at:              self.issued_at,
      },
      residence:        Residence {
        town_or_city:  self.town_or_city,
        home_at_death: self.home_at_death,
      },
      migration:        Migration {
        date_of_arrival_aus: self
          .date_of_arrival_aus
          .as_deref()
          .map(decode_date)
          .transpose()?,
        date_of_arrival_nt:  self
          .date_of_arrival_nt
          .as_deref()
          .map(decode_date)
          .transpose()?,
        arrival_period:      self.arrival_period,
        data_source:         self.data_source,
      },
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Owned, pre-encoded column values for an INSERT or UPDATE of a `persons`
/// row, ready to move into a connection closure.
pub struct PersonValues {
  pub christian_name:         String,
  pub surname:                String,
  pub date_of_birth:          Option<i32>,
  pub place_of_birth:         Option<String>,
  pub date_of_death:          Option<i32>,
  pub occupation:             Option<String>,
  pub additional_notes:       Option<String>,
  pub reference:              Option<String>,
  pub id_card_no:             Option<String>,
  pub photos:                 String,
  pub has_photo:              bool,
  pub names_of_parents:       Option<String>,
  pub names_of_children:      Option<String>,
  pub date_of_naturalisation: Option<String>,
  pub no_of_cert:             Option<String>,
  pub issued_at:              Option<String>,
  pub town_or_city:           Option<String>,
  pub home_at_death:          Option<String>,
  pub date_of_arrival_aus:    Option<String>,
  pub date_of_arrival_nt:     Option<String>,
  pub arrival_period:         Option<String>,
  pub data_source:            Option<String>,
}

impl PersonValues {
  /// Encode a normalised input for binding. `has_photo` is derived from the
  /// photo list here so the column can never disagree with it.
  pub fn encode(input: &NewPerson) -> Result<Self> {
    Ok(Self {
      christian_name:         input.christian_name.clone(),
      surname:                input.surname.clone(),
      date_of_birth:          input.date_of_birth,
      place_of_birth:         input.place_of_birth.clone(),
      date_of_death:          input.date_of_death,
      occupation:             input.occupation.clone(),
      additional_notes:       input.additional_notes.clone(),
      reference:              input.reference.clone(),
      id_card_no:             input.id_card_no.clone(),
      photos:                 encode_photos(&input.photos)?,
      has_photo:              !input.photos.is_empty(),
      names_of_parents:       input.family.names_of_parents.clone(),
      names_of_children:      input.family.names_of_children.clone(),
      date_of_naturalisation: input
        .naturalization
        .date_of_naturalisation
        .map(encode_date),
      no_of_cert:             input.naturalization.no_of_cert.clone(),
      issued_at:              input.naturalization.issued_at.clone(),
      town_or_city:           input.residence.town_or_city.clone(),
      home_at_death:          input.residence.home_at_death.clone(),
      date_of_arrival_aus:    input
        .migration
        .date_of_arrival_aus
        .map(encode_date),
      date_of_arrival_nt:     input
        .migration
        .date_of_arrival_nt
        .map(encode_date),
      arrival_period:         input.migration.arrival_period.clone(),
      data_source:            input.migration.data_source.clone(),
    })
  }
}

// ─── Admin rows ──────────────────────────────────────────────────────────────

/// Column list shared by every `admins` SELECT, in [`RawAdmin`] field order.
/// `password_hash` is deliberately excluded; operations that need it select
/// it explicitly.
pub const ADMIN_COLUMNS: &str = "admin_id, name, email, role, status, \
   profile_picture, created_at, last_login";

/// Raw values read directly from an `admins` row.
pub struct RawAdmin {
  pub admin_id:        i64,
  pub name:            String,
  pub email:           String,
  pub role:            String,
  pub status:          String,
  pub profile_picture: Option<String>,
  pub created_at:      String,
  pub last_login:      Option<String>,
}

impl RawAdmin {
  /// Read one row laid out as [`ADMIN_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      admin_id:        row.get(0)?,
      name:            row.get(1)?,
      email:           row.get(2)?,
      role:            row.get(3)?,
      status:          row.get(4)?,
      profile_picture: row.get(5)?,
      created_at:      row.get(6)?,
      last_login:      row.get(7)?,
    })
  }

  /// Decode the raw row into the domain type.
  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      admin_id:        self.admin_id,
      name:            self.name,
      email:           self.email,
      role:            decode_role(&self.role)?,
      status:          decode_status(&self.status)?,
      profile_picture: self.profile_picture,
      created_at:      decode_dt(&self.created_at)?,
      last_login:      self.last_login.as_deref().map(decode_dt).transpose()?,
    })
  }
}
