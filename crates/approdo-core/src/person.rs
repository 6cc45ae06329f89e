//! Person — one migrant record in the archive.
//!
//! A record stores the two name parts separately; the full name is always
//! derived from them and never stored or edited on its own. Photo references
//! are an ordered list of opaque strings, first entry is the primary photo.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, text};

// ─── Field sub-groups ────────────────────────────────────────────────────────

/// Family details transcribed from the source documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Family {
  pub names_of_parents:  Option<String>,
  pub names_of_children: Option<String>,
}

/// Naturalisation certificate details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Naturalization {
  pub date_of_naturalisation: Option<NaiveDate>,
  pub no_of_cert:             Option<String>,
  /// Place the certificate was issued at.
  pub issued_at:              Option<String>,
}

/// Where the person settled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Residence {
  pub town_or_city:  Option<String>,
  pub home_at_death: Option<String>,
}

/// Arrival details. `date_of_arrival_nt` is the date the person reached the
/// Northern Territory, as opposed to Australia as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Migration {
  pub date_of_arrival_aus: Option<NaiveDate>,
  pub date_of_arrival_nt:  Option<NaiveDate>,
  /// Free-text era label from the source register, e.g. "pre-war".
  pub arrival_period:      Option<String>,
  pub data_source:         Option<String>,
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A stored migrant record. `person_id` and both timestamps are assigned by
/// the store and never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:        i64,
  pub christian_name:   String,
  pub surname:          String,
  /// Year of birth; day-level precision is not available in the registers.
  pub date_of_birth:    Option<i32>,
  pub place_of_birth:   Option<String>,
  pub date_of_death:    Option<i32>,
  pub occupation:       Option<String>,
  pub additional_notes: Option<String>,
  /// Archive reference code for the source document.
  pub reference:        Option<String>,
  pub id_card_no:       Option<String>,
  /// Ordered photo references; the first entry is the primary photo.
  #[serde(default)]
  pub photos:           Vec<String>,
  #[serde(default)]
  pub family:           Family,
  #[serde(default)]
  pub naturalization:   Naturalization,
  #[serde(default)]
  pub residence:        Residence,
  #[serde(default)]
  pub migration:        Migration,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Person {
  /// Display name derived from the two stored name parts.
  pub fn full_name(&self) -> String {
    text::tidy(&format!("{} {}", self.christian_name, self.surname))
  }

  /// True iff at least one photo reference is attached.
  pub fn has_photo(&self) -> bool {
    !self.photos.is_empty()
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Input to [`PersonStore::create`](crate::store::PersonStore::create) and
/// [`PersonStore::update`](crate::store::PersonStore::update).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
  pub christian_name:   String,
  pub surname:          String,
  pub date_of_birth:    Option<i32>,
  pub place_of_birth:   Option<String>,
  pub date_of_death:    Option<i32>,
  pub occupation:       Option<String>,
  pub additional_notes: Option<String>,
  pub reference:        Option<String>,
  pub id_card_no:       Option<String>,
  #[serde(default)]
  pub photos:           Vec<String>,
  #[serde(default)]
  pub family:           Family,
  #[serde(default)]
  pub naturalization:   Naturalization,
  #[serde(default)]
  pub residence:        Residence,
  #[serde(default)]
  pub migration:        Migration,
}

impl NewPerson {
  /// Tidy every single-line text field and reject input without both name
  /// parts. Multi-line notes are only trimmed, never collapsed.
  pub fn normalised(mut self) -> Result<Self> {
    self.christian_name = text::tidy(&self.christian_name);
    self.surname = text::tidy(&self.surname);
    if self.christian_name.is_empty() || self.surname.is_empty() {
      return Err(Error::MissingName);
    }

    self.place_of_birth = tidy_opt(self.place_of_birth);
    self.occupation = tidy_opt(self.occupation);
    self.additional_notes = trim_opt(self.additional_notes);
    self.reference = tidy_opt(self.reference);
    self.id_card_no = tidy_opt(self.id_card_no);

    self.family.names_of_parents = tidy_opt(self.family.names_of_parents);
    self.family.names_of_children = tidy_opt(self.family.names_of_children);
    self.naturalization.no_of_cert = tidy_opt(self.naturalization.no_of_cert);
    self.naturalization.issued_at = tidy_opt(self.naturalization.issued_at);
    self.residence.town_or_city = tidy_opt(self.residence.town_or_city);
    self.residence.home_at_death = tidy_opt(self.residence.home_at_death);
    self.migration.arrival_period = tidy_opt(self.migration.arrival_period);
    self.migration.data_source = tidy_opt(self.migration.data_source);

    self.photos = self
      .photos
      .into_iter()
      .map(|p| p.trim().to_owned())
      .filter(|p| !p.is_empty())
      .collect();

    Ok(self)
  }

  /// Attach store-assigned identity and timestamps.
  pub fn into_person(
    self,
    person_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Person {
    Person {
      person_id,
      christian_name: self.christian_name,
      surname: self.surname,
      date_of_birth: self.date_of_birth,
      place_of_birth: self.place_of_birth,
      date_of_death: self.date_of_death,
      occupation: self.occupation,
      additional_notes: self.additional_notes,
      reference: self.reference,
      id_card_no: self.id_card_no,
      photos: self.photos,
      family: self.family,
      naturalization: self.naturalization,
      residence: self.residence,
      migration: self.migration,
      created_at,
      updated_at,
    }
  }
}

fn tidy_opt(value: Option<String>) -> Option<String> {
  value.map(|s| text::tidy(&s)).filter(|s| !s.is_empty())
}

fn trim_opt(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}
