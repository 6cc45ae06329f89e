//! Sort resolution — raw sort parameters to a validated sort spec.
//!
//! Unlike filters, an unrecognised sort token is rejected up front, so a typo
//! can never silently fall back to the default order.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, text};

/// A sortable column of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  FullName,
  ChristianName,
  Surname,
  DateOfBirth,
  PlaceOfBirth,
  Occupation,
  DateOfArrivalNt,
  CreatedAt,
  PersonId,
}

impl SortField {
  /// Resolve a raw token — either a storage key (`"surname"`) or the display
  /// label the admin UI shows for it (`"Last Name"`). Case-insensitive.
  pub fn resolve(raw: &str) -> Result<Self> {
    let token = text::tidy(raw).to_ascii_lowercase();
    match token.as_str() {
      "full_name" | "full name" => Ok(Self::FullName),
      "christian_name" | "first name" => Ok(Self::ChristianName),
      "surname" | "last name" => Ok(Self::Surname),
      "date_of_birth" | "birth date" => Ok(Self::DateOfBirth),
      "place_of_birth" | "place of birth" => Ok(Self::PlaceOfBirth),
      "occupation" => Ok(Self::Occupation),
      "date_of_arrival_nt" | "arrival date" => Ok(Self::DateOfArrivalNt),
      "created_at" | "created date" => Ok(Self::CreatedAt),
      "person_id" => Ok(Self::PersonId),
      _ => Err(Error::InvalidSort(raw.to_owned())),
    }
  }

  /// The storage key, as accepted by [`resolve`](Self::resolve) and used for
  /// the database column name.
  pub fn storage_key(self) -> &'static str {
    match self {
      Self::FullName => "full_name",
      Self::ChristianName => "christian_name",
      Self::Surname => "surname",
      Self::DateOfBirth => "date_of_birth",
      Self::PlaceOfBirth => "place_of_birth",
      Self::Occupation => "occupation",
      Self::DateOfArrivalNt => "date_of_arrival_nt",
      Self::CreatedAt => "created_at",
      Self::PersonId => "person_id",
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn resolve(raw: &str) -> Result<Self> {
    match text::tidy(raw).to_ascii_lowercase().as_str() {
      "asc" => Ok(Self::Asc),
      "desc" => Ok(Self::Desc),
      _ => Err(Error::InvalidSort(raw.to_owned())),
    }
  }
}

/// A validated sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
  pub field:     SortField,
  pub direction: SortDirection,
}

impl Default for SortSpec {
  /// Browsing order when the caller requests none: surname ascending.
  fn default() -> Self {
    Self {
      field:     SortField::Surname,
      direction: SortDirection::Asc,
    }
  }
}

impl SortSpec {
  /// Resolve an optional raw field/direction pair, defaulting each absent
  /// half independently.
  pub fn resolve(field: Option<&str>, direction: Option<&str>) -> Result<Self> {
    let field = match field {
      Some(raw) => SortField::resolve(raw)?,
      None => SortField::Surname,
    };
    let direction = match direction {
      Some(raw) => SortDirection::resolve(raw)?,
      None => SortDirection::Asc,
    };
    Ok(Self { field, direction })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn storage_keys_resolve() {
    for field in [
      SortField::FullName,
      SortField::ChristianName,
      SortField::Surname,
      SortField::DateOfBirth,
      SortField::PlaceOfBirth,
      SortField::Occupation,
      SortField::DateOfArrivalNt,
      SortField::CreatedAt,
      SortField::PersonId,
    ] {
      assert_eq!(SortField::resolve(field.storage_key()).unwrap(), field);
    }
  }

  #[test]
  fn display_labels_resolve_case_insensitively() {
    assert_eq!(
      SortField::resolve("Arrival Date").unwrap(),
      SortField::DateOfArrivalNt
    );
    assert_eq!(SortField::resolve("last name").unwrap(), SortField::Surname);
    assert_eq!(
      SortField::resolve("  Birth   Date ").unwrap(),
      SortField::DateOfBirth
    );
  }

  #[test]
  fn unknown_tokens_are_rejected() {
    assert!(matches!(
      SortField::resolve("height"),
      Err(Error::InvalidSort(_))
    ));
    assert!(matches!(
      SortDirection::resolve("sideways"),
      Err(Error::InvalidSort(_))
    ));
  }

  #[test]
  fn absent_halves_default_to_surname_ascending() {
    let spec = SortSpec::resolve(None, None).unwrap();
    assert_eq!(spec, SortSpec::default());
    assert_eq!(spec.field, SortField::Surname);
    assert_eq!(spec.direction, SortDirection::Asc);

    let desc = SortSpec::resolve(None, Some("DESC")).unwrap();
    assert_eq!(desc.direction, SortDirection::Desc);
  }
}
