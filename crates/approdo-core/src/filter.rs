//! Filter normalisation — raw request parameters to the canonical filter set.
//!
//! Raw filters arrive as a flat string map from the query string. Values are
//! tidied, legacy key aliases from the public search form are folded onto the
//! storage keys, and malformed values degrade to "no constraint" instead of
//! erroring. Unknown keys are ignored.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::text;

// ─── Full-name splitting ─────────────────────────────────────────────────────

/// Split a combined name into `(christian_name, surname)` on the first
/// whitespace run. A single token is a christian name with an empty surname.
pub fn parse_full_name(raw: &str) -> (String, String) {
  let tidied = text::tidy(raw);
  match tidied.split_once(' ') {
    Some((given, family)) => (given.to_owned(), family.to_owned()),
    None => (tidied, String::new()),
  }
}

// ─── Canonical filter set ────────────────────────────────────────────────────

/// The normalised search constraints. Every field is optional; an absent
/// field constrains nothing.
///
/// Recognised raw keys, with their legacy aliases in parentheses:
///
/// - `full_name` (`fullName`) — also derives the two split-name fields
/// - `christian_name` (`firstName`), `surname` (`lastName`)
/// - `date_of_birth` — a year, or a full date reduced to its year
/// - `place_of_birth` (`region`), `town_or_city` (`settlement`)
/// - `occupation`, `arrival_period`
/// - `date_start` (`arrival_from`, `yearFrom`), `date_end` (`arrival_to`,
///   `yearTo`) — bounds on `date_of_arrival_nt`; bare years widen to the
///   1 January / 31 December of that year
/// - `has_photo` — `true`/`1` or `false`/`0`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
  /// Matched against the derived full name, as an alternative to the split
  /// pair derived from it.
  pub full_name:      Option<String>,
  pub christian_name: Option<String>,
  pub surname:        Option<String>,
  /// Exact birth year.
  pub birth_year:     Option<i32>,
  pub place_of_birth: Option<String>,
  pub town_or_city:   Option<String>,
  pub occupation:     Option<String>,
  pub arrival_period: Option<String>,
  /// Inclusive lower bound on `date_of_arrival_nt`.
  pub arrival_from:   Option<NaiveDate>,
  /// Inclusive upper bound on `date_of_arrival_nt`.
  pub arrival_to:     Option<NaiveDate>,
  pub has_photo:      Option<bool>,
}

impl Filters {
  /// Build the canonical set from raw request parameters.
  pub fn from_raw(raw: &HashMap<String, String>) -> Self {
    let mut filters = Self::default();

    // Combined-name search first, so explicit name parts override the
    // derived split below.
    if let Some(full) = text_value(raw, &["full_name", "fullName"]) {
      let (given, family) = parse_full_name(&full);
      filters.christian_name = Some(given).filter(|s| !s.is_empty());
      filters.surname = Some(family).filter(|s| !s.is_empty());
      filters.full_name = Some(full);
    }
    if let Some(given) = text_value(raw, &["christian_name", "firstName"]) {
      filters.christian_name = Some(given);
    }
    if let Some(family) = text_value(raw, &["surname", "lastName"]) {
      filters.surname = Some(family);
    }

    filters.birth_year =
      text_value(raw, &["date_of_birth"]).and_then(|v| parse_year(&v));
    filters.place_of_birth = text_value(raw, &["place_of_birth", "region"]);
    filters.town_or_city = text_value(raw, &["town_or_city", "settlement"]);
    filters.occupation = text_value(raw, &["occupation"]);
    filters.arrival_period = text_value(raw, &["arrival_period"]);

    filters.arrival_from = date_value(raw, "date_start")
      .or_else(|| date_value(raw, "arrival_from"))
      .or_else(|| year_value(raw, "yearFrom").and_then(first_day));
    filters.arrival_to = date_value(raw, "date_end")
      .or_else(|| date_value(raw, "arrival_to"))
      .or_else(|| year_value(raw, "yearTo").and_then(last_day));

    filters.has_photo =
      text_value(raw, &["has_photo"]).and_then(|v| parse_flag(&v));

    filters
  }
}

// ─── Value parsing ───────────────────────────────────────────────────────────

/// First alias whose tidied value is non-empty.
fn text_value(raw: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| {
    raw
      .get(*key)
      .map(|v| text::tidy(v))
      .filter(|v| !v.is_empty())
  })
}

fn date_value(raw: &HashMap<String, String>, key: &str) -> Option<NaiveDate> {
  raw.get(key).and_then(|v| parse_date(&text::tidy(v)))
}

fn year_value(raw: &HashMap<String, String>, key: &str) -> Option<i32> {
  raw.get(key).and_then(|v| text::tidy(v).parse().ok())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// A bare year, or a full date reduced to its year.
fn parse_year(value: &str) -> Option<i32> {
  value
    .parse()
    .ok()
    .or_else(|| parse_date(value).map(|d| d.year()))
}

fn parse_flag(value: &str) -> Option<bool> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "1" => Some(true),
    "false" | "0" => Some(false),
    _ => None,
  }
}

fn first_day(year: i32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, 1, 1)
}

fn last_day(year: i32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, 12, 31)
}
