//! Query semantics — matching, ordering and page assembly.
//!
//! These are the reference semantics of the archive search. The in-memory
//! backend applies them record by record; the SQLite backend compiles them to
//! SQL and must agree with them on every record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
  filter::Filters,
  person::Person,
  sort::{SortDirection, SortField, SortSpec},
  text,
};

/// Page size applied when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 10;

// ─── Search query ────────────────────────────────────────────────────────────

/// Parameters for [`PersonStore::search`](crate::store::PersonStore::search).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
  pub filters: Filters,
  pub sort:    SortSpec,
  /// 1-based page number.
  pub page:    u32,
  pub limit:   u32,
}

impl Default for SearchQuery {
  fn default() -> Self {
    Self {
      filters: Filters::default(),
      sort:    SortSpec::default(),
      page:    1,
      limit:   DEFAULT_LIMIT,
    }
  }
}

impl SearchQuery {
  /// Build a query, clamping `page` and `limit` up to at least 1.
  pub fn new(filters: Filters, sort: SortSpec, page: u32, limit: u32) -> Self {
    Self {
      filters,
      sort,
      page: page.max(1),
      limit: limit.max(1),
    }
  }

  /// Number of leading matches consumed by earlier pages.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }
}

// ─── Pagination envelope ─────────────────────────────────────────────────────

/// One page of results plus the envelope the clients paginate by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub data:        Vec<T>,
  /// Matches across the whole result set, not just this page.
  pub total:       u64,
  pub page:        u32,
  pub limit:       u32,
  #[serde(rename = "totalPages")]
  pub total_pages: u32,
}

impl<T> Page<T> {
  /// Assemble the envelope around an already-sliced window of matches.
  pub fn assemble(data: Vec<T>, total: u64, query: &SearchQuery) -> Self {
    Self {
      data,
      total,
      page: query.page,
      limit: query.limit,
      total_pages: total_pages(total, query.limit),
    }
  }
}

/// Ceiling division; zero matches means zero pages.
pub fn total_pages(total: u64, limit: u32) -> u32 {
  total.div_ceil(u64::from(limit.max(1))) as u32
}

// ─── Matching ────────────────────────────────────────────────────────────────

impl Filters {
  /// Does `person` satisfy every active constraint?
  ///
  /// All constraints are conjunctive except inside the name block: the split
  /// name pair must hold together, but a combined-name constraint can rescue
  /// the record by matching the derived full name on its own. That keeps
  /// `"Lucia Amato-Greco"` findable by the combined search even though no
  /// record has `"Amato-Greco"` split across the two name columns.
  pub fn matches(&self, person: &Person) -> bool {
    self.name_matches(person)
      && self
        .birth_year
        .is_none_or(|year| person.date_of_birth == Some(year))
      && text_matches(&self.place_of_birth, person.place_of_birth.as_deref())
      && text_matches(
        &self.town_or_city,
        person.residence.town_or_city.as_deref(),
      )
      && text_matches(&self.occupation, person.occupation.as_deref())
      && text_matches(
        &self.arrival_period,
        person.migration.arrival_period.as_deref(),
      )
      && self.arrival_matches(person)
      && self
        .has_photo
        .is_none_or(|want| person.has_photo() == want)
  }

  fn name_matches(&self, person: &Person) -> bool {
    let split_ok = self
      .christian_name
      .as_deref()
      .is_none_or(|needle| text::contains_ci(&person.christian_name, needle))
      && self
        .surname
        .as_deref()
        .is_none_or(|needle| text::contains_ci(&person.surname, needle));
    match self.full_name.as_deref() {
      Some(needle) => {
        split_ok || text::contains_ci(&person.full_name(), needle)
      }
      None => split_ok,
    }
  }

  /// A bounded range never matches a record with no arrival date.
  fn arrival_matches(&self, person: &Person) -> bool {
    if self.arrival_from.is_none() && self.arrival_to.is_none() {
      return true;
    }
    let Some(arrived) = person.migration.date_of_arrival_nt else {
      return false;
    };
    self.arrival_from.is_none_or(|from| arrived >= from)
      && self.arrival_to.is_none_or(|to| arrived <= to)
  }
}

fn text_matches(filter: &Option<String>, value: Option<&str>) -> bool {
  match filter.as_deref() {
    Some(needle) => value.is_some_and(|hay| text::contains_ci(hay, needle)),
    None => true,
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

impl SortSpec {
  /// Total order over records: the requested key first, with missing values
  /// last in both directions, then ascending `person_id` to break ties.
  pub fn compare(&self, a: &Person, b: &Person) -> Ordering {
    let direction = self.direction;
    let primary = match self.field {
      SortField::FullName => {
        cmp_text(Some(&a.full_name()), Some(&b.full_name()), direction)
      }
      SortField::ChristianName => cmp_text(
        Some(&a.christian_name),
        Some(&b.christian_name),
        direction,
      ),
      SortField::Surname => {
        cmp_text(Some(&a.surname), Some(&b.surname), direction)
      }
      SortField::DateOfBirth => {
        cmp_key(a.date_of_birth, b.date_of_birth, direction)
      }
      SortField::PlaceOfBirth => cmp_text(
        a.place_of_birth.as_deref(),
        b.place_of_birth.as_deref(),
        direction,
      ),
      SortField::Occupation => cmp_text(
        a.occupation.as_deref(),
        b.occupation.as_deref(),
        direction,
      ),
      SortField::DateOfArrivalNt => cmp_key(
        a.migration.date_of_arrival_nt,
        b.migration.date_of_arrival_nt,
        direction,
      ),
      SortField::CreatedAt => {
        cmp_key(Some(a.created_at), Some(b.created_at), direction)
      }
      SortField::PersonId => {
        cmp_key(Some(a.person_id), Some(b.person_id), direction)
      }
    };
    primary.then(a.person_id.cmp(&b.person_id))
  }
}

/// Compare optional keys; `None` sorts after `Some` regardless of direction.
fn cmp_key<K: Ord>(
  a: Option<K>,
  b: Option<K>,
  direction: SortDirection,
) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Greater,
    (Some(_), None) => Ordering::Less,
    (Some(x), Some(y)) => match direction {
      SortDirection::Asc => x.cmp(&y),
      SortDirection::Desc => y.cmp(&x),
    },
  }
}

/// Case-insensitive text compare with the same missing-last rule.
fn cmp_text(
  a: Option<&str>,
  b: Option<&str>,
  direction: SortDirection,
) -> Ordering {
  cmp_key(
    a.map(|s| s.to_ascii_lowercase()),
    b.map(|s| s.to_ascii_lowercase()),
    direction,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_pages_is_a_ceiling() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(25, 10), 3);
  }

  #[test]
  fn queries_clamp_page_and_limit() {
    let query = SearchQuery::new(Filters::default(), SortSpec::default(), 0, 0);
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, 1);
    assert_eq!(query.offset(), 0);

    let later = SearchQuery::new(Filters::default(), SortSpec::default(), 4, 10);
    assert_eq!(later.offset(), 30);
  }

  #[test]
  fn envelope_renames_total_pages() {
    let page = Page::assemble(vec![1, 2], 12, &SearchQuery::default());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["total"], 12);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 10);
  }
}
