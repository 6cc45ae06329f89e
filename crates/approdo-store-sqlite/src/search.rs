//! Compilation of a normalised search into SQL.
//!
//! The WHERE clause, ordering and paging here must agree with the in-memory
//! comparator in `approdo_core::query` on every record; the store tests run
//! the same scenarios against both backends. `LIKE` without a custom collation
//! folds ASCII case only, which is exactly what the in-memory matcher does.

use approdo_core::{
  query::SearchQuery,
  sort::{SortDirection, SortField},
};
use rusqlite::types::Value;

use crate::encode::{PERSON_COLUMNS, encode_date};

const LIKE: &str = "LIKE ? ESCAPE '\\'";

/// A compiled search: one statement counting every match and one fetching the
/// requested window, sharing the same filter parameters.
pub struct CompiledSearch {
  pub count_sql:  String,
  pub select_sql: String,
  /// Parameters for `count_sql`; `select_sql` takes these plus limit and
  /// offset appended.
  pub params:     Vec<Value>,
}

/// Escape LIKE wildcards so a filter value only ever matches literally.
fn like_pattern(needle: &str) -> Value {
  let escaped = needle
    .replace('\\', "\\\\")
    .replace('%', "\\%")
    .replace('_', "\\_");
  Value::Text(format!("%{escaped}%"))
}

/// `NULLS LAST` keeps records missing the sort key at the end in both
/// directions; `COLLATE NOCASE` folds text the same way the in-memory
/// comparator does. `person_id` breaks ties so paging is stable.
fn order_by(field: SortField, direction: SortDirection) -> String {
  let text = matches!(
    field,
    SortField::FullName
      | SortField::ChristianName
      | SortField::Surname
      | SortField::PlaceOfBirth
      | SortField::Occupation
  );
  let collate = if text { " COLLATE NOCASE" } else { "" };
  let dir = match direction {
    SortDirection::Asc => "ASC",
    SortDirection::Desc => "DESC",
  };
  format!(
    "ORDER BY {key}{collate} {dir} NULLS LAST, person_id ASC",
    key = field.storage_key()
  )
}

/// Compile a search into its count and select statements.
pub fn compile(query: &SearchQuery) -> CompiledSearch {
  let filters = &query.filters;
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  // Name block. The split pair is conjunctive; a combined-name constraint may
  // alternatively match the generated full_name column.
  let mut split: Vec<String> = Vec::new();
  if let Some(needle) = &filters.christian_name {
    split.push(format!("christian_name {LIKE}"));
    params.push(like_pattern(needle));
  }
  if let Some(needle) = &filters.surname {
    split.push(format!("surname {LIKE}"));
    params.push(like_pattern(needle));
  }
  match (&filters.full_name, split.is_empty()) {
    (Some(full), false) => {
      conds.push(format!("(({}) OR full_name {LIKE})", split.join(" AND ")));
      params.push(like_pattern(full));
    }
    (Some(full), true) => {
      conds.push(format!("full_name {LIKE}"));
      params.push(like_pattern(full));
    }
    (None, _) => conds.extend(split),
  }

  if let Some(year) = filters.birth_year {
    conds.push("date_of_birth = ?".into());
    params.push(Value::Integer(i64::from(year)));
  }
  if let Some(needle) = &filters.place_of_birth {
    conds.push(format!("place_of_birth {LIKE}"));
    params.push(like_pattern(needle));
  }
  if let Some(needle) = &filters.town_or_city {
    conds.push(format!("town_or_city {LIKE}"));
    params.push(like_pattern(needle));
  }
  if let Some(needle) = &filters.occupation {
    conds.push(format!("occupation {LIKE}"));
    params.push(like_pattern(needle));
  }
  if let Some(needle) = &filters.arrival_period {
    conds.push(format!("arrival_period {LIKE}"));
    params.push(like_pattern(needle));
  }
  if let Some(from) = filters.arrival_from {
    conds.push("date_of_arrival_nt >= ?".into());
    params.push(Value::Text(encode_date(from)));
  }
  if let Some(to) = filters.arrival_to {
    conds.push("date_of_arrival_nt <= ?".into());
    params.push(Value::Text(encode_date(to)));
  }
  if let Some(want) = filters.has_photo {
    conds.push("has_photo = ?".into());
    params.push(Value::Integer(i64::from(want)));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };
  let order_clause = order_by(query.sort.field, query.sort.direction);

  CompiledSearch {
    count_sql:  format!("SELECT COUNT(*) FROM persons{where_clause}"),
    select_sql: format!(
      "SELECT {PERSON_COLUMNS} FROM persons{where_clause} {order_clause} \
       LIMIT ? OFFSET ?"
    ),
    params,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use approdo_core::{filter::Filters, query::SearchQuery, sort::SortSpec};

  use super::*;

  fn compile_raw(pairs: &[(&str, &str)]) -> CompiledSearch {
    let raw: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    compile(&SearchQuery::new(
      Filters::from_raw(&raw),
      SortSpec::default(),
      1,
      10,
    ))
  }

  #[test]
  fn like_patterns_escape_wildcards() {
    assert_eq!(like_pattern("100%"), Value::Text("%100\\%%".into()));
    assert_eq!(like_pattern("a_b"), Value::Text("%a\\_b%".into()));
    assert_eq!(like_pattern("c\\d"), Value::Text("%c\\\\d%".into()));
    assert_eq!(like_pattern("rossi"), Value::Text("%rossi%".into()));
  }

  #[test]
  fn unconstrained_search_has_no_where_clause() {
    let compiled = compile_raw(&[]);
    assert!(!compiled.count_sql.contains("WHERE"));
    assert!(!compiled.select_sql.contains("WHERE"));
    assert!(compiled.params.is_empty());
  }

  #[test]
  fn combined_name_compiles_to_a_disjunction() {
    let compiled = compile_raw(&[("full_name", "Maria Greco")]);
    assert!(compiled.select_sql.contains("OR full_name LIKE"));
    assert!(compiled.select_sql.contains("christian_name LIKE"));
    assert!(compiled.select_sql.contains("surname LIKE"));
    // split pair, then the combined rescue
    assert_eq!(compiled.params.len(), 3);
  }

  #[test]
  fn explicit_name_parts_stay_conjunctive() {
    let compiled =
      compile_raw(&[("firstName", "Maria"), ("lastName", "Greco")]);
    assert!(!compiled.select_sql.contains("OR full_name"));
    assert_eq!(compiled.params.len(), 2);
  }

  #[test]
  fn ordering_is_null_safe_and_tie_broken() {
    let compiled = compile_raw(&[]);
    assert!(
      compiled
        .select_sql
        .contains("ORDER BY surname COLLATE NOCASE ASC NULLS LAST, person_id ASC")
    );
  }

  #[test]
  fn placeholder_counts_match_parameters() {
    let cases: Vec<CompiledSearch> = vec![
      compile_raw(&[]),
      compile_raw(&[("full_name", "Maria Greco")]),
      compile_raw(&[("surname", "Rossi"), ("occupation", "miner")]),
      compile_raw(&[
        ("fullName", "G Greco"),
        ("date_of_birth", "1921"),
        ("region", "Palermo"),
        ("settlement", "Darwin"),
        ("arrival_period", "Post-war"),
        ("date_start", "1948-01-01"),
        ("date_end", "1955-12-31"),
        ("has_photo", "true"),
      ]),
    ];
    for compiled in cases {
      let count_holes = compiled.count_sql.matches('?').count();
      let select_holes = compiled.select_sql.matches('?').count();
      assert_eq!(count_holes, compiled.params.len());
      assert_eq!(select_holes, compiled.params.len() + 2);
    }
  }
}
