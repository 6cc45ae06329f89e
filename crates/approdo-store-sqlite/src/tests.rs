//! Integration tests for `SqliteStore` against an in-memory database.
//!
//! The search scenarios mirror the in-memory backend tests in
//! `approdo-core`; both backends must order, filter and paginate
//! identically.

use std::collections::HashMap;

use chrono::NaiveDate;

use approdo_core::{
  admin::{AdminRole, AdminStatus, AdminUpdate, NewAdmin},
  filter::Filters,
  person::{NewPerson, Person},
  query::SearchQuery,
  sort::{SortDirection, SortField, SortSpec},
  store::{AdminStore, PersonStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn person(christian: &str, surname: &str) -> NewPerson {
  NewPerson {
    christian_name: christian.into(),
    surname: surname.into(),
    ..NewPerson::default()
  }
}

fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
  pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn query(pairs: &[(&str, &str)]) -> SearchQuery {
  SearchQuery::new(
    Filters::from_raw(&raw(pairs)),
    SortSpec::default(),
    1,
    100,
  )
}

async fn names(s: &SqliteStore, q: &SearchQuery) -> Vec<String> {
  s.search(q)
    .await
    .unwrap()
    .data
    .iter()
    .map(Person::full_name)
    .collect()
}

// ─── Record CRUD ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_roundtrip_every_field() {
  let s = store().await;

  let mut input = person("  Maria ", "Di  Falco");
  input.date_of_birth = Some(1923);
  input.place_of_birth = Some("Palermo".into());
  input.date_of_death = Some(1998);
  input.occupation = Some("Seamstress".into());
  input.additional_notes = Some("Arrived with two brothers.\nSee card.".into());
  input.reference = Some("NTRS 226".into());
  input.id_card_no = Some("A-1042".into());
  input.photos = vec!["maria.jpg".into(), "wedding.jpg".into()];
  input.family.names_of_parents = Some("Giuseppe and Rosa".into());
  input.family.names_of_children = Some("Carlo, Anna".into());
  input.naturalization.date_of_naturalisation =
    NaiveDate::from_ymd_opt(1955, 4, 12);
  input.naturalization.no_of_cert = Some("N1234".into());
  input.naturalization.issued_at = Some("Darwin".into());
  input.residence.town_or_city = Some("Darwin".into());
  input.residence.home_at_death = Some("Stuart Park".into());
  input.migration.date_of_arrival_aus = NaiveDate::from_ymd_opt(1948, 11, 2);
  input.migration.date_of_arrival_nt = NaiveDate::from_ymd_opt(1949, 3, 2);
  input.migration.arrival_period = Some("Post-war".into());
  input.migration.data_source = Some("Shipping list".into());

  let created = s.create(input).await.unwrap();
  assert_eq!(created.christian_name, "Maria");
  assert_eq!(created.surname, "Di Falco");
  assert!(created.has_photo());

  let fetched = s.get(created.person_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(999).await.unwrap().is_none());
}

#[tokio::test]
async fn deleted_ids_are_never_reused() {
  let s = store().await;
  s.create(person("Maria", "Di Falco")).await.unwrap();
  let b = s.create(person("Guido", "Baldini")).await.unwrap();
  assert!(s.delete(b.person_id).await.unwrap());
  assert!(!s.delete(b.person_id).await.unwrap());

  let c = s.create(person("Rosa", "Conti")).await.unwrap();
  assert!(c.person_id > b.person_id);
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_created_at() {
  let s = store().await;
  let created = s.create(person("Maria", "Di Falco")).await.unwrap();

  let mut replacement = person("Maria", "Rossi");
  replacement.occupation = Some("Seamstress".into());
  let updated = s
    .update(created.person_id, replacement)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.surname, "Rossi");
  assert_eq!(updated.occupation.as_deref(), Some("Seamstress"));
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);

  assert!(s.update(999, person("Maria", "Rossi")).await.unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_missing_name_parts() {
  let s = store().await;
  let err = s.create(person(" ", "Di Falco")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::MissingName)
  ));
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn combined_name_rescues_multi_word_christian_names() {
  let s = store().await;
  s.create(person("Maria Lucia", "Greco")).await.unwrap();
  s.create(person("Maria", "Greco")).await.unwrap();
  s.create(person("Lucia", "Amato")).await.unwrap();

  let q = query(&[("full_name", "Maria Lucia Greco")]);
  assert_eq!(names(&s, &q).await, ["Maria Lucia Greco"]);

  let by_split = query(&[("full_name", "Lucia Amato")]);
  assert_eq!(names(&s, &by_split).await, ["Lucia Amato"]);
}

#[tokio::test]
async fn matching_is_substring_and_case_insensitive() {
  let s = store().await;
  s.create(person("Giuseppe", "Verdi")).await.unwrap();
  s.create(person("Anna", "Neri")).await.unwrap();

  let q = query(&[("surname", "ERD")]);
  assert_eq!(names(&s, &q).await, ["Giuseppe Verdi"]);

  let conjunctive = query(&[("christian_name", "git"), ("surname", "verdi")]);
  assert_eq!(names(&s, &conjunctive).await, Vec::<String>::new());
}

/// `%` and `_` in a filter value must match themselves, not act as LIKE
/// wildcards.
#[tokio::test]
async fn filter_wildcards_match_literally() {
  let s = store().await;
  let mut a = person("Maria", "Di Falco");
  a.occupation = Some("Sorted 100% wool".into());
  s.create(a).await.unwrap();
  let mut b = person("Guido", "Baldini");
  b.occupation = Some("Sorted 100 wool".into());
  s.create(b).await.unwrap();
  let mut c = person("Rosa", "Conti");
  c.occupation = Some("wharf_hand".into());
  s.create(c).await.unwrap();
  let mut d = person("Carlo", "Moro");
  d.occupation = Some("wharfXhand".into());
  s.create(d).await.unwrap();

  let percent = query(&[("occupation", "100%")]);
  assert_eq!(names(&s, &percent).await, ["Maria Di Falco"]);

  let underscore = query(&[("occupation", "rf_h")]);
  assert_eq!(names(&s, &underscore).await, ["Rosa Conti"]);
}

#[tokio::test]
async fn filters_stay_conjunctive_across_fields() {
  let s = store().await;
  let mut a = person("Maria", "Di Falco");
  a.date_of_birth = Some(1923);
  a.place_of_birth = Some("Palermo".into());
  s.create(a).await.unwrap();
  let mut b = person("Guido", "Baldini");
  b.date_of_birth = Some(1923);
  b.place_of_birth = Some("Messina".into());
  s.create(b).await.unwrap();
  s.create(person("Rosa", "Conti")).await.unwrap();

  let q = query(&[("date_of_birth", "1923"), ("region", "palermo")]);
  assert_eq!(names(&s, &q).await, ["Maria Di Falco"]);
}

#[tokio::test]
async fn arrival_range_bounds_are_inclusive() {
  let s = store().await;
  for (name, date) in [
    ("Early", "1947-01-01"),
    ("Mid", "1950-06-15"),
    ("Late", "1952-12-31"),
    ("After", "1953-01-01"),
  ] {
    let mut input = person(name, "Rossi");
    input.migration.date_of_arrival_nt =
      Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
    s.create(input).await.unwrap();
  }
  // No arrival date at all: excluded from any bounded range.
  s.create(person("Unknown", "Rossi")).await.unwrap();

  let q = query(&[("date_start", "1947-01-01"), ("date_end", "1952-12-31")]);
  assert_eq!(names(&s, &q).await, ["Early Rossi", "Mid Rossi", "Late Rossi"]);

  let open_ended = query(&[("date_start", "1953-01-01")]);
  assert_eq!(names(&s, &open_ended).await, ["After Rossi"]);
}

// ─── Ordering and pagination ─────────────────────────────────────────────────

#[tokio::test]
async fn equal_keys_tie_break_by_ascending_id() {
  let s = store().await;
  let first = s.create(person("Anna", "Rossi")).await.unwrap();
  let second = s.create(person("Bruna", "Rossi")).await.unwrap();
  let third = s.create(person("Carla", "Rossi")).await.unwrap();
  let expected = [first.person_id, second.person_id, third.person_id];

  for direction in [SortDirection::Asc, SortDirection::Desc] {
    let q = SearchQuery::new(
      Filters::default(),
      SortSpec { field: SortField::Surname, direction },
      1,
      10,
    );
    let ids: Vec<i64> = s
      .search(&q)
      .await
      .unwrap()
      .data
      .iter()
      .map(|p| p.person_id)
      .collect();
    assert_eq!(ids, expected, "direction {direction:?}");
  }
}

#[tokio::test]
async fn missing_sort_keys_go_last_in_both_directions() {
  let s = store().await;
  let mut baker = person("Anna", "Rossi");
  baker.occupation = Some("Baker".into());
  s.create(baker).await.unwrap();
  s.create(person("Bruna", "Rossi")).await.unwrap();
  let mut cook = person("Carla", "Rossi");
  cook.occupation = Some("Cook".into());
  s.create(cook).await.unwrap();

  for direction in [SortDirection::Asc, SortDirection::Desc] {
    let q = SearchQuery::new(
      Filters::default(),
      SortSpec { field: SortField::Occupation, direction },
      1,
      10,
    );
    let last = names(&s, &q).await.pop().unwrap();
    assert_eq!(last, "Bruna Rossi", "direction {direction:?}");
  }
}

#[tokio::test]
async fn text_sort_folds_case() {
  let s = store().await;
  s.create(person("zita", "abate")).await.unwrap();
  s.create(person("Anna", "ZITO")).await.unwrap();
  s.create(person("Mario", "Bruno")).await.unwrap();

  let q = SearchQuery::new(Filters::default(), SortSpec::default(), 1, 10);
  assert_eq!(
    names(&s, &q).await,
    ["zita abate", "Mario Bruno", "Anna ZITO"]
  );
}

#[tokio::test]
async fn pages_partition_the_matches() {
  let s = store().await;
  for i in 0..25 {
    s.create(person(&format!("Person{i:02}"), "Rossi"))
      .await
      .unwrap();
  }

  let sort = SortSpec {
    field:     SortField::ChristianName,
    direction: SortDirection::Asc,
  };
  let first = s
    .search(&SearchQuery::new(Filters::default(), sort, 1, 10))
    .await
    .unwrap();
  assert_eq!(first.total, 25);
  assert_eq!(first.total_pages, 3);
  assert_eq!(first.data.len(), 10);
  assert_eq!(first.data[0].christian_name, "Person00");

  let last = s
    .search(&SearchQuery::new(Filters::default(), sort, 3, 10))
    .await
    .unwrap();
  assert_eq!(last.data.len(), 5);
  assert_eq!(last.data[0].christian_name, "Person20");

  // Past the end: an empty page with the same envelope, not an error.
  let past = s
    .search(&SearchQuery::new(Filters::default(), sort, 4, 10))
    .await
    .unwrap();
  assert!(past.data.is_empty());
  assert_eq!(past.total, 25);
  assert_eq!(past.total_pages, 3);
}

#[tokio::test]
async fn zero_matches_means_zero_pages() {
  let s = store().await;
  s.create(person("Maria", "Di Falco")).await.unwrap();

  let page = s.search(&query(&[("surname", "nobody")])).await.unwrap();
  assert!(page.data.is_empty());
  assert_eq!(page.total, 0);
  assert_eq!(page.total_pages, 0);
}

// ─── Photo references ────────────────────────────────────────────────────────

#[tokio::test]
async fn photo_lifecycle_keeps_the_photo_filter_consistent() {
  let s = store().await;
  let created = s.create(person("Maria", "Di Falco")).await.unwrap();
  s.create(person("Guido", "Baldini")).await.unwrap();

  let with = s
    .add_photos(created.person_id, vec!["a.jpg".into(), "b.jpg".into()])
    .await
    .unwrap();
  assert_eq!(with.photos, ["a.jpg", "b.jpg"]);
  let q = query(&[("has_photo", "true")]);
  assert_eq!(names(&s, &q).await, ["Maria Di Falco"]);

  // Duplicates are skipped.
  let again = s
    .add_photos(created.person_id, vec!["a.jpg".into(), "c.jpg".into()])
    .await
    .unwrap();
  assert_eq!(again.photos, ["a.jpg", "b.jpg", "c.jpg"]);

  let reordered = s
    .set_primary_photo(created.person_id, "c.jpg".into())
    .await
    .unwrap();
  assert_eq!(reordered.photos, ["c.jpg", "a.jpg", "b.jpg"]);

  for photo in ["c.jpg", "a.jpg", "b.jpg"] {
    s.remove_photo(created.person_id, photo.into()).await.unwrap();
  }
  let q = query(&[("has_photo", "true")]);
  assert_eq!(names(&s, &q).await, Vec::<String>::new());
}

#[tokio::test]
async fn photo_ops_report_missing_targets() {
  let s = store().await;
  let created = s.create(person("Maria", "Di Falco")).await.unwrap();

  let err = s.add_photos(999, vec!["a.jpg".into()]).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::PersonNotFound(999))
  ));

  let err = s
    .remove_photo(created.person_id, "ghost.jpg".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::PhotoNotFound { .. })
  ));
}

// ─── Admin directory ─────────────────────────────────────────────────────────

fn admin(name: &str, email: &str) -> NewAdmin {
  NewAdmin {
    name: name.into(),
    email: email.into(),
    password_hash: "$argon2id$stub".into(),
    role: AdminRole::Editor,
    status: AdminStatus::Active,
    profile_picture: None,
  }
}

#[tokio::test]
async fn admin_emails_are_unique_case_insensitively() {
  let s = store().await;
  s.create_admin(admin("Rosa", "rosa@example.org")).await.unwrap();

  let err = s
    .create_admin(admin("Impostor", " ROSA@example.org "))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::EmailTaken(_))
  ));
  assert_eq!(s.count_admins().await.unwrap(), 1);
}

#[tokio::test]
async fn admin_crud_roundtrips() {
  let s = store().await;
  let created =
    s.create_admin(admin("Rosa", "Rosa@Example.org")).await.unwrap();
  assert_eq!(created.email, "rosa@example.org");
  assert_eq!(created.role, AdminRole::Editor);

  let fetched = s.get_admin(created.admin_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let listed = s.list_admins().await.unwrap();
  assert_eq!(listed, [created.clone()]);

  assert!(s.delete_admin(created.admin_id).await.unwrap());
  assert!(!s.delete_admin(created.admin_id).await.unwrap());
  assert_eq!(s.count_admins().await.unwrap(), 0);
}

#[tokio::test]
async fn admin_update_keeps_hash_unless_replaced() {
  let s = store().await;
  let created =
    s.create_admin(admin("Rosa", "rosa@example.org")).await.unwrap();

  let update = AdminUpdate {
    name: "Rosa Conti".into(),
    email: "rosa@example.org".into(),
    password_hash: None,
    role: AdminRole::SuperAdmin,
    status: AdminStatus::Inactive,
    profile_picture: None,
  };
  let updated =
    s.update_admin(created.admin_id, update).await.unwrap().unwrap();
  assert_eq!(updated.name, "Rosa Conti");
  assert_eq!(updated.role, AdminRole::SuperAdmin);
  assert_eq!(updated.status, AdminStatus::Inactive);

  let (_, hash) = s
    .find_admin_by_email("rosa@example.org".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(hash, "$argon2id$stub");

  let rehashed = AdminUpdate {
    name: "Rosa Conti".into(),
    email: "rosa@example.org".into(),
    password_hash: Some("$argon2id$fresh".into()),
    role: AdminRole::SuperAdmin,
    status: AdminStatus::Inactive,
    profile_picture: None,
  };
  s.update_admin(created.admin_id, rehashed).await.unwrap().unwrap();
  let (_, hash) = s
    .find_admin_by_email("rosa@example.org".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(hash, "$argon2id$fresh");
}

#[tokio::test]
async fn admin_update_rejects_taken_email() {
  let s = store().await;
  s.create_admin(admin("Rosa", "rosa@example.org")).await.unwrap();
  let other =
    s.create_admin(admin("Carlo", "carlo@example.org")).await.unwrap();

  let update = AdminUpdate {
    name: "Carlo".into(),
    email: "ROSA@example.org".into(),
    password_hash: None,
    role: AdminRole::Editor,
    status: AdminStatus::Active,
    profile_picture: None,
  };
  let err = s.update_admin(other.admin_id, update).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::EmailTaken(_))
  ));
}

#[tokio::test]
async fn record_login_stamps_last_login() {
  let s = store().await;
  let created =
    s.create_admin(admin("Rosa", "rosa@example.org")).await.unwrap();
  assert!(created.last_login.is_none());

  s.record_login(created.admin_id).await.unwrap();
  let fetched = s.get_admin(created.admin_id).await.unwrap().unwrap();
  assert!(fetched.last_login.is_some());

  let err = s.record_login(999).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(approdo_core::Error::AdminNotFound(999))
  ));
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_aggregate_the_archive() {
  let s = store().await;

  let mut a = person("Maria", "Di Falco");
  a.place_of_birth = Some("Palermo".into());
  a.residence.town_or_city = Some("Darwin".into());
  a.migration.date_of_arrival_nt = NaiveDate::from_ymd_opt(1949, 3, 2);
  a.photos = vec!["maria.jpg".into()];
  s.create(a).await.unwrap();

  let mut b = person("Guido", "Baldini");
  b.place_of_birth = Some("Palermo".into());
  b.migration.date_of_arrival_nt = NaiveDate::from_ymd_opt(1949, 9, 20);
  s.create(b).await.unwrap();

  let mut c = person("Rosa", "Conti");
  c.place_of_birth = Some("Messina".into());
  c.migration.date_of_arrival_nt = NaiveDate::from_ymd_opt(1952, 1, 1);
  s.create(c).await.unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_records, 3);
  assert_eq!(stats.records_with_photos, 1);
  // Everything was just created, so it all falls in the current month.
  assert_eq!(stats.records_this_month, 3);

  let years: Vec<(i32, u64)> = stats
    .by_arrival_year
    .iter()
    .map(|y| (y.year, y.count))
    .collect();
  assert_eq!(years, [(1949, 2), (1952, 1)]);

  let places: Vec<(&str, u64)> = stats
    .by_place_of_birth
    .iter()
    .map(|g| (g.name.as_str(), g.value))
    .collect();
  assert_eq!(places, [("Palermo", 2), ("Messina", 1)]);

  let towns: Vec<&str> =
    stats.by_town_or_city.iter().map(|g| g.name.as_str()).collect();
  assert_eq!(towns, ["Darwin"]);
}
