//! In-memory reference backend.
//!
//! The executable statement of the search semantics: filters and ordering
//! are applied record by record through [`Filters::matches`] and
//! [`SortSpec::compare`](crate::sort::SortSpec::compare). The HTTP layer's
//! tests run against it; it holds everything behind one `RwLock` and is not
//! meant for real archives.

use std::{
  collections::BTreeMap,
  sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{Datelike, Utc};

use crate::{
  Error, Result,
  admin::{Admin, AdminUpdate, NewAdmin},
  filter::Filters,
  person::{NewPerson, Person},
  query::{Page, SearchQuery},
  stats::{ArchiveStats, GroupCount, YearCount, month_start},
  store::{AdminStore, PersonStore},
};

#[derive(Debug, Clone)]
struct AdminEntry {
  admin:         Admin,
  password_hash: String,
}

#[derive(Debug, Default)]
struct Inner {
  persons:        Vec<Person>,
  last_person_id: i64,
  admins:         Vec<AdminEntry>,
  last_admin_id:  i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: RwLock<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> RwLockReadGuard<'_, Inner> {
    self.inner.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Inner> {
    self.inner.write().unwrap_or_else(PoisonError::into_inner)
  }
}

// ─── PersonStore ─────────────────────────────────────────────────────────────

impl PersonStore for MemoryStore {
  type Error = Error;

  async fn create(&self, input: NewPerson) -> Result<Person> {
    let input = input.normalised()?;
    let mut inner = self.write();
    inner.last_person_id += 1;
    let now = Utc::now();
    let person = input.into_person(inner.last_person_id, now, now);
    inner.persons.push(person.clone());
    Ok(person)
  }

  async fn get(&self, person_id: i64) -> Result<Option<Person>> {
    let inner = self.read();
    Ok(inner.persons.iter().find(|p| p.person_id == person_id).cloned())
  }

  async fn update(
    &self,
    person_id: i64,
    input: NewPerson,
  ) -> Result<Option<Person>> {
    let input = input.normalised()?;
    let mut inner = self.write();
    let Some(existing) =
      inner.persons.iter_mut().find(|p| p.person_id == person_id)
    else {
      return Ok(None);
    };
    let updated = input.into_person(person_id, existing.created_at, Utc::now());
    *existing = updated.clone();
    Ok(Some(updated))
  }

  async fn delete(&self, person_id: i64) -> Result<bool> {
    let mut inner = self.write();
    let before = inner.persons.len();
    inner.persons.retain(|p| p.person_id != person_id);
    Ok(inner.persons.len() < before)
  }

  async fn search(&self, query: &SearchQuery) -> Result<Page<Person>> {
    let inner = self.read();
    let mut matches: Vec<Person> = inner
      .persons
      .iter()
      .filter(|p| query.filters.matches(p))
      .cloned()
      .collect();
    matches.sort_by(|a, b| query.sort.compare(a, b));

    let total = matches.len() as u64;
    let data: Vec<Person> = matches
      .into_iter()
      .skip(query.offset() as usize)
      .take(query.limit as usize)
      .collect();
    Ok(Page::assemble(data, total, query))
  }

  async fn add_photos(
    &self,
    person_id: i64,
    photos: Vec<String>,
  ) -> Result<Person> {
    let mut inner = self.write();
    let person = inner
      .persons
      .iter_mut()
      .find(|p| p.person_id == person_id)
      .ok_or(Error::PersonNotFound(person_id))?;
    for photo in photos {
      let photo = photo.trim().to_owned();
      if !photo.is_empty() && !person.photos.contains(&photo) {
        person.photos.push(photo);
      }
    }
    person.updated_at = Utc::now();
    Ok(person.clone())
  }

  async fn remove_photo(&self, person_id: i64, photo: String) -> Result<Person> {
    let mut inner = self.write();
    let person = inner
      .persons
      .iter_mut()
      .find(|p| p.person_id == person_id)
      .ok_or(Error::PersonNotFound(person_id))?;
    let before = person.photos.len();
    person.photos.retain(|p| *p != photo);
    if person.photos.len() == before {
      return Err(Error::PhotoNotFound { person_id, photo });
    }
    person.updated_at = Utc::now();
    Ok(person.clone())
  }

  async fn set_primary_photo(
    &self,
    person_id: i64,
    photo: String,
  ) -> Result<Person> {
    let mut inner = self.write();
    let person = inner
      .persons
      .iter_mut()
      .find(|p| p.person_id == person_id)
      .ok_or(Error::PersonNotFound(person_id))?;
    let Some(position) = person.photos.iter().position(|p| *p == photo) else {
      return Err(Error::PhotoNotFound { person_id, photo });
    };
    let primary = person.photos.remove(position);
    person.photos.insert(0, primary);
    person.updated_at = Utc::now();
    Ok(person.clone())
  }

  async fn stats(&self) -> Result<ArchiveStats> {
    let inner = self.read();
    let since = month_start(Utc::now());

    let mut years: BTreeMap<i32, u64> = BTreeMap::new();
    for person in &inner.persons {
      if let Some(arrived) = person.migration.date_of_arrival_nt {
        *years.entry(arrived.year()).or_insert(0) += 1;
      }
    }

    Ok(ArchiveStats {
      total_records: inner.persons.len() as u64,
      records_with_photos: inner
        .persons
        .iter()
        .filter(|p| p.has_photo())
        .count() as u64,
      records_this_month: inner
        .persons
        .iter()
        .filter(|p| p.created_at >= since)
        .count() as u64,
      by_arrival_year: years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect(),
      by_place_of_birth: group_counts(
        inner.persons.iter().filter_map(|p| p.place_of_birth.as_deref()),
      ),
      by_town_or_city: group_counts(
        inner
          .persons
          .iter()
          .filter_map(|p| p.residence.town_or_city.as_deref()),
      ),
    })
  }
}

/// Count occurrences and order by count descending, then name, so the
/// grouping is deterministic.
fn group_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<GroupCount> {
  let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
  for value in values {
    *counts.entry(value).or_insert(0) += 1;
  }
  let mut groups: Vec<GroupCount> = counts
    .into_iter()
    .map(|(name, value)| GroupCount { name: name.to_owned(), value })
    .collect();
  groups.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
  groups
}

// ─── AdminStore ──────────────────────────────────────────────────────────────

impl AdminStore for MemoryStore {
  type Error = Error;

  async fn create_admin(&self, input: NewAdmin) -> Result<Admin> {
    let input = input.normalised()?;
    let mut inner = self.write();
    if inner.admins.iter().any(|e| e.admin.email == input.email) {
      return Err(Error::EmailTaken(input.email));
    }
    inner.last_admin_id += 1;
    let admin = Admin {
      admin_id: inner.last_admin_id,
      name: input.name,
      email: input.email,
      role: input.role,
      status: input.status,
      profile_picture: input.profile_picture,
      created_at: Utc::now(),
      last_login: None,
    };
    inner.admins.push(AdminEntry {
      admin:         admin.clone(),
      password_hash: input.password_hash,
    });
    Ok(admin)
  }

  async fn list_admins(&self) -> Result<Vec<Admin>> {
    let inner = self.read();
    Ok(inner.admins.iter().map(|e| e.admin.clone()).collect())
  }

  async fn count_admins(&self) -> Result<u64> {
    Ok(self.read().admins.len() as u64)
  }

  async fn get_admin(&self, admin_id: i64) -> Result<Option<Admin>> {
    let inner = self.read();
    Ok(
      inner
        .admins
        .iter()
        .find(|e| e.admin.admin_id == admin_id)
        .map(|e| e.admin.clone()),
    )
  }

  async fn update_admin(
    &self,
    admin_id: i64,
    update: AdminUpdate,
  ) -> Result<Option<Admin>> {
    let update = update.normalised()?;
    let mut inner = self.write();
    if inner
      .admins
      .iter()
      .any(|e| e.admin.email == update.email && e.admin.admin_id != admin_id)
    {
      return Err(Error::EmailTaken(update.email));
    }
    let Some(entry) =
      inner.admins.iter_mut().find(|e| e.admin.admin_id == admin_id)
    else {
      return Ok(None);
    };
    entry.admin.name = update.name;
    entry.admin.email = update.email;
    entry.admin.role = update.role;
    entry.admin.status = update.status;
    entry.admin.profile_picture = update.profile_picture;
    if let Some(hash) = update.password_hash {
      entry.password_hash = hash;
    }
    Ok(Some(entry.admin.clone()))
  }

  async fn delete_admin(&self, admin_id: i64) -> Result<bool> {
    let mut inner = self.write();
    let before = inner.admins.len();
    inner.admins.retain(|e| e.admin.admin_id != admin_id);
    Ok(inner.admins.len() < before)
  }

  async fn find_admin_by_email(
    &self,
    email: String,
  ) -> Result<Option<(Admin, String)>> {
    let email = email.trim().to_ascii_lowercase();
    let inner = self.read();
    Ok(
      inner
        .admins
        .iter()
        .find(|e| e.admin.email == email)
        .map(|e| (e.admin.clone(), e.password_hash.clone())),
    )
  }

  async fn record_login(&self, admin_id: i64) -> Result<()> {
    let mut inner = self.write();
    let entry = inner
      .admins
      .iter_mut()
      .find(|e| e.admin.admin_id == admin_id)
      .ok_or(Error::AdminNotFound(admin_id))?;
    entry.admin.last_login = Some(Utc::now());
    Ok(())
  }
}
