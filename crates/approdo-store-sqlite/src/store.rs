//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`] and
//! [`AdminStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use approdo_core::{
  admin::{Admin, AdminUpdate, NewAdmin},
  person::{NewPerson, Person},
  query::{Page, SearchQuery},
  stats::{ArchiveStats, GroupCount, YearCount, month_start},
  store::{AdminStore, PersonStore},
};

use crate::{
  Result,
  encode::{
    ADMIN_COLUMNS, PERSON_COLUMNS, PersonValues, RawAdmin, RawPerson,
    encode_dt,
  },
  schema::SCHEMA,
  search::{CompiledSearch, compile},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An archive store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read, apply and write back the photo list in a single connection call,
  /// so two photo edits can never interleave. `apply` returns the offending
  /// reference when it is not attached.
  async fn modify_photos<F>(&self, person_id: i64, apply: F) -> Result<Person>
  where
    F: FnOnce(&mut Vec<String>) -> Result<(), String> + Send + 'static,
  {
    let updated_str = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let Some(raw) = select_person(conn, person_id)? else {
          return Ok(PhotoUpdate::Missing);
        };
        let mut photos: Vec<String> = serde_json::from_str(&raw.photos)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        if let Err(photo) = apply(&mut photos) {
          return Ok(PhotoUpdate::NoSuchPhoto(photo));
        }

        let encoded = serde_json::to_string(&photos)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        conn.execute(
          "UPDATE persons SET photos = ?1, has_photo = ?2, updated_at = ?3 \
           WHERE person_id = ?4",
          rusqlite::params![
            encoded,
            !photos.is_empty(),
            updated_str,
            person_id
          ],
        )?;

        Ok(PhotoUpdate::Updated(RawPerson {
          photos: encoded,
          updated_at: updated_str,
          ..raw
        }))
      })
      .await?;

    match outcome {
      PhotoUpdate::Missing => {
        Err(approdo_core::Error::PersonNotFound(person_id).into())
      }
      PhotoUpdate::NoSuchPhoto(photo) => {
        Err(approdo_core::Error::PhotoNotFound { person_id, photo }.into())
      }
      PhotoUpdate::Updated(raw) => raw.into_person(),
    }
  }
}

enum PhotoUpdate {
  Missing,
  NoSuchPhoto(String),
  Updated(RawPerson),
}

/// Fetch one full row; shared by every operation that reads a record back.
fn select_person(
  conn: &rusqlite::Connection,
  person_id: i64,
) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
      rusqlite::params![person_id],
      RawPerson::from_row,
    )
    .optional()
}

/// Non-null values of `column`, grouped and ordered by descending count with
/// ties broken by name.
fn group_counts(
  conn: &rusqlite::Connection,
  column: &str,
) -> rusqlite::Result<Vec<GroupCount>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {column}, COUNT(*) AS n FROM persons \
     WHERE {column} IS NOT NULL \
     GROUP BY {column} ORDER BY n DESC, {column} ASC"
  ))?;
  let rows = stmt.query_map([], |row| {
    Ok(GroupCount {
      name:  row.get(0)?,
      value: row.get::<_, i64>(1)? as u64,
    })
  })?;
  rows.collect()
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewPerson) -> Result<Person> {
    let input = input.normalised()?;
    let row = PersonValues::encode(&input)?;
    let now = Utc::now();
    let created_str = encode_dt(now);
    let updated_str = created_str.clone();

    let person_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             christian_name, surname, date_of_birth, place_of_birth,
             date_of_death, occupation, additional_notes, reference,
             id_card_no, photos, has_photo, names_of_parents,
             names_of_children, date_of_naturalisation, no_of_cert,
             issued_at, town_or_city, home_at_death, date_of_arrival_aus,
             date_of_arrival_nt, arrival_period, data_source, created_at,
             updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22,
                     ?23, ?24)",
          rusqlite::params![
            row.christian_name,
            row.surname,
            row.date_of_birth,
            row.place_of_birth,
            row.date_of_death,
            row.occupation,
            row.additional_notes,
            row.reference,
            row.id_card_no,
            row.photos,
            row.has_photo,
            row.names_of_parents,
            row.names_of_children,
            row.date_of_naturalisation,
            row.no_of_cert,
            row.issued_at,
            row.town_or_city,
            row.home_at_death,
            row.date_of_arrival_aus,
            row.date_of_arrival_nt,
            row.arrival_period,
            row.data_source,
            created_str,
            updated_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(input.into_person(person_id, now, now))
  }

  async fn get(&self, person_id: i64) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| Ok(select_person(conn, person_id)?))
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn update(
    &self,
    person_id: i64,
    input: NewPerson,
  ) -> Result<Option<Person>> {
    let input = input.normalised()?;
    let row = PersonValues::encode(&input)?;
    let updated_str = encode_dt(Utc::now());

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE persons SET
             christian_name = ?1, surname = ?2, date_of_birth = ?3,
             place_of_birth = ?4, date_of_death = ?5, occupation = ?6,
             additional_notes = ?7, reference = ?8, id_card_no = ?9,
             photos = ?10, has_photo = ?11, names_of_parents = ?12,
             names_of_children = ?13, date_of_naturalisation = ?14,
             no_of_cert = ?15, issued_at = ?16, town_or_city = ?17,
             home_at_death = ?18, date_of_arrival_aus = ?19,
             date_of_arrival_nt = ?20, arrival_period = ?21,
             data_source = ?22, updated_at = ?23
           WHERE person_id = ?24",
          rusqlite::params![
            row.christian_name,
            row.surname,
            row.date_of_birth,
            row.place_of_birth,
            row.date_of_death,
            row.occupation,
            row.additional_notes,
            row.reference,
            row.id_card_no,
            row.photos,
            row.has_photo,
            row.names_of_parents,
            row.names_of_children,
            row.date_of_naturalisation,
            row.no_of_cert,
            row.issued_at,
            row.town_or_city,
            row.home_at_death,
            row.date_of_arrival_aus,
            row.date_of_arrival_nt,
            row.arrival_period,
            row.data_source,
            updated_str,
            person_id,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_person(conn, person_id)?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete(&self, person_id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM persons WHERE person_id = ?1",
          rusqlite::params![person_id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn search(&self, query: &SearchQuery) -> Result<Page<Person>> {
    let CompiledSearch {
      count_sql,
      select_sql,
      params,
    } = compile(query);
    let limit = i64::from(query.limit);
    let offset = query.offset() as i64;

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?;

        let mut window = params;
        window.push(Value::Integer(limit));
        window.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&select_sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(window), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, raws))
      })
      .await?;

    let data = raws
      .into_iter()
      .map(RawPerson::into_person)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::assemble(data, total as u64, query))
  }

  async fn add_photos(
    &self,
    person_id: i64,
    photos: Vec<String>,
  ) -> Result<Person> {
    self
      .modify_photos(person_id, move |list| {
        for photo in photos {
          let photo = photo.trim().to_owned();
          if !photo.is_empty() && !list.contains(&photo) {
            list.push(photo);
          }
        }
        Ok(())
      })
      .await
  }

  async fn remove_photo(&self, person_id: i64, photo: String) -> Result<Person> {
    self
      .modify_photos(person_id, move |list| {
        let before = list.len();
        list.retain(|p| *p != photo);
        if list.len() == before { Err(photo) } else { Ok(()) }
      })
      .await
  }

  async fn set_primary_photo(
    &self,
    person_id: i64,
    photo: String,
  ) -> Result<Person> {
    self
      .modify_photos(person_id, move |list| {
        let Some(position) = list.iter().position(|p| *p == photo) else {
          return Err(photo);
        };
        let primary = list.remove(position);
        list.insert(0, primary);
        Ok(())
      })
      .await
  }

  async fn stats(&self) -> Result<ArchiveStats> {
    let since_str = encode_dt(month_start(Utc::now()));

    let stats = self
      .conn
      .call(move |conn| {
        let total_records: i64 =
          conn.query_row("SELECT COUNT(*) FROM persons", [], |r| r.get(0))?;
        let records_with_photos: i64 = conn.query_row(
          "SELECT COUNT(*) FROM persons WHERE has_photo = 1",
          [],
          |r| r.get(0),
        )?;
        let records_this_month: i64 = conn.query_row(
          "SELECT COUNT(*) FROM persons WHERE created_at >= ?1",
          rusqlite::params![since_str],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(
          "SELECT CAST(strftime('%Y', date_of_arrival_nt) AS INTEGER), \
                  COUNT(*) \
           FROM persons WHERE date_of_arrival_nt IS NOT NULL \
           GROUP BY 1 ORDER BY 1 ASC",
        )?;
        let by_arrival_year = stmt
          .query_map([], |row| {
            Ok(YearCount {
              year:  row.get(0)?,
              count: row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let by_place_of_birth = group_counts(conn, "place_of_birth")?;
        let by_town_or_city = group_counts(conn, "town_or_city")?;

        Ok(ArchiveStats {
          total_records: total_records as u64,
          records_with_photos: records_with_photos as u64,
          records_this_month: records_this_month as u64,
          by_arrival_year,
          by_place_of_birth,
          by_town_or_city,
        })
      })
      .await?;

    Ok(stats)
  }
}

// ─── AdminStore impl ─────────────────────────────────────────────────────────

impl AdminStore for SqliteStore {
  type Error = crate::Error;

  async fn create_admin(&self, input: NewAdmin) -> Result<Admin> {
    let input = input.normalised()?;

    let email_check = input.email.clone();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM admins WHERE email = ?1",
              rusqlite::params![email_check],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if taken {
      return Err(approdo_core::Error::EmailTaken(input.email).into());
    }

    let NewAdmin {
      name,
      email,
      password_hash,
      role,
      status,
      profile_picture,
    } = input;
    let now = Utc::now();
    let created_str = encode_dt(now);
    let name_ins = name.clone();
    let email_ins = email.clone();
    let picture_ins = profile_picture.clone();

    let admin_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admins (
             name, email, password_hash, role, status, profile_picture,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            name_ins,
            email_ins,
            password_hash,
            role.as_str(),
            status.as_str(),
            picture_ins,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Admin {
      admin_id,
      name,
      email,
      role,
      status,
      profile_picture,
      created_at: now,
      last_login: None,
    })
  }

  async fn list_admins(&self) -> Result<Vec<Admin>> {
    let raws: Vec<RawAdmin> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY admin_id ASC"
        ))?;
        let raws = stmt
          .query_map([], RawAdmin::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawAdmin::into_admin).collect()
  }

  async fn count_admins(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM admins", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn get_admin(&self, admin_id: i64) -> Result<Option<Admin>> {
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_COLUMNS} FROM admins WHERE admin_id = ?1"
              ),
              rusqlite::params![admin_id],
              RawAdmin::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn update_admin(
    &self,
    admin_id: i64,
    update: AdminUpdate,
  ) -> Result<Option<Admin>> {
    let update = update.normalised()?;

    let email_check = update.email.clone();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM admins WHERE email = ?1 AND admin_id != ?2",
              rusqlite::params![email_check, admin_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if taken {
      return Err(approdo_core::Error::EmailTaken(update.email).into());
    }

    let AdminUpdate {
      name,
      email,
      password_hash,
      role,
      status,
      profile_picture,
    } = update;

    let changed = self
      .conn
      .call(move |conn| {
        let changed = if let Some(hash) = password_hash {
          conn.execute(
            "UPDATE admins SET name = ?1, email = ?2, role = ?3, \
             status = ?4, profile_picture = ?5, password_hash = ?6 \
             WHERE admin_id = ?7",
            rusqlite::params![
              name,
              email,
              role.as_str(),
              status.as_str(),
              profile_picture,
              hash,
              admin_id,
            ],
          )?
        } else {
          conn.execute(
            "UPDATE admins SET name = ?1, email = ?2, role = ?3, \
             status = ?4, profile_picture = ?5 \
             WHERE admin_id = ?6",
            rusqlite::params![
              name,
              email,
              role.as_str(),
              status.as_str(),
              profile_picture,
              admin_id,
            ],
          )?
        };
        Ok(changed)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_admin(admin_id).await
  }

  async fn delete_admin(&self, admin_id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM admins WHERE admin_id = ?1",
          rusqlite::params![admin_id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn find_admin_by_email(
    &self,
    email: String,
  ) -> Result<Option<(Admin, String)>> {
    let email = email.trim().to_ascii_lowercase();

    let raw: Option<(RawAdmin, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_COLUMNS}, password_hash FROM admins \
                 WHERE email = ?1"
              ),
              rusqlite::params![email],
              |row| Ok((RawAdmin::from_row(row)?, row.get(8)?)),
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some((raw, hash)) => Ok(Some((raw.into_admin()?, hash))),
      None => Ok(None),
    }
  }

  async fn record_login(&self, admin_id: i64) -> Result<()> {
    let at_str = encode_dt(Utc::now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE admins SET last_login = ?1 WHERE admin_id = ?2",
          rusqlite::params![at_str, admin_id],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(approdo_core::Error::AdminNotFound(admin_id).into());
    }
    Ok(())
  }
}
