//! The `PersonStore` and `AdminStore` traits.
//!
//! Implemented by storage backends (`approdo-store-sqlite`, and the
//! in-memory backend in this crate). The HTTP layer depends on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  admin::{Admin, AdminUpdate, NewAdmin},
  person::{NewPerson, Person},
  query::{Page, SearchQuery},
  stats::ArchiveStats,
};

// ─── Person records ──────────────────────────────────────────────────────────

/// Abstraction over the migrant-record archive.
///
/// Backend failures convert into [`Error::Unavailable`](crate::Error) via the
/// `Into<Error>` bound, so callers can always tell a broken store apart from
/// an empty result.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Persist a new record. `person_id` is assigned by the store, ascending
  /// and never reused, even after deletes.
  fn create(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve one record. Returns `None` if the id is unknown.
  fn get(
    &self,
    person_id: i64,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Replace every caller-editable field of an existing record in one step.
  /// `created_at` is preserved; `updated_at` is refreshed.
  fn update(
    &self,
    person_id: i64,
    input: NewPerson,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a record. Returns `false` if the id is unknown.
  fn delete(
    &self,
    person_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Run a normalised search and assemble one page of results.
  /// A page past the end of the matches is empty, not an error.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + 'a;

  // ── Photo references ──────────────────────────────────────────────────

  /// Append photo references, skipping any already attached.
  fn add_photos(
    &self,
    person_id: i64,
    photos: Vec<String>,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Detach one photo reference.
  fn remove_photo(
    &self,
    person_id: i64,
    photo: String,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Move an attached reference to the front of the list, making it the
  /// primary photo.
  fn set_primary_photo(
    &self,
    person_id: i64,
    photo: String,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Aggregate counts for the dashboard, taken in one consistent snapshot.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<ArchiveStats, Self::Error>> + Send + '_;
}

// ─── Admin directory ─────────────────────────────────────────────────────────

/// Abstraction over the admin directory used by the HTTP auth gate.
pub trait AdminStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Create a directory entry. Fails with
  /// [`Error::EmailTaken`](crate::Error) if the e-mail is already
  /// registered.
  fn create_admin(
    &self,
    input: NewAdmin,
  ) -> impl Future<Output = Result<Admin, Self::Error>> + Send + '_;

  /// All entries, ordered by ascending `admin_id`.
  fn list_admins(
    &self,
  ) -> impl Future<Output = Result<Vec<Admin>, Self::Error>> + Send + '_;

  fn count_admins(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn get_admin(
    &self,
    admin_id: i64,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + '_;

  /// Replace a directory entry. A `None` password hash keeps the stored one.
  fn update_admin(
    &self,
    admin_id: i64,
    update: AdminUpdate,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + '_;

  fn delete_admin(
    &self,
    admin_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Look up an entry by e-mail (case-insensitive), returning it together
  /// with its password hash for credential verification.
  fn find_admin_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<(Admin, String)>, Self::Error>>
  + Send
  + '_;

  /// Stamp `last_login` with the current time.
  fn record_login(
    &self,
    admin_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
