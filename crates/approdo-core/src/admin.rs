//! Admin directory types.
//!
//! Admins authenticate requests at the HTTP boundary; the archive core only
//! sees their identity. Password hashes travel next to — never inside — the
//! [`Admin`] type, so a serialised admin can never leak credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, text};

/// Access tier of a directory entry. Stored and serialised as its display
/// string, matching what the admin UI shows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum AdminRole {
  #[serde(rename = "Super Admin")]
  SuperAdmin,
  Editor,
  #[default]
  Viewer,
}

impl AdminRole {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::SuperAdmin => "Super Admin",
      Self::Editor => "Editor",
      Self::Viewer => "Viewer",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "Super Admin" => Some(Self::SuperAdmin),
      "Editor" => Some(Self::Editor),
      "Viewer" => Some(Self::Viewer),
      _ => None,
    }
  }
}

/// Whether a directory entry may authenticate at all.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum AdminStatus {
  #[default]
  Active,
  Inactive,
}

impl AdminStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "Active",
      Self::Inactive => "Inactive",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "Active" => Some(Self::Active),
      "Inactive" => Some(Self::Inactive),
      _ => None,
    }
  }
}

/// A directory entry. The password hash is deliberately not a field here;
/// stores return it separately for credential checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
  pub admin_id:        i64,
  pub name:            String,
  /// Stored lower-cased; uniqueness is case-insensitive.
  pub email:           String,
  pub role:            AdminRole,
  pub status:          AdminStatus,
  pub profile_picture: Option<String>,
  pub created_at:      DateTime<Utc>,
  /// Last successfully authenticated request, if any.
  pub last_login:      Option<DateTime<Utc>>,
}

/// Input to [`AdminStore::create_admin`](crate::store::AdminStore::create_admin).
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdmin {
  pub name:            String,
  pub email:           String,
  /// Argon2 PHC string, already hashed by the caller.
  pub password_hash:   String,
  pub role:            AdminRole,
  pub status:          AdminStatus,
  pub profile_picture: Option<String>,
}

impl NewAdmin {
  /// Tidy the name, lower-case the e-mail and reject incomplete input.
  pub fn normalised(mut self) -> Result<Self> {
    self.name = text::tidy(&self.name);
    self.email = self.email.trim().to_ascii_lowercase();
    if self.name.is_empty() || self.email.is_empty() {
      return Err(Error::IncompleteAdmin);
    }
    self.profile_picture =
      self.profile_picture.filter(|p| !p.trim().is_empty());
    Ok(self)
  }
}

/// Whole-entry replacement for [`AdminStore::update_admin`]
/// (crate::store::AdminStore::update_admin). A `None` password hash keeps
/// the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUpdate {
  pub name:            String,
  pub email:           String,
  pub password_hash:   Option<String>,
  pub role:            AdminRole,
  pub status:          AdminStatus,
  pub profile_picture: Option<String>,
}

impl AdminUpdate {
  pub fn normalised(mut self) -> Result<Self> {
    self.name = text::tidy(&self.name);
    self.email = self.email.trim().to_ascii_lowercase();
    if self.name.is_empty() || self.email.is_empty() {
      return Err(Error::IncompleteAdmin);
    }
    self.profile_picture =
      self.profile_picture.filter(|p| !p.trim().is_empty());
    Ok(self)
  }
}
