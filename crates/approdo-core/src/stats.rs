//! Aggregate counts for the admin dashboard.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Records grouped by the year they arrived in the Territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
  pub year:  i32,
  pub count: u64,
}

/// Records grouped by a place name (birthplace or settlement town).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
  pub name:  String,
  pub value: u64,
}

/// One consistent snapshot of the whole archive.
///
/// Year groups are ordered by year ascending; place groups by count
/// descending, then name, so charts render identically on every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
  pub total_records:       u64,
  pub records_with_photos: u64,
  /// Records created since the start of the current calendar month (UTC).
  pub records_this_month:  u64,
  pub by_arrival_year:     Vec<YearCount>,
  pub by_place_of_birth:   Vec<GroupCount>,
  pub by_town_or_city:     Vec<GroupCount>,
}

/// First instant of the month containing `now`, in UTC.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
    .single()
    .unwrap_or(now)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn month_start_truncates_to_first_midnight() {
    let now = Utc.with_ymd_and_hms(1956, 7, 19, 13, 45, 2).unwrap();
    let start = month_start(now);
    assert_eq!(start, Utc.with_ymd_and_hms(1956, 7, 1, 0, 0, 0).unwrap());
  }
}
