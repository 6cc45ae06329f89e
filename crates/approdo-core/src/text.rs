//! Shared text helpers for normalisation and matching.

/// Trim and collapse every internal whitespace run to a single space.
/// Idempotent; this is the canonical form of all filter and name text.
pub fn tidy(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII-case-insensitive substring test.
///
/// Case is folded per ASCII byte so the result agrees exactly with SQLite's
/// `LIKE`, which the database backend compiles this test down to.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack
    .to_ascii_lowercase()
    .contains(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tidy_trims_and_collapses() {
    assert_eq!(tidy("  maria   di  falco "), "maria di falco");
    assert_eq!(tidy("\tmaria\n rossi"), "maria rossi");
    assert_eq!(tidy("single"), "single");
    assert_eq!(tidy("   "), "");
    assert_eq!(tidy(""), "");
  }

  #[test]
  fn tidy_is_idempotent() {
    let once = tidy("  a   b  c ");
    assert_eq!(tidy(&once), once);
  }

  #[test]
  fn contains_ci_folds_ascii_case() {
    assert!(contains_ci("Giuseppe", "sep"));
    assert!(contains_ci("Giuseppe", "GIUSEPPE"));
    assert!(contains_ci("DARWIN", "win"));
    assert!(!contains_ci("Darwin", "dx"));
  }
}
