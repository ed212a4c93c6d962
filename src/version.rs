//! Version derivation for release runs
//!
//! A version is `YYYY.MM.DD-<ordinal>`: the run's calendar date plus the
//! invocation's run ordinal. The date prefix keeps versions chronologically
//! sortable across days; the ordinal disambiguates same-day runs.

use chrono::NaiveDate;
use std::fmt;

/// An immutable version identifier, computed once per run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the version identifier for a run
pub struct VersionResolver;

impl VersionResolver {
    /// Compute the version for the given date and run ordinal.
    ///
    /// Pure: same inputs always produce the same version.
    pub fn resolve(date: NaiveDate, ordinal: u32) -> Version {
        Version(format!("{}-{}", date.format("%Y.%m.%d"), ordinal))
    }
}
