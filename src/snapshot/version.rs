//! Format versions for export documents and backups.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// `major.minor.patch` version stamped on every export document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Version written by this build.
    pub const CURRENT: Self = Self::new(1, 0, 0);

    /// Whether a reader at this version understands a document at `written`.
    ///
    /// Majors must match. Minor bumps only add optional fields, so a reader
    /// accepts any minor up to its own. Patch is ignored.
    pub fn can_read(&self, written: &Self) -> bool {
        self.major == written.major && written.minor <= self.minor
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error parsing a [`FormatVersion`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid format version '{0}': expected major.minor.patch")]
pub struct ParseVersionError(String);

impl FromStr for FormatVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let mut parts = s.trim().split('.').map(|p| p.parse::<u32>().map_err(|_| err()));
        let major = parts.next().ok_or_else(err)??;
        let minor = parts.next().ok_or_else(err)??;
        let patch = parts.next().ok_or_else(err)??;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, patch))
    }
}
