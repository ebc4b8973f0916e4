//! Format versions for files Craftwise writes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version stamped into a persisted file.
///
/// Readers accept any file with the same major number; minor and patch
/// bumps only add optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when old readers can no longer load the file
    pub major: u16,
    /// Bumped when fields are added
    pub minor: u16,
    /// Bumped for fixes that leave the layout alone
    pub patch: u16,
}

impl SchemaVersion {
    /// Favorites file format written by this build.
    pub const FAVORITES: Self = Self::new(1, 0, 0);

    /// Creates a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether a reader at this version can load a file stamped `found`.
    #[must_use]
    pub const fn can_read(&self, found: &Self) -> bool {
        self.major == found.major
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
