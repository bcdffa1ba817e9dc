//! Schema version handling.
//!
//! Descriptor and schema files only ever name a bare `major.minor.patch`
//! string — there is no prerelease or build-metadata grammar in this
//! system, unlike full semver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// A restricted three-component semantic version: `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn increment_major(&mut self) {
        self.major += 1;
        self.minor = 0;
        self.patch = 0;
    }

    pub fn increment_minor(&mut self) {
        self.minor += 1;
        self.patch = 0;
    }

    pub fn increment_patch(&mut self) {
        self.patch += 1;
    }

    /// Decide whether moving from `self` to `next` is an allowed version
    /// bump given whether the underlying change set was additive-only.
    ///
    /// Allowed: same major with minor-up (additive change), same
    /// major.minor with patch-up (always), or major-up when the change set
    /// was *not* additive-only. Anything else — including any backward or
    /// zero move — is rejected.
    pub fn is_allowed_bump(&self, next: &SchemaVersion, additive_only: bool) -> bool {
        if next <= self {
            return false;
        }
        if next.major == self.major && next.minor == self.minor && next.patch > self.patch {
            return true;
        }
        if next.major == self.major && next.minor > self.minor {
            return additive_only;
        }
        if next.major > self.major {
            return !additive_only;
        }
        false
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let re = regex::Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").unwrap();
        let captures = re
            .captures(s)
            .ok_or_else(|| CoreError::ParseError(format!("invalid schema version: {s}")))?;

        Ok(Self {
            major: captures[1].parse().unwrap(),
            minor: captures[2].parse().unwrap(),
            patch: captures[3].parse().unwrap(),
        })
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_roundtrip() {
        let v = SchemaVersion::new(1, 2, 3);
        assert_eq!(v.to_string(), "1.2.3");
        assert_eq!("1.2.3".parse::<SchemaVersion>().unwrap(), v);
    }

    #[test]
    fn rejects_prerelease_and_build_metadata() {
        assert!("1.2.3-alpha".parse::<SchemaVersion>().is_err());
        assert!("1.2.3+build.1".parse::<SchemaVersion>().is_err());
        assert!("1.2".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn ordering_is_lexicographic_by_component() {
        assert!(SchemaVersion::new(1, 0, 0) < SchemaVersion::new(2, 0, 0));
        assert!(SchemaVersion::new(1, 0, 0) < SchemaVersion::new(1, 1, 0));
        assert!(SchemaVersion::new(1, 0, 0) < SchemaVersion::new(1, 0, 1));
    }

    #[test]
    fn increments_reset_lower_components() {
        let mut v = SchemaVersion::new(1, 2, 3);
        v.increment_patch();
        assert_eq!(v, SchemaVersion::new(1, 2, 4));
        v.increment_minor();
        assert_eq!(v, SchemaVersion::new(1, 3, 0));
        v.increment_major();
        assert_eq!(v, SchemaVersion::new(2, 0, 0));
    }

    #[test]
    fn version_bump_rules() {
        let v1 = SchemaVersion::new(1, 2, 3);

        // patch-up always allowed
        assert!(v1.is_allowed_bump(&SchemaVersion::new(1, 2, 4), true));
        assert!(v1.is_allowed_bump(&SchemaVersion::new(1, 2, 4), false));

        // minor-up only when additive
        assert!(v1.is_allowed_bump(&SchemaVersion::new(1, 3, 0), true));
        assert!(!v1.is_allowed_bump(&SchemaVersion::new(1, 3, 0), false));

        // major-up only when NOT additive-only
        assert!(v1.is_allowed_bump(&SchemaVersion::new(2, 0, 0), false));
        assert!(!v1.is_allowed_bump(&SchemaVersion::new(2, 0, 0), true));

        // backward or zero move always rejected
        assert!(!v1.is_allowed_bump(&SchemaVersion::new(1, 2, 3), true));
        assert!(!v1.is_allowed_bump(&SchemaVersion::new(1, 2, 2), false));
    }
}
