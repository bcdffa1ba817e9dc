//! Dependency URI grammar: `external://<ecosystem>/<package>/<version>` and
//! `internal://<namespace>/<entity-name>`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ecosystems accepted at parse time. `Maven` is accepted here but
/// deliberately excluded from the narrower set that business-logic
/// validation (Layer 4) treats as supported — see
/// [`Ecosystem::is_layer4_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    Pypi,
    Npm,
    #[serde(rename = "golang.org")]
    Golang,
    #[serde(rename = "github.com")]
    Github,
    #[serde(rename = "crates.io")]
    CratesIo,
    Maven,
}

impl Ecosystem {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pypi" => Some(Ecosystem::Pypi),
            "npm" => Some(Ecosystem::Npm),
            "golang.org" => Some(Ecosystem::Golang),
            "github.com" => Some(Ecosystem::Github),
            "crates.io" => Some(Ecosystem::CratesIo),
            "maven" => Some(Ecosystem::Maven),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Pypi => "pypi",
            Ecosystem::Npm => "npm",
            Ecosystem::Golang => "golang.org",
            Ecosystem::Github => "github.com",
            Ecosystem::CratesIo => "crates.io",
            Ecosystem::Maven => "maven",
        }
    }

    /// `maven` parses but is excluded from the set Layer 4 treats as
    /// supported; this is an intentional gate inherited from the source
    /// system, not an oversight.
    pub fn is_layer4_supported(&self) -> bool {
        !matches!(self, Ecosystem::Maven)
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed dependency reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyUri {
    External {
        ecosystem_raw: String,
        package: String,
        version: String,
    },
    Internal {
        namespace: String,
        entity_name: String,
    },
    None,
}

static EXTERNAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^external://([^/]+)/(.+)/([^/]+)$").unwrap());
static INTERNAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^internal://(.+)$").unwrap());
static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]([a-z0-9_-]*[a-z0-9])?$").unwrap());

impl DependencyUri {
    /// Parse a raw target/reference string into its tagged form.
    /// Malformed `external://`/`internal://` prefixes still tag as
    /// `External`/`Internal` so the business-logic layer can report a
    /// precise reason; anything else is `None`.
    pub fn parse(raw: &str) -> DependencyUri {
        if let Some(caps) = EXTERNAL_RE.captures(raw) {
            return DependencyUri::External {
                ecosystem_raw: caps[1].to_string(),
                package: caps[2].to_string(),
                version: caps[3].to_string(),
            };
        }
        if raw.starts_with("external://") {
            return DependencyUri::External {
                ecosystem_raw: String::new(),
                package: String::new(),
                version: String::new(),
            };
        }
        if let Some(caps) = INTERNAL_RE.captures(raw) {
            let path = &caps[1];
            let segments: Vec<&str> = path.split('/').collect();
            if segments.len() >= 2 {
                let namespace = segments[0].to_string();
                let entity_name = segments[1..].join("/");
                return DependencyUri::Internal { namespace, entity_name };
            }
            return DependencyUri::Internal {
                namespace: String::new(),
                entity_name: String::new(),
            };
        }
        DependencyUri::None
    }

    pub fn is_namespace_valid(namespace: &str) -> bool {
        NAMESPACE_RE.is_match(namespace)
    }

    /// The canonical package-level id for an external reference:
    /// `external://<ecosystem>/<package>`.
    pub fn external_package_id(ecosystem: &str, package: &str) -> String {
        format!("external://{ecosystem}/{package}")
    }

    /// The canonical version-level id: the full external URI.
    pub fn external_version_id(ecosystem: &str, package: &str, version: &str) -> String {
        format!("external://{ecosystem}/{package}/{version}")
    }

    pub fn internal_entity_id(namespace: &str, entity_name: &str) -> String {
        format!("{namespace}/{entity_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_external_uri() {
        let parsed = DependencyUri::parse("external://pypi/requests/2.31.0");
        assert_eq!(
            parsed,
            DependencyUri::External {
                ecosystem_raw: "pypi".into(),
                package: "requests".into(),
                version: "2.31.0".into(),
            }
        );
    }

    #[test]
    fn parses_external_uri_with_slashes_in_package() {
        let parsed = DependencyUri::parse("external://github.com/rust-lang/regex/1.10.0");
        assert_eq!(
            parsed,
            DependencyUri::External {
                ecosystem_raw: "github.com".into(),
                package: "rust-lang/regex".into(),
                version: "1.10.0".into(),
            }
        );
    }

    #[test]
    fn parses_internal_uri() {
        let parsed = DependencyUri::parse("internal://demo/r1");
        assert_eq!(
            parsed,
            DependencyUri::Internal {
                namespace: "demo".into(),
                entity_name: "r1".into(),
            }
        );
    }

    #[test]
    fn unrecognized_scheme_is_none() {
        assert_eq!(DependencyUri::parse("ftp://example.com"), DependencyUri::None);
    }

    #[test]
    fn maven_parses_but_is_not_layer4_supported() {
        assert_eq!(Ecosystem::parse("maven"), Some(Ecosystem::Maven));
        assert!(!Ecosystem::Maven.is_layer4_supported());
        assert!(Ecosystem::Pypi.is_layer4_supported());
    }

    #[test]
    fn canonical_id_builders() {
        assert_eq!(
            DependencyUri::external_package_id("pypi", "requests"),
            "external://pypi/requests"
        );
        assert_eq!(
            DependencyUri::external_version_id("pypi", "requests", "2.31.0"),
            "external://pypi/requests/2.31.0"
        );
        assert_eq!(DependencyUri::internal_entity_id("demo", "r1"), "demo/r1");
    }

    #[test]
    fn namespace_regex() {
        assert!(DependencyUri::is_namespace_valid("demo"));
        assert!(DependencyUri::is_namespace_valid("demo-team-2"));
        assert!(!DependencyUri::is_namespace_valid("Invalid_NS"));
        assert!(!DependencyUri::is_namespace_valid("-demo"));
    }
}
