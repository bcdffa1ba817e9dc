//! Core type definitions shared by field, relationship and entity schemas.

use serde::{Deserialize, Serialize};

/// The semantic type a field's value must conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    String,
    Integer,
    Boolean,
    Datetime,
    Array,
    Object,
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticType::String => write!(f, "string"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::Datetime => write!(f, "datetime"),
            SemanticType::Array => write!(f, "array"),
            SemanticType::Object => write!(f, "object"),
        }
    }
}

/// A named format constraint layered on top of a field's semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTag {
    Email,
    Url,
    Enum,
}

/// Relationship cardinality as declared by the schema author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Direction of a schema-declared relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
    Bidirectional,
}

/// Deprecation metadata attached to a field or relationship definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationInfo {
    pub deprecated: bool,
    pub deprecated_since: Option<String>,
    pub removal_version: Option<String>,
    pub message: Option<String>,
}

impl Default for DeprecationInfo {
    fn default() -> Self {
        Self {
            deprecated: false,
            deprecated_since: None,
            removal_version: None,
            message: None,
        }
    }
}

impl DeprecationInfo {
    pub fn deprecated(since: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            deprecated: true,
            deprecated_since: Some(since.into()),
            removal_version: None,
            message: Some(message.into()),
        }
    }

    pub fn with_removal_version(mut self, version: impl Into<String>) -> Self {
        self.removal_version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_type_display() {
        assert_eq!(SemanticType::String.to_string(), "string");
        assert_eq!(SemanticType::Datetime.to_string(), "datetime");
    }

    #[test]
    fn deprecation_info_default_is_not_deprecated() {
        let info = DeprecationInfo::default();
        assert!(!info.deprecated);
        assert!(info.message.is_none());
    }

    #[test]
    fn deprecation_info_builder() {
        let info = DeprecationInfo::deprecated("1.2.0", "use `owner` instead")
            .with_removal_version("2.0.0");
        assert!(info.deprecated);
        assert_eq!(info.removal_version.as_deref(), Some("2.0.0"));
    }
}
