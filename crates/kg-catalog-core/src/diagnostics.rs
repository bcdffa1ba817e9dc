//! Structured diagnostics produced by the validation pipeline.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic. `Warning`s do not fail validation unless
/// strict mode promotes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A single typed finding produced by one of the five validation layers.
///
/// `diagnostic_type` is the stable machine-readable tag (e.g.
/// `missing_required_field`, `unsupported_schema_version`) referenced
/// throughout the pipeline's layer contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub diagnostic_type: String,
    pub message: String,
    pub severity: Severity,
    pub field: Option<String>,
    pub entity: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(diagnostic_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            diagnostic_type: diagnostic_type.into(),
            message: message.into(),
            severity: Severity::Error,
            field: None,
            entity: None,
            line: None,
            column: None,
            help: None,
        }
    }

    pub fn warning(diagnostic_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            diagnostic_type: diagnostic_type.into(),
            message: message.into(),
            severity: Severity::Warning,
            field: None,
            entity: None,
            line: None,
            column: None,
            help: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Accumulated outcome of running the validation pipeline over a
/// descriptor. `model` is populated once a Layer-3 pass produces a
/// structurally sound value tree; it stays `None` on any earlier failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                self.is_valid = false;
                self.errors.push(diagnostic);
            }
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.add(d);
        }
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Promotes every warning to an error, as required by strict mode.
    pub fn promote_warnings(&mut self) {
        if self.warnings.is_empty() {
            return;
        }
        self.is_valid = false;
        for mut w in std::mem::take(&mut self.warnings) {
            w.severity = Severity::Error;
            self.errors.push(w);
        }
    }
}
