use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is. Neither stops planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; the invocation still succeeds
    Advisory,
    /// The item was skipped and the invocation reports failure
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NotInstalled,
    AlreadyInstalled,
    Pinned,
    MetadataUnavailable,
}

/// A condition noticed while planning, reported alongside the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn advisory(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Advisory,
            message: message.into(),
        }
    }

    pub fn failure(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Failure,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Advisory => write!(f, "Warning: {}", self.message),
            Severity::Failure => write!(f, "Error: {}", self.message),
        }
    }
}
