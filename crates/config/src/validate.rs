//! Configuration validation.
//!
//! Reports missing credentials and routing settings that would leave the
//! gateway unable to verify webhooks, reply, or let anyone log out.

use secrecy::{ExposeSecret, Secret};

use crate::schema::TutorbotConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "line.channel_secret"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
pub fn validate(config: &TutorbotConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_secret(
        &mut result,
        Severity::Error,
        "line.channel_secret",
        &config.line.channel_secret,
        "webhook signatures cannot be verified",
    );
    check_secret(
        &mut result,
        Severity::Error,
        "line.channel_access_token",
        &config.line.channel_access_token,
        "replies cannot be delivered",
    );
    check_secret(
        &mut result,
        Severity::Warning,
        "llm.api_key",
        &config.llm.api_key,
        "every answer will fall back to the service error text",
    );

    if config.routing.logout_phrases.iter().all(|p| p.trim().is_empty()) {
        result.push(
            Severity::Warning,
            "routing.logout_phrases",
            "no logout phrase configured, bound users can never unbind",
        );
    }

    if config
        .routing
        .test_identities
        .iter()
        .any(|id| id.trim().is_empty())
    {
        result.push(
            Severity::Warning,
            "routing.test_identities",
            "blank entry in test identity list",
        );
    }

    if config.data.name_column.trim().is_empty() {
        result.push(Severity::Error, "data.name_column", "must not be empty");
    }

    if config.routing.verify_student_id && config.data.id_column.trim().is_empty() {
        result.push(
            Severity::Error,
            "data.id_column",
            "must be set when routing.verify_student_id is enabled",
        );
    }

    if config.llm.timeout_secs == Some(0) {
        result.push(Severity::Warning, "llm.timeout_secs", "0 fails every call");
    }

    result
}

fn check_secret(
    result: &mut ValidationResult,
    severity: Severity,
    path: &str,
    secret: &Secret<String>,
    consequence: &str,
) {
    let value = secret.expose_secret();
    if value.is_empty() {
        result.push(severity, path, format!("not set; {consequence}"));
    } else if value.starts_with("${") && value.ends_with('}') {
        result.push(
            severity,
            path,
            format!("unresolved placeholder {value}; {consequence}"),
        );
    }
}
