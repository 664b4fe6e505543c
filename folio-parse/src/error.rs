use serde::{Deserialize, Serialize};

/// Errors that can occur while loading a post.
///
/// The block parser itself has no error channel; these only cover the
/// metadata layer around it and are surfaced as [`Diagnostic`]s.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
    #[error("Front matter opened with `---` but never closed")]
    UnclosedFrontMatter,

    #[error("Invalid front matter: {message}")]
    FrontMatter { message: String, line: usize },
}

impl DocumentError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::UnclosedFrontMatter => "E001",
            DocumentError::FrontMatter { .. } => "E002",
        }
    }

    /// 1-based line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            DocumentError::UnclosedFrontMatter => 1,
            DocumentError::FrontMatter { line, .. } => *line,
        }
    }
}

/// Errors from tokenizing a fence info string.
///
/// The block parser recovers from these by reading the info string as plain
/// whitespace-separated words.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttrError {
    #[error("unterminated quoted value for key '{key}'")]
    UnterminatedQuote { key: String },

    #[error("missing key before '=' at position {position}")]
    MissingKey { position: usize },
}

/// A diagnostic message produced while loading or validating a post.
///
/// Diagnostics are non-fatal: loading continues and produces a best-effort
/// post even when diagnostics are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<DocumentError> for Diagnostic {
    fn from(err: DocumentError) -> Self {
        Diagnostic {
            severity: Severity::Error,
            line: Some(err.line()),
            code: Some(err.code().into()),
            message: err.to_string(),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}
