//! Structured error types for BioLedger.
//!
//! Library functions return [`LabError`]. Document parsing keeps a hint
//! alongside the serde error so CLI users get an actionable message.

use thiserror::Error;

/// The unified error type returned by all public BioLedger API functions.
#[derive(Debug, Error)]
pub enum LabError {
    /// JSON input failed to parse as a valid lab document or record.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },

    /// A lab already exists; the deployment holds exactly one.
    #[error("Lab already initialized")]
    AlreadyInitialized,

    /// No lab has been created yet.
    #[error("Lab is not initialized; run `init` or `seed` first")]
    NotInitialized,

    /// Reading or writing the lab document failed.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: String,
        source: std::io::Error,
    },

    /// The configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// A chat message was empty.
    #[error("Message required")]
    EmptyMessage,

    /// The completion API failed or returned something unusable.
    #[error("AI error: {0}")]
    Completion(String),

    /// Mail rendering or hand-off failed.
    #[error("Mail error: {0}")]
    Mail(String),

    /// No alert recipients are configured.
    #[error("No alert recipients configured")]
    NoRecipients,

    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    RenderError(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for LabError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the lab schema. Check field names, enum values (e.g. \"BSL-2\", \"Dr\"), and dates (YYYY-MM-DD).".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LabError::ParseError { source: e, hint }
    }
}

impl From<mustache::Error> for LabError {
    fn from(e: mustache::Error) -> Self {
        LabError::Mail(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_schema_hint() {
        let err: LabError = serde_json::from_str::<crate::model::Lab>("{\"name\": 3}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("Hint:"));
        assert!(msg.contains("lab schema"));
    }

    #[test]
    fn syntax_error_hint() {
        let err: LabError = serde_json::from_str::<crate::model::Lab>("{\"name\": \"a\",}")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("trailing commas"));
    }
}
