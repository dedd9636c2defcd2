//! Error types for the tablature document model and its codecs
//!
//! Binary decoding failures are fatal and carry the byte offset where the
//! stream stopped making sense. Operation failures are split into validation
//! (bad index or value) and state (nothing loaded) errors so callers can tell
//! a typo from a missing document.

use thiserror::Error;

/// Binary decode failure. Decoding fails closed: no partially populated song
/// is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The stream ended before a value could be read
    #[error("unexpected end of data at byte {offset}: needed {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    /// The version string names a format this codec does not speak
    #[error("unsupported format version '{version}' at byte {offset}")]
    UnsupportedVersion { offset: usize, version: String },

    /// A value was read but is outside what the format allows
    #[error("invalid {field} at byte {offset}: {value}")]
    InvalidValue {
        offset: usize,
        field: &'static str,
        value: i64,
    },
}

impl FormatError {
    /// Byte offset at which decoding failed
    pub fn offset(&self) -> usize {
        match self {
            FormatError::Truncated { offset, .. }
            | FormatError::UnsupportedVersion { offset, .. }
            | FormatError::InvalidValue { offset, .. } => *offset,
        }
    }
}

/// An out-of-range index or value was supplied to an operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}

/// An operation needed a loaded song and there was none
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no song is currently loaded")]
pub struct StateError;

/// Interchange text could not be turned into a tree, or the tree into a song
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("interchange root must be a mapping")]
    NotAMapping,
}

/// Top-level error returned by the operation surface
#[derive(Debug, Error)]
pub enum TabError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Interchange(#[from] InterchangeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI write error: {0}")]
    Midi(String),
}

impl TabError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TabError::Validation(_))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, TabError::State(_))
    }
}

pub type Result<T> = std::result::Result<T, TabError>;

/// Shorthand used by the operation modules to bail with a validation error
pub(crate) fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(ValidationError::new(message).into())
}
