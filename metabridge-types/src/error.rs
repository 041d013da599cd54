//! Error taxonomy and the bounded error report.

use crate::keys;
use serde_json::{json, Value};
use std::fmt::{self, Write as _};
use thiserror::Error;

/// Capacity of an [`ErrorRecord`] message buffer, including one byte
/// reserved for a terminator, so at most `MAX_ERROR_MESSAGE_LEN - 1` bytes
/// of message text are kept.
pub const MAX_ERROR_MESSAGE_LEN: usize = 1024;

/// Result type for metabridge operations.
pub type MetaResult<T> = Result<T, MetaError>;

/// Errors raised while translating JSON into catalog operations.
///
/// Validation variants are raised before any catalog call is made.
/// `CollaboratorFailure` carries the catalog's own code unchanged.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A required JSON field is absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A JSON field holds the wrong type.
    #[error("invalid type for '{field}': expected {expected}")]
    InvalidType { field: String, expected: &'static str },

    /// An access level name was not recognised.
    #[error("invalid access level '{0}'")]
    InvalidAccessLevel(String),

    /// A search operator was not recognised.
    #[error("invalid query operator '{0}'")]
    InvalidOperator(String),

    /// A metadata operation name was not recognised.
    #[error("invalid metadata operation '{0}'")]
    InvalidOperation(String),

    /// The AVU is already attached to the target.
    #[error("AVU {{'{attribute}', '{value}', '{units}'}} already exists on '{path}'")]
    DuplicateAvu {
        path: String,
        attribute: String,
        value: String,
        units: String,
    },

    /// A query would hold more conditionals than the catalog accepts.
    #[error("too many query conditionals: {requested} exceeds the limit of {limit}")]
    TooManyConditionals { requested: usize, limit: usize },

    /// The caller supplied a different number of labels than columns.
    #[error("{labels} labels supplied for {columns} selected columns")]
    LabelColumnMismatch { labels: usize, columns: usize },

    /// The catalog reported an error.
    #[error("{message}")]
    CollaboratorFailure { code: i32, message: String },

    /// The catalog returned data that breaks its own contract.
    #[error("internal consistency fault: {0}")]
    InternalConsistencyFault(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MetaError {
    /// Builds a `CollaboratorFailure`.
    pub fn collaborator(code: i32, message: impl Into<String>) -> Self {
        Self::CollaboratorFailure {
            code,
            message: message.into(),
        }
    }

    /// Stable integer code reported in the JSON error envelope.
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingField(_) => -1001,
            Self::InvalidType { .. } => -1002,
            Self::InvalidAccessLevel(_) => -1003,
            Self::InvalidOperator(_) => -1004,
            Self::InvalidOperation(_) => -1005,
            Self::DuplicateAvu { .. } => -1006,
            Self::TooManyConditionals { .. } => -1007,
            Self::LabelColumnMismatch { .. } => -1008,
            Self::InternalConsistencyFault(_) => -1009,
            Self::Serialization(_) => -1010,
            Self::CollaboratorFailure { code, .. } => *code,
        }
    }

    /// True for faults that indicate a programming error in this layer or
    /// the catalog rather than bad user input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::LabelColumnMismatch { .. } | Self::InternalConsistencyFault(_)
        )
    }

    /// True for errors detected before any catalog call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidType { .. }
                | Self::InvalidAccessLevel(_)
                | Self::InvalidOperator(_)
                | Self::InvalidOperation(_)
                | Self::TooManyConditionals { .. }
        )
    }
}

/// Error report embedded into operation results.
///
/// A fresh record has code 0 and an empty message. [`ErrorRecord::set`]
/// formats into a buffer capped at [`MAX_ERROR_MESSAGE_LEN`]; longer messages
/// are truncated on a character boundary, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRecord {
    code: i32,
    message: String,
    size: usize,
}

impl ErrorRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the record to code 0 and an empty message.
    pub fn reset(&mut self) {
        self.code = 0;
        self.message.clear();
        self.size = 0;
    }

    /// Records `code` and the formatted message.
    ///
    /// The message is formatted completely before the record is touched, so
    /// the record never holds a code from one call and a message from another.
    pub fn set(&mut self, code: i32, args: fmt::Arguments<'_>) {
        let mut writer = BoundedWriter::new(MAX_ERROR_MESSAGE_LEN - 1);
        // A failing Display impl leaves whatever was written so far.
        let _ = writer.write_fmt(args);
        let message = writer.into_inner();

        self.size = message.len();
        self.message = message;
        self.code = code;
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Length in bytes of the stored message.
    pub fn size(&self) -> usize {
        self.size
    }

    /// True once a failure has been recorded.
    pub fn is_set(&self) -> bool {
        self.code != 0
    }

    /// Renders the record as `{"message": ..., "code": ...}`.
    pub fn to_json(&self) -> Value {
        json!({
            keys::MESSAGE: self.message,
            keys::CODE: self.code,
        })
    }
}

impl From<&MetaError> for ErrorRecord {
    fn from(err: &MetaError) -> Self {
        let mut record = Self::new();
        record.set(err.code(), format_args!("{err}"));
        record
    }
}

impl From<MetaError> for ErrorRecord {
    fn from(err: MetaError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Embeds `error` under the `"error"` key of `target`.
///
/// `target` must be a JSON object; any previous `"error"` value is replaced.
pub fn add_error_value(target: &mut Value, error: &ErrorRecord) -> MetaResult<()> {
    let object = target.as_object_mut().ok_or_else(|| MetaError::InvalidType {
        field: "target".to_string(),
        expected: "object",
    })?;
    object.insert(keys::ERROR.to_string(), error.to_json());
    Ok(())
}

/// `fmt::Write` sink that silently drops output past its capacity.
struct BoundedWriter {
    buf: String,
    capacity: usize,
}

impl BoundedWriter {
    fn new(capacity: usize) -> Self {
        Self {
            buf: String::new(),
            capacity,
        }
    }

    fn into_inner(self) -> String {
        self.buf
    }
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
        } else {
            let mut end = room;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.buf.push_str(&s[..end]);
        }
        Ok(())
    }
}
