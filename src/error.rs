//! # Error Handling System
//!
//! Hierarchical error types for the banner capture pipeline, with rich
//! context and classification traits.
//!
//! ## Architecture
//!
//! - **`SnapshotError`**: one variant per pipeline stage (config, decode,
//!   detection, processing, encode, I/O, sink delivery)
//! - **`ErrorContext`**: metadata attached to every error — operation,
//!   recovery suggestion, severity, retry/recovery classification
//! - **Classification traits**: `Retryable`, `Recoverable`, `HasSeverity`,
//!   `HasRecoverySuggestion` for generic error handling at the call sites
//!
//! Detection failures deserve special mention: the user can fix them (wrong
//! background color, banner not on screen), so they carry an actionable
//! recovery suggestion rather than being retried internally. An encode
//! budget that cannot be met is NOT an error — the search degrades to its
//! best effort and reports the quality it used.

use std::collections::HashMap;
use std::{error::Error as StdError, fmt, time::SystemTime};

use banner_core::buffer::{BufferError, ColorParseError};
use banner_core::crop::CropError;
use banner_core::detect::DetectError;
use banner_core::encode::EncodeError;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational; the operation still produced a result
    Info,
    /// May indicate a problem worth surfacing
    Warning,
    /// The pass failed but the application can continue
    Error,
    /// The pass failed and needs user attention
    Critical,
    /// Cannot continue at all (bad configuration, broken environment)
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed
    pub operation: Option<String>,
    /// Additional free-form context
    pub context: Option<String>,
    /// Suggested user action
    pub recovery_suggestion: Option<String>,
    /// Severity level
    pub severity: ErrorSeverity,
    /// Whether retrying the same call may succeed
    pub retryable: bool,
    /// Whether a fallback strategy exists
    pub recoverable: bool,
    /// Additional key-value metadata
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            retryable: false,
            recoverable: false,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Base error type for the banner capture pipeline
#[derive(Debug)]
pub enum SnapshotError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// The input screenshot could not be decoded
    Decode {
        path: Option<String>,
        reason: String,
        context: ErrorContext,
    },
    /// No banner boundaries could be detected
    Detection {
        reason: String,
        context: ErrorContext,
    },
    /// Coordinate mapping or crop failures
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Image serialization failures
    Encode {
        format: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Output sink delivery failures
    Sink {
        sink: String,
        reason: String,
        context: ErrorContext,
    },
}

/// Convenient alias used throughout the crate
pub type SnapshotResult<T> = Result<T, SnapshotError>;

impl SnapshotError {
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    pub fn decode(path: Option<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path,
            reason: reason.into(),
            context: ErrorContext::new()
                .with_recovery_suggestion("check that the input is a valid PNG or JPEG image"),
        }
    }

    pub fn detection(reason: impl Into<String>) -> Self {
        Self::Detection {
            reason: reason.into(),
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Critical)
                .recoverable()
                .with_recovery_suggestion(
                    "check the background color option, or pass explicit width/height",
                ),
        }
    }

    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn encode(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new().retryable(),
        }
    }

    pub fn io_path(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: Some(path.into()),
            source,
            context: ErrorContext::new().retryable(),
        }
    }

    pub fn sink(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            reason: reason.into(),
            context: ErrorContext::new().retryable(),
        }
    }

    /// Short category tag used in status output and metadata
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Decode { .. } => "decode",
            Self::Detection { .. } => "detection",
            Self::Processing { .. } => "processing",
            Self::Encode { .. } => "encode",
            Self::Io { .. } => "io",
            Self::Sink { .. } => "sink",
        }
    }

    fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Decode { context, .. }
            | Self::Detection { context, .. }
            | Self::Processing { context, .. }
            | Self::Encode { context, .. }
            | Self::Io { context, .. }
            | Self::Sink { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Decode { context, .. }
            | Self::Detection { context, .. }
            | Self::Processing { context, .. }
            | Self::Encode { context, .. }
            | Self::Io { context, .. }
            | Self::Sink { context, .. } => context,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    pub fn retryable(mut self) -> Self {
        self.context_mut().retryable = true;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config {
                field,
                value,
                reason,
                ..
            } => write!(f, "invalid configuration: {field} = '{value}': {reason}"),
            Self::Decode { path, reason, .. } => match path {
                Some(p) => write!(f, "failed to decode screenshot '{p}': {reason}"),
                None => write!(f, "failed to decode screenshot: {reason}"),
            },
            Self::Detection { reason, .. } => write!(f, "{reason}"),
            Self::Processing {
                operation, reason, ..
            } => write!(f, "processing failed during {operation}: {reason}"),
            Self::Encode { format, reason, .. } => {
                write!(f, "failed to encode {format}: {reason}")
            }
            Self::Io {
                operation,
                path,
                source,
                ..
            } => match path {
                Some(p) => write!(f, "I/O error during {operation} on '{p}': {source}"),
                None => write!(f, "I/O error during {operation}: {source}"),
            },
            Self::Sink { sink, reason, .. } => {
                write!(f, "failed to deliver to {sink} sink: {reason}")
            }
        }
    }
}

impl StdError for SnapshotError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors whose severity callers may inspect
pub trait HasSeverity {
    fn severity(&self) -> ErrorSeverity;
}

/// Errors that may succeed if the same call is repeated
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Errors with a fallback strategy available to the caller
pub trait Recoverable {
    fn is_recoverable(&self) -> bool;
}

/// Errors carrying a user-actionable suggestion
pub trait HasRecoverySuggestion {
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasSeverity for SnapshotError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

impl Retryable for SnapshotError {
    fn is_retryable(&self) -> bool {
        self.context().retryable
    }
}

impl Recoverable for SnapshotError {
    fn is_recoverable(&self) -> bool {
        self.context().recoverable
    }
}

impl HasRecoverySuggestion for SnapshotError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<DetectError> for SnapshotError {
    fn from(error: DetectError) -> Self {
        Self::detection(error.to_string())
    }
}

impl From<CropError> for SnapshotError {
    fn from(error: CropError) -> Self {
        Self::processing("crop", error.to_string())
    }
}

impl From<EncodeError> for SnapshotError {
    fn from(error: EncodeError) -> Self {
        Self::encode("image", error.to_string())
    }
}

impl From<BufferError> for SnapshotError {
    fn from(error: BufferError) -> Self {
        Self::processing("buffer", error.to_string())
    }
}

impl From<ColorParseError> for SnapshotError {
    fn from(error: ColorParseError) -> Self {
        let input = error.input.clone();
        Self::config("backgroundColor", input, error.to_string())
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(error: image::ImageError) -> Self {
        Self::decode(None, error.to_string())
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(error: serde_json::Error) -> Self {
        Self::config("options", "<json>", error.to_string())
    }
}
