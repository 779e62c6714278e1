//! Error types for release publishing operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release publishing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for a single remote API call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// HTTP status the remote uses for validation failures.
pub const STATUS_UNPROCESSABLE: u16 = 422;

/// HTTP status the remote uses for missing resources.
pub const STATUS_NOT_FOUND: u16 = 404;

/// A failed call against the remote API.
///
/// `status` is `None` when the request never produced a response
/// (connection refused, TLS failure, timeout, undecodable body).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.status, .message))]
pub struct ApiError {
    /// HTTP status code of the response, if one was received
    pub status: Option<u16>,
    /// Message reported by the remote or the transport
    pub message: String,
    /// Request-correlation id reported by the remote
    pub request_id: Option<String>,
}

impl ApiError {
    /// Creates an error for a response with the given status.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            request_id: None,
        }
    }

    /// Creates an error for a request that never got a response.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            request_id: None,
        }
    }

    /// Attaches the remote's request-correlation id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Whether the remote reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(STATUS_NOT_FOUND)
    }

    /// Whether the remote rejected the request as unprocessable.
    #[must_use]
    pub fn is_unprocessable(&self) -> bool {
        self.status == Some(STATUS_UNPROCESSABLE)
    }
}

#[allow(clippy::ref_option)]
fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP {status}: {message}"),
        None => message.to_string(),
    }
}

/// Errors that can occur while publishing a release.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A remote call failed and the operation cannot continue.
    #[error("{operation}: {source}")]
    #[diagnostic(code(forgepub::release::api))]
    Api {
        /// What was being attempted, including repo/path/tag context
        operation: String,
        /// The underlying remote failure
        #[source]
        source: ApiError,
    },

    /// A failure that may succeed if the whole operation is attempted again.
    #[error("retriable failure: {source}")]
    #[diagnostic(
        code(forgepub::release::retriable),
        help("The operation can be retried as a whole")
    )]
    Retriable {
        /// The underlying remote failure
        #[source]
        source: ApiError,
    },

    /// No milestone with the requested title exists.
    #[error("no milestone found: {title}")]
    #[diagnostic(
        code(forgepub::release::no_milestone),
        help("Check the milestone title, only open milestones are considered")
    )]
    NoMilestoneFound {
        /// The title that was looked up
        title: String,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    #[diagnostic(code(forgepub::release::cancelled))]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(forgepub::release::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// A template could not be rendered.
    #[error("templating {template:?}: {message}")]
    #[diagnostic(code(forgepub::release::template))]
    Template {
        /// The template source
        template: String,
        /// The error message
        message: String,
    },

    /// A release identifier did not hold a numeric id.
    #[error("invalid release id: {id:?}")]
    #[diagnostic(code(forgepub::release::release_id))]
    InvalidReleaseId {
        /// The identifier that failed to parse
        id: String,
    },

    /// An artifact could not be read for upload.
    #[error("artifact error: {message}")]
    #[diagnostic(
        code(forgepub::release::artifact),
        help("Check that the artifact exists and is readable")
    )]
    Artifact {
        /// The error message
        message: String,
        /// The path that caused the error
        path: Option<PathBuf>,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(forgepub::release::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new API error with operation context.
    #[must_use]
    pub fn api(operation: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            operation: operation.into(),
            source,
        }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new template error.
    #[must_use]
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a new artifact error.
    #[must_use]
    pub fn artifact(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Artifact {
            message: message.into(),
            path,
        }
    }

    /// Whether an external retry policy may attempt the whole operation again.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Retriable { .. })
    }

    /// The remote failure behind this error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } | Self::Retriable { source } => Some(source),
            _ => None,
        }
    }
}
