//! Error types for the tanzu-config library.
//!
//! Every store operation reports failures through [`Error`]. Callers that need
//! to tell "absent" apart from "present but empty" match on
//! [`Error::NotFound`] (or use [`Error::is_not_found`]) instead of relying on
//! default values.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a tanzu-config error.
///
/// # Examples
///
/// ```
/// use tanzu_config::{Error, Result};
///
/// fn example_operation() -> Result<String> {
///     Ok("my-context".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tanzu-config library.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested entity, pointer or metadata key does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Description of what was looked up.
        resource: String,
    },

    /// The operation was invoked on an entity of the wrong kind.
    #[error("{entity} must be of type: {expected}")]
    Type {
        /// The kind of entity that was inspected ("context" or "server").
        entity: String,
        /// The kind the operation requires.
        expected: String,
    },

    /// A uniqueness or consistency invariant was violated.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A required nested structure is absent on an otherwise valid entity.
    #[error("{entity} is missing the {what}")]
    MissingMetadata {
        /// The entity that lacks the structure, e.g. "context".
        entity: String,
        /// What is missing, e.g. "Tanzu metadata".
        what: String,
    },

    /// The configuration file lock could not be acquired in time.
    #[error("timed out acquiring lock {} after {seconds:.2}s", path.display())]
    LockTimeout {
        /// The lock file that was contended.
        path: PathBuf,
        /// Seconds waited before giving up.
        seconds: f64,
    },

    /// An external command exited unsuccessfully.
    #[error("command '{command}' failed ({status}): {output}")]
    Subprocess {
        /// The command line that was run.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stdout and stderr of the command.
        output: String,
    },

    /// An invalid filesystem path was provided or could not be read.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why the path could not be used.
        reason: String,
    },

    /// The YAML codec rejected a document.
    #[error("configuration codec error: {0}")]
    Codec(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on the given resource description.
    pub(crate) fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if error indicates an absent entity or metadata key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tanzu_config::Error;
    ///
    /// let err = Error::NotFound { resource: "context dev".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error is a wrong-kind error.
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type { .. })
    }

    /// Check if error is a lock timeout.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}
