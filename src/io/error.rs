use lodrust_files::ParserError;
use thiserror::Error;

use crate::io::common::resource_id::ResourceIdentifier;

/// Failures at the resource boundary. Everything but `PreconditionViolated` is a normal outcome when
/// assets are missing or broken (which happens a lot with mods) and is meant to be degraded
/// gracefully.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{what} was not found")]
    NotFound { what: String },

    #[error("{what} is corrupt: {reason}")]
    Corrupt { what: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A programming error on the caller's side, e.g. asking whether a cache entry is unique
    /// when it isn't even alive.
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
}

impl ResourceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ResourceError::NotFound { what: what.into() }
    }

    pub fn unknown_identifier(identifier: &ResourceIdentifier) -> Self {
        ResourceError::NotFound {
            what: identifier.to_string(),
        }
    }

    pub fn corrupt(what: impl Into<String>, reason: impl ToString) -> Self {
        ResourceError::Corrupt {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// Attaches the resource name to errors coming out of the parsers, which don't know about it.
    pub fn from_parser(what: impl Into<String>, error: ParserError) -> Self {
        match error {
            ParserError::FrameNotFound { .. } => ResourceError::NotFound {
                what: format!("{} ({})", what.into(), error),
            },
            ParserError::IOError(inner) => Self::from_io(what, inner),
            other => Self::corrupt(what, other),
        }
    }

    pub fn from_io(what: impl Into<String>, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound { what: what.into() },
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => Self::corrupt(what, error),
            _ => ResourceError::Io(error),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }

    #[inline]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ResourceError::Corrupt { .. })
    }
}
