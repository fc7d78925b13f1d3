//! Error types shared across the workspace
//!
//! Every operation surfaces the most specific kind available; nothing is
//! retried and nothing is swallowed except the expiry sweep's per-object
//! failures, which are collected into its report.

use thiserror::Error;

/// Result alias used throughout bkt
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for local I/O, remote storage calls, and configuration
#[derive(Debug, Error)]
pub enum Error {
    /// Local filesystem failure (open, create, read, write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote read stream could not be opened or drained
    #[error("remote read failed: {0}")]
    RemoteRead(String),

    /// Remote write or its finalization failed
    #[error("remote write failed: {0}")]
    RemoteWrite(String),

    /// Remote delete call failed
    #[error("remote delete failed: {0}")]
    RemoteDelete(String),

    /// Listing pages could not be pulled to completion
    #[error("remote list failed: {0}")]
    RemoteList(String),

    /// Bucket creation call failed
    #[error("remote create failed: {0}")]
    RemoteCreate(String),

    /// Bucket attribute update failed
    #[error("remote update failed: {0}")]
    RemoteUpdate(String),

    /// Object or bucket does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Bucket with the bound name already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Bucket still contains objects and cannot be deleted
    #[error("bucket not empty: {0}")]
    NotEmpty(String),

    /// The invocation deadline elapsed mid-operation
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Configuration file is missing, unreadable, or invalid
    #[error("config error: {0}")]
    Config(String),

    /// Named profile is not present in the config file
    #[error("profile not found: {0}")]
    ProfileNotFound(String),
}

impl Error {
    /// True for errors caused by an absent object or bucket
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the invocation deadline expired
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = Error::RemoteWrite("stream closed early".to_string());
        assert_eq!(err.to_string(), "remote write failed: stream closed early");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        // An absent local file is an I/O error, not a remote NotFound
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_classification_helpers() {
        assert!(Error::NotFound("key".to_string()).is_not_found());
        assert!(Error::Cancelled("deadline".to_string()).is_cancelled());
        assert!(!Error::RemoteRead("x".to_string()).is_cancelled());
    }
}
