//! # Error Module
//!
//! Error types for the near-duplicate finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Two recovery classes** - a file that fails to decode is skipped and
//!   the run continues; a directory that cannot be listed aborts the run
//! - **Include context** - paths and what went wrong
//! - **User-friendly messages** - surfaced directly by the CLI

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum NearDupeError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that abort a run: the input directory cannot be enumerated.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run was cancelled")]
    Cancelled,
}

/// Errors local to one file: the file is skipped, the run continues.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SignatureError {
    /// The file this error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            SignatureError::Decode { path, .. } => path,
            SignatureError::Io { path, .. } => path,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, NearDupeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn signature_error_includes_path_and_reason() {
        let error = SignatureError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn signature_error_exposes_path() {
        let error = SignatureError::Decode {
            path: PathBuf::from("/photos/a.png"),
            reason: "truncated".to_string(),
        };
        assert_eq!(error.path(), &PathBuf::from("/photos/a.png"));
    }

    #[test]
    fn scan_error_converts_to_top_level() {
        let error: NearDupeError = ScanError::Cancelled.into();
        assert!(matches!(error, NearDupeError::Scan(ScanError::Cancelled)));
    }
}
