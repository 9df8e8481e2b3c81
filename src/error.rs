//! Error types for manifest loading and checker execution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading, or tokenizing a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("AndroidManifest.xml not found in {}", root.display())]
    NotFound { root: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest at line {line} (offset {offset}): {message}")]
    Malformed {
        line: u32,
        offset: usize,
        message: String,
    },
}

/// Errors returned by [`Checker::execute`](crate::checker::Checker::execute).
///
/// They are recorded on the checker's entry in the scan result and never
/// abort the scan.
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Checker failed: {0}")]
    Execution(String),
}

impl CheckerError {
    /// Short code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            CheckerError::Manifest(ManifestError::NotFound { .. }) => "DOCUMENT_NOT_FOUND",
            CheckerError::Manifest(ManifestError::Io { .. }) => "IO_ERROR",
            CheckerError::Manifest(ManifestError::Malformed { .. }) => "MALFORMED_DOCUMENT",
            CheckerError::Execution(_) => "CHECKER_EXECUTION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::NotFound {
            root: PathBuf::from("/tmp/app"),
        };
        assert_eq!(err.to_string(), "AndroidManifest.xml not found in /tmp/app");

        let err = ManifestError::Malformed {
            line: 4,
            offset: 120,
            message: "unexpected end of input".to_string(),
        };
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_checker_error_code() {
        let err: CheckerError = ManifestError::NotFound {
            root: PathBuf::from("."),
        }
        .into();
        assert_eq!(err.code(), "DOCUMENT_NOT_FOUND");
        assert_eq!(CheckerError::Execution("boom".into()).code(), "CHECKER_EXECUTION");
    }
}
