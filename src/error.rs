//! Error types for runtime management.
//!
//! This module defines [`RuntimeError`], the error type used throughout the
//! crate, and a [`Result`] alias.
//!
//! # Error Handling Strategy
//!
//! - Every failure kind the CLI must tell apart has its own variant and
//!   its own exit code (see [`RuntimeError::exit_code`])
//! - Per-version failures of a batch are gathered in
//!   [`RuntimeError::PartialFailure`]
//! - Use `anyhow::Error` (via `RuntimeError::Other`) for unexpected errors

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error type for MATLAB Runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The running OS is not Windows, Linux or macOS.
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// Requested version is neither in the catalog nor installed.
    #[error("Unknown MATLAB Runtime version '{version}': {message}")]
    UnknownVersion { version: String, message: String },

    /// The user declined a required confirmation.
    #[error("Aborted by user: {question}")]
    UserInterruption { question: String },

    /// Insufficient privileges for a filesystem or installer operation.
    #[error("Permission denied for {path}: {message}")]
    PermissionDenied { path: PathBuf, message: String },

    /// The requested runtime is not installed and installation was not allowed.
    #[error("MATLAB Runtime {release} is not installed under {prefix}")]
    RuntimeNotFound { release: String, prefix: PathBuf },

    /// A deployed package cannot be loaded in this process.
    #[error("Cannot load deployed package '{package}': {message}")]
    DeploymentLoad { package: String, message: String },

    /// Some versions of a batch failed.
    #[error("{}", describe_failures(.failures))]
    PartialFailure {
        failures: Vec<VersionFailure>,
        succeeded: Vec<String>,
    },

    /// Installer payload could not be downloaded.
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// The platform installer or uninstaller did not complete.
    #[error("Installer failed: {message}")]
    InstallerFailed { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single version that failed inside a batch install or uninstall.
#[derive(Debug)]
pub struct VersionFailure {
    /// Release name, e.g. `R2024b`.
    pub release: String,
    /// What went wrong.
    pub error: RuntimeError,
}

impl RuntimeError {
    /// Wrap an IO error raised while touching `path`.
    ///
    /// Permission problems become [`RuntimeError::PermissionDenied`] so the
    /// caller can tell the user to rerun with the right privileges.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        } else {
            Self::Io(io::Error::new(
                err.kind(),
                format!("{}: {}", path.display(), err),
            ))
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnsupportedPlatform { .. } => 2,
            Self::UnknownVersion { .. } => 3,
            Self::UserInterruption { .. } => 4,
            Self::PermissionDenied { .. } => 5,
            Self::RuntimeNotFound { .. } => 6,
            Self::DeploymentLoad { .. } => 7,
            Self::PartialFailure { .. } => 8,
            Self::Download { .. } => 9,
            Self::InstallerFailed { .. } => 10,
            Self::Io(_) | Self::Other(_) => 1,
        }
    }
}

fn describe_failures(failures: &[VersionFailure]) -> String {
    let mut out = format!("{} version(s) failed:", failures.len());
    for failure in failures {
        let _ = write!(out, "\n  {}: {}", failure.release, failure.error);
    }
    out
}

/// Result type alias for MATLAB Runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_version_displays_token() {
        let err = RuntimeError::UnknownVersion {
            version: "R1999z".into(),
            message: "not a release name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("R1999z"));
        assert!(msg.contains("not a release name"));
    }

    #[test]
    fn runtime_not_found_displays_release_and_prefix() {
        let err = RuntimeError::RuntimeNotFound {
            release: "R2024b".into(),
            prefix: PathBuf::from("/opt/mcr"),
        };
        let msg = err.to_string();
        assert!(msg.contains("R2024b"));
        assert!(msg.contains("/opt/mcr"));
    }

    #[test]
    fn partial_failure_lists_every_version() {
        let err = RuntimeError::PartialFailure {
            failures: vec![
                VersionFailure {
                    release: "R2022b".into(),
                    error: RuntimeError::InstallerFailed {
                        message: "exit code 1".into(),
                    },
                },
                VersionFailure {
                    release: "R2023a".into(),
                    error: RuntimeError::Download {
                        url: "https://example.com/x.zip".into(),
                        message: "HTTP 404".into(),
                    },
                },
            ],
            succeeded: vec!["R2024b".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 version(s) failed"));
        assert!(msg.contains("R2022b: Installer failed: exit code 1"));
        assert!(msg.contains("R2023a"));
        assert!(msg.contains("HTTP 404"));
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            RuntimeError::UnsupportedPlatform {
                platform: "plan9".into(),
            },
            RuntimeError::UnknownVersion {
                version: "x".into(),
                message: String::new(),
            },
            RuntimeError::UserInterruption {
                question: "?".into(),
            },
            RuntimeError::PermissionDenied {
                path: PathBuf::from("/"),
                message: String::new(),
            },
            RuntimeError::RuntimeNotFound {
                release: "R2024b".into(),
                prefix: PathBuf::from("/"),
            },
            RuntimeError::DeploymentLoad {
                package: "p".into(),
                message: String::new(),
            },
            RuntimeError::PartialFailure {
                failures: vec![],
                succeeded: vec![],
            },
            RuntimeError::Download {
                url: String::new(),
                message: String::new(),
            },
            RuntimeError::InstallerFailed {
                message: String::new(),
            },
        ];
        let mut codes: Vec<u8> = errors.iter().map(RuntimeError::exit_code).collect();
        assert!(codes.iter().all(|&c| c > 1));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn from_io_maps_permission_denied() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = RuntimeError::from_io(io_err, Path::new("/usr/local/MATLAB"));
        assert!(matches!(err, RuntimeError::PermissionDenied { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn from_io_keeps_other_kinds_with_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = RuntimeError::from_io(io_err, Path::new("/tmp/x"));
        assert!(matches!(err, RuntimeError::Io(_)));
        assert!(err.to_string().contains("/tmp/x"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let err: RuntimeError = io_err.into();
        assert!(matches!(err, RuntimeError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
