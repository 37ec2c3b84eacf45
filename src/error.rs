//! Custom error types for patchdemo.
//!
//! Only conditions that stop a run live here. Conflicts and unexpected test
//! outcomes are ordinary results carried by [`crate::orchestrator::RunSummary`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for demo orchestration
#[derive(Error, Debug)]
pub enum DemoError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Patch file referenced by the registry does not exist
    #[error("Patch file not found: {path}")]
    MissingPatch { id: String, path: PathBuf },

    /// No registry entry with the given id
    #[error("Unknown patch id '{id}' (known: {known})")]
    UnknownPatch { id: String, known: String },

    /// Feature-only operation asked to apply a bug patch
    #[error("Patch '{id}' is a bug, not a feature")]
    NotAFeature { id: String },

    /// Working tree has relevant uncommitted changes
    #[error("Working directory has {} uncommitted change(s)", .changes.len())]
    DirtyTree { changes: Vec<String> },

    // =========================================================================
    // Patch Errors
    // =========================================================================
    /// Patch cannot be applied against the current tree
    #[error("Patch '{id}' conflicts with the current code")]
    Conflict { id: String },

    /// The real apply failed after a successful dry run
    #[error("Failed to apply patch '{id}': {message}")]
    ApplyFailed { id: String, message: String },

    /// The real reverse failed after a successful dry run
    #[error("Failed to reverse patch '{id}': {message}")]
    ReverseFailed { id: String, message: String },

    // =========================================================================
    // Tool Errors
    // =========================================================================
    /// Missing required tool
    #[error("Missing required tool: {tool}")]
    MissingTool { tool: String },

    /// Git operation failed
    #[error("Git operation failed: {operation} - {message}")]
    Git { operation: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML parse error wrapper
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DemoError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a git error
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a missing patch error
    pub fn missing_patch(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingPatch {
            id: id.into(),
            path: path.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error is a configuration problem the operator must fix
    /// before any patch can be touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidConfig { .. }
                | Self::MissingPatch { .. }
                | Self::UnknownPatch { .. }
                | Self::NotAFeature { .. }
                | Self::DirtyTree { .. }
                | Self::Toml(_)
        )
    }

    /// Check if the working tree may have been left half-modified.
    pub fn requires_manual_restore(&self) -> bool {
        matches!(self, Self::ApplyFailed { .. } | Self::ReverseFailed { .. })
    }

    /// Get error code for exit status
    ///
    /// Every fatal condition maps to 1; scripts only distinguish success from
    /// failure.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Recovery hint shown under the error line, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DirtyTree { .. } => Some(
                "Please commit or stash changes first. This ensures patches can be cleanly applied and reversed.",
            ),
            Self::ApplyFailed { .. } | Self::ReverseFailed { .. } => {
                Some("You may need to manually restore with: git checkout -- <file>")
            }
            Self::Conflict { .. } => {
                Some("The patch may be outdated or another change conflicts.")
            }
            Self::MissingTool { .. } => Some("Install git and make sure it is on PATH."),
            _ => None,
        }
    }
}

/// Type alias for demo results
pub type Result<T> = std::result::Result<T, DemoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemoError::DirtyTree {
            changes: vec![" M src/app.js".into(), " M src/store.js".into()],
        };
        assert!(err.to_string().contains("2 uncommitted"));
    }

    #[test]
    fn test_missing_patch_display() {
        let err = DemoError::missing_patch("bug-01", "scripts/patches/demo-01.patch");
        assert!(err.to_string().contains("scripts/patches/demo-01.patch"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_is_configuration() {
        assert!(DemoError::config("bad").is_configuration());
        assert!(DemoError::DirtyTree { changes: vec![] }.is_configuration());
        assert!(!DemoError::git("status", "not a repository").is_configuration());
        assert!(!DemoError::Conflict { id: "bug-01".into() }.is_configuration());
    }

    #[test]
    fn test_requires_manual_restore() {
        let err = DemoError::ReverseFailed {
            id: "bug-02".into(),
            message: "hunk failed".into(),
        };
        assert!(err.requires_manual_restore());
        assert!(err.hint().unwrap().contains("git checkout"));
        assert!(!DemoError::config("x").requires_manual_restore());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DemoError::config("test").exit_code(), 1);
        assert_eq!(
            DemoError::MissingTool { tool: "git".into() }.exit_code(),
            1
        );
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/test/.patchdemo.toml");
        let err = DemoError::config_with_path("failed to parse", path.clone());
        if let DemoError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_git_error() {
        let err = DemoError::git("status", "not a git repository");
        if let DemoError::Git { operation, message } = err {
            assert_eq!(operation, "status");
            assert_eq!(message, "not a git repository");
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: DemoError = io_err.into();
        assert!(matches!(err, DemoError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
