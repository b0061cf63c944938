// ABOUTME: Error types for repository names and SSH config editing.
// ABOUTME: Typed so callers can tell a duplicate entry apart from an I/O failure.

use std::path::PathBuf;
use thiserror::Error;

/// A repository name that cannot be used in key file names or host aliases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoNameError {
    #[error("Invalid repository name")]
    Empty,

    #[error("Repository name contains invalid characters: {0:?}")]
    InvalidCharacter(char),
}

/// Errors from reading, editing, or backing up the SSH config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A `Host` block for this alias is already present.
    #[error("SSH config entry for Host {alias} already exists in {path}")]
    EntryExists { alias: String, path: PathBuf },

    #[error("failed to read SSH config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write SSH config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
