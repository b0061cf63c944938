// ABOUTME: Error types for deploy key operations using thiserror.
// ABOUTME: Provides typed errors for key generation, encoding, and agent calls.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during deploy key operations.
#[derive(Error, Debug)]
pub enum SshError {
    /// Failed to read a key file from disk.
    #[error("failed to read SSH key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a key file to disk.
    #[error("failed to write key to {path}: {source}")]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a key file before regenerating it.
    #[error("failed to remove key at {path}: {source}")]
    RemoveKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set file permissions.
    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS random number generator failed.
    #[error("failed to gather randomness for key generation: {0}")]
    Random(#[source] rand::Error),

    /// Failed to parse a public key line.
    #[error("failed to parse public key: {0}")]
    ParsePublicKey(#[source] ssh_key::Error),

    /// Unsupported key type for the requested operation.
    #[error("unsupported key type: {0} (only ed25519 is supported)")]
    UnsupportedKeyType(String),

    /// An external program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran but reported failure.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// An external program succeeded but printed something we cannot use.
    #[error("unexpected output from {program}: {output:?}")]
    UnexpectedOutput { program: String, output: String },

    /// No ssh-agent answered the probe.
    #[error("ssh-agent is not reachable: {0}")]
    AgentUnreachable(String),
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;
