// ABOUTME: SSH public key fingerprint computation.
// ABOUTME: Produces the SHA256:<base64> form printed by ssh-add -l and ssh-keygen -l.

use crate::encode::parse_public_key_line;
use crate::error::{Result, SshError};
use ssh_key::{Algorithm, HashAlg, PublicKey};
use std::path::Path;

/// Compute the OpenSSH SHA256 fingerprint of a public key.
///
/// `SHA256:` plus unpadded base64 of the hashed wire blob, the string
/// `ssh-add -l` lists, so it can be matched against agent output directly.
///
/// # Errors
/// Returns `SshError::UnsupportedKeyType` for non-ed25519 keys.
pub fn compute_fingerprint(public_key: &PublicKey) -> Result<String> {
    let algorithm = public_key.algorithm();
    if algorithm != Algorithm::Ed25519 {
        return Err(SshError::UnsupportedKeyType(algorithm.to_string()));
    }
    Ok(public_key.fingerprint(HashAlg::Sha256).to_string())
}

/// Read a `.pub` file and compute its fingerprint.
///
/// # Errors
/// Returns an error if the file cannot be read or does not hold an ed25519 key.
pub fn fingerprint_public_key_file(path: &Path) -> Result<String> {
    let line = std::fs::read_to_string(path).map_err(|e| SshError::ReadKey {
        path: path.to_path_buf(),
        source: e,
    })?;
    compute_fingerprint(&parse_public_key_line(&line)?)
}
