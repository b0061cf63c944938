// ABOUTME: Validated repository names and the key file paths derived from them.
// ABOUTME: Names become file names and host aliases, so separators and spaces are rejected.

use crate::error::RepoNameError;
use deploy_key_ssh::{public_key_path, KEY_FILE_SUFFIX};
use std::fmt;
use std::path::{Path, PathBuf};

/// Characters that would break a file name or an SSH host alias.
const FORBIDDEN: [char; 3] = ['/', '\\', ' '];

/// A repository name safe to embed in `<repo>_deploy-key` and `github-<repo>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName(String);

impl RepoName {
    /// Validate trimmed user input.
    ///
    /// # Errors
    /// Returns `RepoNameError::Empty` for blank input, or
    /// `RepoNameError::InvalidCharacter` for the first `/`, `\`, or space.
    pub fn parse(input: &str) -> Result<Self, RepoNameError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(RepoNameError::Empty);
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c)) {
            return Err(RepoNameError::InvalidCharacter(c));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<repo>_deploy-key`
    pub fn key_file_name(&self) -> String {
        format!("{}{KEY_FILE_SUFFIX}", self.0)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locations of a repository's key pair inside a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl KeyPaths {
    pub fn new(dir: &Path, repo: &RepoName) -> Self {
        let private_key = dir.join(repo.key_file_name());
        Self {
            public_key: public_key_path(&private_key),
            private_key,
        }
    }

    /// Whether either file is already present.
    pub fn any_exists(&self) -> bool {
        self.private_key.exists() || self.public_key.exists()
    }
}
