// ABOUTME: Line-oriented editing of the SSH client config file.
// ABOUTME: Pure functions to find/remove Host blocks plus append/remove on disk.

use crate::error::{ConfigError, Result};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A `Host` block pointing an alias at a deploy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub alias: String,
    pub hostname: String,
    pub user: String,
    pub identity_file: PathBuf,
}

impl HostEntry {
    /// Entry for the hosting service's `git` user.
    pub fn new(
        alias: impl Into<String>,
        hostname: impl Into<String>,
        identity_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            alias: alias.into(),
            hostname: hostname.into(),
            user: "git".to_string(),
            identity_file: identity_file.into(),
        }
    }
}

/// Split `content` on `\n`. Joining the result with `\n` reproduces it; text
/// ending in `\n` yields an empty last line.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Host patterns on a `Host` header line, or `None` if `line` is not one.
///
/// The keyword is matched case-insensitively and must be followed by
/// whitespace, so `HostName` lines are not headers.
fn host_patterns(line: &str) -> Option<std::str::SplitWhitespace<'_>> {
    let trimmed = line.trim();
    let keyword = trimmed.get(..4)?;
    let rest = &trimmed[4..];
    if !keyword.eq_ignore_ascii_case("host") || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.split_whitespace())
}

/// Whether `line` starts a new `Host` block.
pub fn is_host_header(line: &str) -> bool {
    host_patterns(line).is_some()
}

/// Whether `line` is a `Host` header listing `alias` as one of its patterns.
pub fn names_alias(line: &str, alias: &str) -> bool {
    host_patterns(line)
        .map(|mut patterns| patterns.any(|p| p == alias))
        .unwrap_or(false)
}

/// Index range of the first block for `alias`: from its header up to (not
/// including) the next `Host` header, or to the end.
pub fn find_host_block(lines: &[&str], alias: &str) -> Option<Range<usize>> {
    let start = lines.iter().position(|line| names_alias(line, alias))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| is_host_header(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    Some(start..end)
}

/// Drop every block for `alias`, keeping all other lines verbatim and in order.
pub fn remove_host_block<'a>(lines: &[&'a str], alias: &str) -> Vec<&'a str> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut in_block = false;
    for &line in lines {
        if is_host_header(line) {
            in_block = names_alias(line, alias);
        }
        if !in_block {
            kept.push(line);
        }
    }
    kept
}

/// Render `entry` as a tab-indented block.
pub fn render_host_block(entry: &HostEntry) -> String {
    format!(
        "Host {}\n\tHostName {}\n\tUser {}\n\tIdentityFile {}\n\tIdentitiesOnly yes\n",
        entry.alias,
        entry.hostname,
        entry.user,
        entry.identity_file.display()
    )
}

/// The text appended to the config for `entry`: a newline, then the block.
///
/// The leading newline ends whatever line was last. Removing a block that runs
/// to the end of the file drops the empty line after its final `\n`, so
/// append followed by remove is byte-identical with or without a trailing
/// newline in the original file.
pub fn append_text(entry: &HostEntry) -> String {
    format!("\n{}", render_host_block(entry))
}

/// The SSH client config file (usually `~/.ssh/config`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfig {
    path: PathBuf,
}

impl SshConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// File contents, or `None` if the file does not exist.
    pub fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Whether any `Host` line names `alias`.
    pub fn contains_entry(&self, alias: &str) -> Result<bool> {
        Ok(self
            .read()?
            .is_some_and(|content| content.lines().any(|line| names_alias(line, alias))))
    }

    /// Append a block for `entry`, creating the file if needed.
    ///
    /// # Errors
    /// Returns `ConfigError::EntryExists` (leaving the file untouched) if the
    /// alias is already configured, or an I/O variant if reading or writing fails.
    pub fn add_entry(&self, entry: &HostEntry) -> Result<()> {
        let content = self.read()?.unwrap_or_default();
        if content.lines().any(|line| names_alias(line, &entry.alias)) {
            return Err(ConfigError::EntryExists {
                alias: entry.alias.clone(),
                path: self.path.clone(),
            });
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut options = std::fs::OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let text = append_text(entry);
        options
            .open(&self.path)
            .and_then(|mut file| file.write_all(text.as_bytes()))
            .map_err(|e| ConfigError::Write {
                path: self.path.clone(),
                source: e,
            })?;

        debug!(alias = %entry.alias, path = %self.path.display(), "appended SSH config entry");
        Ok(())
    }

    /// Remove every block for `alias`.
    ///
    /// Returns `Ok(false)` without touching anything when the file is missing
    /// or has no such block.
    pub fn remove_entry(&self, alias: &str) -> Result<bool> {
        let Some(content) = self.read()? else {
            return Ok(false);
        };

        let lines = split_lines(&content);
        if find_host_block(&lines, alias).is_none() {
            return Ok(false);
        }

        let kept = remove_host_block(&lines, alias).join("\n");
        std::fs::write(&self.path, kept).map_err(|e| ConfigError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(alias, path = %self.path.display(), "removed SSH config entry");
        Ok(true)
    }
}
