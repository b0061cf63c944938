// ABOUTME: Timestamped snapshots of the SSH config before it is edited.
// ABOUTME: Copies byte-for-byte to <path>.backup.<UTC timestamp> without clobbering.

use crate::error::{ConfigError, Result};
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sortable, microsecond-resolution UTC timestamp used in backup names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.6fZ";

/// Give up looking for a free name after this many collisions.
const MAX_ATTEMPTS: u32 = 100;

/// `<path>.backup.<timestamp>` for the given instant.
pub fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup.");
    name.push(now.format(TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Copy `path` to a fresh backup file next to it and return the backup's path.
///
/// # Errors
/// Returns `ConfigError::Read` if the source cannot be read, or
/// `ConfigError::Backup` if no backup file could be written.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    backup_file_at(path, Utc::now())
}

/// [`backup_file`] with an explicit timestamp.
///
/// If the timestamped name is taken, `-1`, `-2`, ... is appended until a free
/// name is found; an existing file is never overwritten.
pub fn backup_file_at(path: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    let contents = std::fs::read(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let base = backup_path(path, now);
    let mut attempt = 0;
    loop {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            let mut name = OsString::from(base.as_os_str());
            name.push(format!("-{attempt}"));
            PathBuf::from(name)
        };

        match create_new(&candidate) {
            Ok(mut file) => {
                file.write_all(&contents).map_err(|e| ConfigError::Backup {
                    path: path.to_path_buf(),
                    backup: candidate.clone(),
                    source: e,
                })?;
                debug!(backup = %candidate.display(), "backed up SSH config");
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < MAX_ATTEMPTS => {
                attempt += 1;
            }
            Err(e) => {
                return Err(ConfigError::Backup {
                    path: path.to_path_buf(),
                    backup: candidate,
                    source: e,
                });
            }
        }
    }
}

fn create_new(path: &Path) -> std::io::Result<std::fs::File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_backup_path_format() {
        assert_eq!(
            backup_path(Path::new("/home/me/.ssh/config"), instant()),
            PathBuf::from("/home/me/.ssh/config.backup.20261018T090507.000000Z")
        );
    }

    #[test]
    fn test_backup_names_sort_chronologically() {
        let earlier = backup_path(Path::new("config"), instant());
        let later = backup_path(Path::new("config"), instant() + chrono::Duration::microseconds(1));
        assert!(earlier < later);
    }

    #[test]
    fn test_backup_is_byte_identical() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        let original = b"Host A\n\tUser git\r\n\xe2\x9c\x93 trailing";
        std::fs::write(&path, original).unwrap();

        let backup = backup_file(&path).expect("should back up");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("config.backup."));
        assert_eq!(std::fs::read(&backup).unwrap(), original);
    }

    #[test]
    fn test_backup_does_not_clobber_existing() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        std::fs::write(&path, "new").unwrap();
        let taken = backup_path(&path, instant());
        std::fs::write(&taken, "older backup").unwrap();

        let backup = backup_file_at(&path, instant()).expect("should back up");
        assert_ne!(backup, taken);
        assert!(backup.to_string_lossy().ends_with("Z-1"));
        assert_eq!(std::fs::read_to_string(&taken).unwrap(), "older backup");
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "new");
    }

    #[test]
    fn test_backup_missing_source_fails() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let err = backup_file(&temp_dir.path().join("config")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
