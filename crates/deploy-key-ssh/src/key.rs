// ABOUTME: Deploy key pair generation and persistence to filesystem.
// ABOUTME: KeyGenerator trait with in-process ed25519 and ssh-keygen implementations.

use crate::encode::{encode_private_key_pem, format_public_key_line};
use crate::error::{Result, SshError};
use ed25519_dalek::SigningKey;
use rand::RngCore;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// File name suffix for deploy keys: `<repo>_deploy-key`.
pub const KEY_FILE_SUFFIX: &str = "_deploy-key";

/// Mode for private key files (rw-------).
pub const PRIVATE_KEY_MODE: u32 = 0o600;

/// Mode for public key files (rw-r--r--).
pub const PUBLIC_KEY_MODE: u32 = 0o644;

/// Mode for a key directory this crate creates (rwx------).
const KEY_DIR_MODE: u32 = 0o700;

/// Path of the public key belonging to `private_key`: the same path with
/// `.pub` appended.
///
/// Unlike `Path::with_extension`, this keeps dots already in the file name
/// (`my.repo_deploy-key` becomes `my.repo_deploy-key.pub`).
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut path = OsString::from(private_key.as_os_str());
    path.push(".pub");
    PathBuf::from(path)
}

/// What to generate and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    /// Destination of the private key; the public key goes next to it.
    pub private_key_path: PathBuf,
    /// Comment placed at the end of the public key line.
    pub comment: String,
}

impl KeyRequest {
    pub fn new(private_key_path: impl Into<PathBuf>, comment: impl Into<String>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            comment: comment.into(),
        }
    }

    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.private_key_path)
    }
}

/// A key pair that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    /// The public key line as written, including its trailing newline.
    pub public_key_line: String,
}

/// Something that can produce a fresh ed25519 deploy key pair on disk.
pub trait KeyGenerator {
    /// Short name for logs and messages.
    fn name(&self) -> &'static str;

    /// Write a new key pair to `request.private_key_path` and its `.pub` sibling,
    /// replacing any files already there.
    ///
    /// # Errors
    /// Returns an error if key generation or any file operation fails.
    fn generate(&self, request: &KeyRequest) -> Result<GeneratedKey>;
}

/// Generates keys in-process with `ed25519-dalek` and encodes them by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Generator;

impl KeyGenerator for Ed25519Generator {
    fn name(&self) -> &'static str {
        "in-process"
    }

    fn generate(&self, request: &KeyRequest) -> Result<GeneratedKey> {
        let mut seed = [0u8; 32];
        rand::rngs::OsRng
            .try_fill_bytes(&mut seed)
            .map_err(SshError::Random)?;
        let signing_key = SigningKey::from_bytes(&seed);

        let private_pem = encode_private_key_pem(&signing_key.to_bytes());
        let public_line =
            format_public_key_line(&signing_key.verifying_key().to_bytes(), &request.comment);

        let public_key_path = request.public_key_path();
        write_key_file(&request.private_key_path, &private_pem, PRIVATE_KEY_MODE)?;
        write_key_file(&public_key_path, &public_line, PUBLIC_KEY_MODE)?;

        debug!(path = %request.private_key_path.display(), "wrote ed25519 key pair");

        Ok(GeneratedKey {
            private_key_path: request.private_key_path.clone(),
            public_key_path,
            public_key_line: public_line,
        })
    }
}

/// Delegates generation to an `ssh-keygen` executable.
///
/// The resulting private key is in OpenSSH's own container format rather than
/// PKCS#8; both load with standard SSH tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKeygenGenerator {
    program: String,
}

impl SshKeygenGenerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SshKeygenGenerator {
    fn default() -> Self {
        Self::new("ssh-keygen")
    }
}

impl KeyGenerator for SshKeygenGenerator {
    fn name(&self) -> &'static str {
        "ssh-keygen"
    }

    fn generate(&self, request: &KeyRequest) -> Result<GeneratedKey> {
        let public_key_path = request.public_key_path();

        // ssh-keygen asks before overwriting; the caller already has.
        remove_if_present(&request.private_key_path)?;
        remove_if_present(&public_key_path)?;

        let mut command = Command::new(&self.program);
        command
            .arg("-q")
            .args(["-t", "ed25519"])
            .arg("-C")
            .arg(&request.comment)
            .arg("-f")
            .arg(&request.private_key_path)
            .args(["-N", ""]);
        debug!(?command, "running key generator");

        let output = command.output().map_err(|e| SshError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;
        if !output.status.success() {
            return Err(SshError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let public_key_line =
            std::fs::read_to_string(&public_key_path).map_err(|e| SshError::ReadKey {
                path: public_key_path.clone(),
                source: e,
            })?;
        set_mode(&request.private_key_path, PRIVATE_KEY_MODE)?;
        set_mode(&public_key_path, PUBLIC_KEY_MODE)?;

        Ok(GeneratedKey {
            private_key_path: request.private_key_path.clone(),
            public_key_path,
            public_key_line,
        })
    }
}

/// Create `dir` (and parents) if needed. A directory created here gets
/// mode 0700 on Unix; an existing one is left as is.
///
/// # Errors
/// Returns `SshError::CreateDirectory` or `SshError::SetPermissions`.
pub fn ensure_key_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| SshError::CreateDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;
    set_mode(dir, KEY_DIR_MODE)
}

/// Write `contents` to `path` and force its permission bits to `mode`.
///
/// Permissions are set after writing so that an existing file with looser
/// bits is tightened too.
///
/// # Errors
/// Returns `SshError::WriteKey` or `SshError::SetPermissions`.
pub fn write_key_file(path: &Path, contents: &str, mode: u32) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let write = |options: &std::fs::OpenOptions| -> std::io::Result<()> {
        use std::io::Write;
        let mut file = options.open(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    };
    write(&options).map_err(|e| SshError::WriteKey {
        path: path.to_path_buf(),
        source: e,
    })?;

    set_mode(path, mode)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        SshError::SetPermissions {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SshError::RemoveKey {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
