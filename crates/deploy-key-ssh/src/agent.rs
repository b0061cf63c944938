// ABOUTME: Bridge to a running ssh-agent via the ssh-add and ssh-keygen programs.
// ABOUTME: KeyAgent trait, the process-backed SshAgentCli, and listing parsers.

use crate::error::{Result, SshError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Environment variable naming the agent socket.
pub const AUTH_SOCK_ENV: &str = "SSH_AUTH_SOCK";

/// The socket path from `SSH_AUTH_SOCK`, for diagnostics only.
pub fn auth_socket() -> Option<String> {
    std::env::var(AUTH_SOCK_ENV).ok().filter(|s| !s.is_empty())
}

/// Operations on a running SSH agent.
pub trait KeyAgent {
    /// Check that an agent is reachable at all.
    fn probe(&self) -> Result<()>;

    /// The agent's key listing, one key per line. Empty when no keys are loaded.
    fn list(&self) -> Result<String>;

    /// Fingerprint of the key stored at `private_key`, in the form the listing uses.
    fn fingerprint(&self, private_key: &Path) -> Result<String>;

    /// Load `private_key` into the agent.
    fn add(&self, private_key: &Path) -> Result<()>;

    /// Unload `private_key` from the agent.
    fn remove(&self, private_key: &Path) -> Result<()>;
}

/// The first listing line that mentions `fingerprint`.
pub fn find_listed_key<'a>(listing: &'a str, fingerprint: &str) -> Option<&'a str> {
    if fingerprint.is_empty() {
        return None;
    }
    listing.lines().find(|line| line.contains(fingerprint))
}

/// Pull the fingerprint out of `ssh-keygen -l` output: the second
/// whitespace-separated field of the first line
/// (`256 SHA256:abc... comment (ED25519)`).
pub fn parse_fingerprint_output(output: &str) -> Option<&str> {
    output.lines().next()?.split_whitespace().nth(1)
}

/// `KeyAgent` backed by the OpenSSH command-line tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshAgentCli {
    ssh_add: String,
    ssh_keygen: String,
}

impl SshAgentCli {
    pub fn new(ssh_add: impl Into<String>, ssh_keygen: impl Into<String>) -> Self {
        Self {
            ssh_add: ssh_add.into(),
            ssh_keygen: ssh_keygen.into(),
        }
    }

    fn run(&self, program: &str, args: &[&OsStr]) -> Result<Output> {
        let mut command = Command::new(program);
        command.args(args);
        debug!(?command, "running agent command");

        command.output().map_err(|e| SshError::Spawn {
            program: program.to_string(),
            source: e,
        })
    }

    fn run_checked(&self, program: &str, args: &[&OsStr]) -> Result<Output> {
        let output = self.run(program, args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(command_failed(program, &output))
        }
    }
}

impl Default for SshAgentCli {
    fn default() -> Self {
        Self::new("ssh-add", "ssh-keygen")
    }
}

impl KeyAgent for SshAgentCli {
    fn probe(&self) -> Result<()> {
        let output = self.run(&self.ssh_add, &[OsStr::new("-l")])?;
        // ssh-add -l: 0 = keys listed, 1 = agent has no identities, 2 = no agent.
        match output.status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(SshError::AgentUnreachable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }

    fn list(&self) -> Result<String> {
        let output = self.run(&self.ssh_add, &[OsStr::new("-l")])?;
        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(1) => Ok(String::new()),
            _ => Err(command_failed(&self.ssh_add, &output)),
        }
    }

    fn fingerprint(&self, private_key: &Path) -> Result<String> {
        let output = self.run_checked(
            &self.ssh_keygen,
            &[OsStr::new("-l"), OsStr::new("-f"), private_key.as_os_str()],
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_fingerprint_output(&stdout)
            .map(str::to_string)
            .ok_or_else(|| SshError::UnexpectedOutput {
                program: self.ssh_keygen.clone(),
                output: stdout.into_owned(),
            })
    }

    fn add(&self, private_key: &Path) -> Result<()> {
        self.run_checked(&self.ssh_add, &[private_key.as_os_str()])
            .map(|_| ())
    }

    fn remove(&self, private_key: &Path) -> Result<()> {
        self.run_checked(&self.ssh_add, &[OsStr::new("-d"), private_key.as_os_str()])
            .map(|_| ())
    }
}

fn command_failed(program: &str, output: &Output) -> SshError {
    SshError::CommandFailed {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
