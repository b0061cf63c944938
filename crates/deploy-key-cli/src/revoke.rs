// ABOUTME: Interactive flow that retires a repository's deploy key.
// ABOUTME: Unloads it from ssh-agent, deletes the key files, and strips the SSH config entry.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

use crate::agent::unload_from_agent;
use crate::prompt::Prompter;
use crate::repo::{KeyPaths, RepoName};
use crate::settings::Settings;
use crate::ssh_config::SshConfig;
use crate::{backup_before_edit, Toolkit};

/// What happened to one key file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    NotFound,
    Failed,
}

/// Run the revoke flow to completion.
///
/// # Errors
/// Only an invalid repository name (or broken terminal I/O) is fatal;
/// everything else is reported as a warning.
pub fn run<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    toolkit: &Toolkit,
) -> Result<()> {
    let repo = RepoName::parse(&prompter.ask("Repository name to remove: ")?)?;

    let dir_answer = prompter.ask(&format!(
        "Directory of the key (press ENTER to use {}): ",
        settings.ssh_dir.display()
    ))?;
    let dir = if dir_answer.is_empty() {
        settings.ssh_dir.clone()
    } else {
        settings.expand_path(&dir_answer)
    };
    let paths = KeyPaths::new(&dir, &repo);

    if let Some(agent) = toolkit.agent.as_deref() {
        unload_from_agent(prompter, settings, agent, &paths)?;
    }

    remove_key_file(prompter, &paths.private_key, "private key")?;
    remove_key_file(prompter, &paths.public_key, "public key")?;

    let config = SshConfig::new(&settings.ssh_config);
    if config.exists() {
        backup_before_edit(prompter, settings, &config)?;

        let alias = settings.alias_for(repo.as_str());
        match config.remove_entry(&alias) {
            Ok(true) => {
                info!(%alias, "removed SSH config entry");
                writeln!(prompter.out(), "SSH config entry removed.")?;
            }
            Ok(false) => {
                writeln!(prompter.out(), "No SSH config entry for Host {alias} found.")?;
            }
            Err(e) => prompter.warn(format!("Failed to remove SSH config entry: {e}"))?,
        }
    }

    Ok(())
}

/// Delete `path`, describing the outcome as `<desc> file ...`.
pub fn remove_key_file<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    path: &Path,
    desc: &str,
) -> Result<Removal> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            writeln!(prompter.out(), "{desc} file deleted: {}", path.display())?;
            Ok(Removal::Deleted)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            writeln!(prompter.out(), "{desc} file not found: {}", path.display())?;
            Ok(Removal::NotFound)
        }
        Err(e) => {
            prompter.warn(format!("Error deleting {desc} file {}: {e}", path.display()))?;
            Ok(Removal::Failed)
        }
    }
}
