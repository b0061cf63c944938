// ABOUTME: Library behind the deploy-key binary.
// ABOUTME: Settings, prompts, SSH config editing, backups, and the generate/revoke flows.

//! # deploy-key-cli
//!
//! Creates and retires SSH deploy keys for a single repository, keeping a
//! matching `Host` alias in `~/.ssh/config`.
//!
//! ```text
//! deploy-key              # interactive menu
//! deploy-key generate     # straight to the generate flow
//! deploy-key revoke       # straight to the revoke flow
//! ```
//!
//! The flows are generic over their input and output so they can be driven
//! from tests with in-memory buffers and fake [`KeyGenerator`] / [`KeyAgent`]
//! implementations.

pub mod agent;
pub mod backup;
pub mod error;
pub mod generate;
pub mod menu;
pub mod prompt;
pub mod repo;
pub mod revoke;
pub mod settings;
pub mod ssh_config;

use anyhow::Result;
use deploy_key_ssh::{Ed25519Generator, KeyAgent, KeyGenerator, SshAgentCli, SshKeygenGenerator};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::prompt::Prompter;
use crate::settings::{KeygenStrategy, Settings};
use crate::ssh_config::SshConfig;

/// Which flow to enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Generate,
    Revoke,
}

/// The key generator and (optional) agent the flows use.
pub struct Toolkit {
    pub generator: Box<dyn KeyGenerator>,
    pub agent: Option<Box<dyn KeyAgent>>,
}

impl Toolkit {
    /// Real implementations chosen by `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let generator: Box<dyn KeyGenerator> = match settings.keygen {
            KeygenStrategy::InProcess => Box::new(Ed25519Generator),
            KeygenStrategy::SshKeygen => {
                Box::new(SshKeygenGenerator::new(&settings.ssh_keygen_program))
            }
        };
        let agent: Option<Box<dyn KeyAgent>> = settings.agent.then(|| {
            Box::new(SshAgentCli::new(
                &settings.ssh_add_program,
                &settings.ssh_keygen_program,
            )) as Box<dyn KeyAgent>
        });
        Self { generator, agent }
    }
}

/// Run `command` to completion.
///
/// # Errors
/// Returns the fatal error that ended the flow.
pub fn run<R: BufRead, W: Write>(
    command: Command,
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    toolkit: &Toolkit,
) -> Result<()> {
    match command {
        Command::Menu => menu::run(prompter, settings, toolkit),
        Command::Generate => generate::run(prompter, settings, toolkit),
        Command::Revoke => revoke::run(prompter, settings, toolkit),
    }
}

/// Snapshot the SSH config if backups are enabled and the file exists.
/// A failed backup is a warning; the edit goes ahead regardless.
pub(crate) fn backup_before_edit<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    config: &SshConfig,
) -> Result<Option<PathBuf>> {
    if !settings.backup || !config.exists() {
        return Ok(None);
    }
    match backup::backup_file(config.path()) {
        Ok(path) => {
            writeln!(prompter.out(), "Backed up SSH config to {}", path.display())?;
            Ok(Some(path))
        }
        Err(e) => {
            prompter.warn(format!("Failed to backup SSH config: {e}"))?;
            Ok(None)
        }
    }
}
