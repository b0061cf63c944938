// ABOUTME: Interactive flow that creates a deploy key for one repository.
// ABOUTME: Prompts, writes the key pair, adds the SSH config entry, prints push commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use deploy_key_ssh::{ensure_key_dir, KeyRequest};
use std::io::{BufRead, Write};
use tracing::info;

use crate::agent::load_into_agent;
use crate::error::ConfigError;
use crate::prompt::Prompter;
use crate::repo::{KeyPaths, RepoName};
use crate::settings::Settings;
use crate::ssh_config::{HostEntry, SshConfig};
use crate::{backup_before_edit, Toolkit};

/// Run the generate flow to completion.
///
/// # Errors
/// Fatal conditions: invalid repository name, unusable target directory,
/// declined overwrite, key generation failure, or a missing owner name.
pub fn run<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    toolkit: &Toolkit,
) -> Result<()> {
    let repo = RepoName::parse(&prompter.ask("Repository-Name: ")?)?;

    let comment = prompter.ask_or(
        "Email address for SSH comment (optional): ",
        &settings.default_comment,
    )?;

    let dir_answer = prompter.ask(&format!(
        "Target dir for key files (default: {}): ",
        settings.ssh_dir.display()
    ))?;
    let dir = if dir_answer.is_empty() {
        settings.ssh_dir.clone()
    } else {
        settings.expand_path(&dir_answer)
    };
    ensure_key_dir(&dir).context("Failed to create directory")?;

    let paths = KeyPaths::new(&dir, &repo);
    if paths.any_exists() {
        prompter.warn(format!(
            "Key files already exist: {} and/or {}",
            paths.private_key.display(),
            paths.public_key.display()
        ))?;
        if !prompter.confirm("Do you want to overwrite them? (y/N): ", false)? {
            bail!("Operation aborted by user");
        }
    }

    let generated = toolkit
        .generator
        .generate(&KeyRequest::new(&paths.private_key, &comment))
        .context("Key generation failed")?;
    info!(
        generator = toolkit.generator.name(),
        path = %generated.private_key_path.display(),
        "generated deploy key"
    );

    let out = prompter.out();
    writeln!(out)?;
    writeln!(out, "{}", "Deploy key created".green().bold())?;
    writeln!(out, "  Private: {}", generated.private_key_path.display())?;
    writeln!(out, "  Public:  {}", generated.public_key_path.display())?;
    writeln!(out)?;
    writeln!(out, "Public key:")?;
    write!(out, "{}", generated.public_key_line)?;
    if !generated.public_key_line.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out)?;

    let owner = prompter.ask("GitHub username or organization: ")?;
    if owner.is_empty() {
        bail!("Invalid GitHub username or organization");
    }

    writeln!(
        prompter.out(),
        "Add the public key as a deploy key at: {}",
        format!("https://{}/{}/{}/settings/keys", settings.hostname, owner, repo).cyan()
    )?;

    if prompter.confirm("\nCreate matching SSH config entry? (Y/n): ", true)? {
        add_config_entry(prompter, settings, &repo, &owner, &paths)?;
    }

    if let Some(agent) = toolkit.agent.as_deref() {
        if prompter.confirm("Add key to ssh-agent? (y/N): ", false)? {
            load_into_agent(prompter, settings, agent, &paths)?;
        }
    }

    let key = paths.private_key.display();
    let branch = &settings.branch;
    let out = prompter.out();
    writeln!(out)?;
    writeln!(out, "--- COPY BELOW TO PUSH USING YOUR DEPLOY KEY ---")?;
    writeln!(out, "# Safe Mode (recommended)")?;
    writeln!(out, "GIT_SSH_COMMAND=\"ssh -i {key}\" git push origin {branch}")?;
    writeln!(out)?;
    writeln!(out, "# Advanced Mode (for scripting, disables host key checking)")?;
    writeln!(
        out,
        "GIT_SSH_COMMAND=\"ssh -i {key} -o StrictHostKeyChecking=no\" git push origin {branch}"
    )?;

    Ok(())
}

/// Append the `Host` block, reporting problems as warnings.
fn add_config_entry<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    repo: &RepoName,
    owner: &str,
    paths: &KeyPaths,
) -> Result<()> {
    let alias = settings.alias_for(repo.as_str());
    writeln!(prompter.out(), "Using SSH host alias: {alias}")?;

    let config = SshConfig::new(&settings.ssh_config);
    let entry = HostEntry::new(&alias, &settings.hostname, &paths.private_key);

    // Check first so a duplicate does not leave a pointless backup behind.
    match config.contains_entry(&alias) {
        Ok(true) => {
            let err = ConfigError::EntryExists {
                alias: alias.clone(),
                path: config.path().to_path_buf(),
            };
            prompter.warn(format!("Failed to update SSH config: {err}"))?;
            return Ok(());
        }
        Ok(false) => {}
        Err(e) => {
            prompter.warn(format!("Failed to update SSH config: {e}"))?;
            return Ok(());
        }
    }

    backup_before_edit(prompter, settings, &config)?;

    match config.add_entry(&entry) {
        Ok(()) => {
            info!(%alias, "added SSH config entry");
            let out = prompter.out();
            writeln!(out, "SSH config entry added.")?;
            writeln!(out, "Use this Git remote URL to use the deploy key:")?;
            writeln!(out, "git@{alias}:{owner}/{repo}.git")?;
        }
        Err(e) => prompter.warn(format!("Failed to update SSH config: {e}"))?,
    }
    Ok(())
}
