// ABOUTME: ssh-agent steps of the generate and revoke flows.
// ABOUTME: Every failure becomes a warning plus the ssh-add command to run by hand.

use anyhow::Result;
use colored::Colorize;
use deploy_key_ssh::{auth_socket, find_listed_key, fingerprint_public_key_file, KeyAgent};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::prompt::Prompter;
use crate::repo::KeyPaths;
use crate::settings::Settings;

/// Fingerprint of the key pair at `paths`, in agent listing form.
///
/// Asks the agent's fingerprint program about the private key first and
/// falls back to hashing the `.pub` file in-process. `None` when neither
/// file yields one.
pub fn key_fingerprint(agent: &dyn KeyAgent, paths: &KeyPaths) -> Option<String> {
    if paths.private_key.exists() {
        match agent.fingerprint(&paths.private_key) {
            Ok(fingerprint) => return Some(fingerprint),
            Err(e) => debug!(error = %e, "external fingerprint failed, hashing public key"),
        }
    }
    match fingerprint_public_key_file(&paths.public_key) {
        Ok(fingerprint) => Some(fingerprint),
        Err(e) => {
            debug!(error = %e, "no fingerprint available");
            None
        }
    }
}

/// Load the private key into the agent unless it is already listed.
pub fn load_into_agent<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    agent: &dyn KeyAgent,
    paths: &KeyPaths,
) -> Result<()> {
    let manual = format!("{} {}", settings.ssh_add_program, paths.private_key.display());

    if !probe(prompter, agent, &manual)? {
        return Ok(());
    }

    if let Some(fingerprint) = key_fingerprint(agent, paths) {
        match agent.list() {
            Ok(listing) if find_listed_key(&listing, &fingerprint).is_some() => {
                writeln!(prompter.out(), "Key is already loaded in ssh-agent: {fingerprint}")?;
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "could not list agent keys, adding anyway"),
        }
    }

    match agent.add(&paths.private_key) {
        Ok(()) => {
            writeln!(prompter.out(), "{} Key added to ssh-agent.", "✓".green())?;
        }
        Err(e) => {
            prompter.warn(format!("Failed to add key to ssh-agent: {e}"))?;
            writeln!(prompter.out(), "  Add it manually with: {manual}")?;
        }
    }
    Ok(())
}

/// Unload the key from the agent if the agent lists it.
///
/// Must run before the key files are deleted: both the fingerprint and
/// `ssh-add -d` read them.
pub fn unload_from_agent<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    agent: &dyn KeyAgent,
    paths: &KeyPaths,
) -> Result<()> {
    let manual = format!("{} -d {}", settings.ssh_add_program, paths.private_key.display());

    if !probe(prompter, agent, &manual)? {
        return Ok(());
    }

    let Some(fingerprint) = key_fingerprint(agent, paths) else {
        writeln!(
            prompter.out(),
            "No key material found; skipping ssh-agent removal."
        )?;
        return Ok(());
    };

    let listing = match agent.list() {
        Ok(listing) => listing,
        Err(e) => {
            prompter.warn(format!("Failed to list ssh-agent keys: {e}"))?;
            writeln!(prompter.out(), "  Remove it manually with: {manual}")?;
            return Ok(());
        }
    };

    let Some(line) = find_listed_key(&listing, &fingerprint) else {
        writeln!(prompter.out(), "Key is not loaded in ssh-agent: {fingerprint}")?;
        return Ok(());
    };
    debug!(entry = line, "found key in agent listing");

    match agent.remove(&paths.private_key) {
        Ok(()) => {
            writeln!(
                prompter.out(),
                "{} Key removed from ssh-agent: {fingerprint}",
                "✓".green()
            )?;
        }
        Err(e) => {
            prompter.warn(format!("Failed to remove key from ssh-agent: {e}"))?;
            writeln!(prompter.out(), "  Remove it manually with: {manual}")?;
        }
    }
    Ok(())
}

/// Returns whether the agent answered. Prints a warning and `manual` otherwise.
fn probe<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    agent: &dyn KeyAgent,
    manual: &str,
) -> Result<bool> {
    match agent.probe() {
        Ok(()) => Ok(true),
        Err(e) => {
            let socket = auth_socket().unwrap_or_else(|| "<unset>".to_string());
            prompter.warn(format!("ssh-agent not available ({e}); SSH_AUTH_SOCK={socket}"))?;
            writeln!(prompter.out(), "  Once an agent is running: {manual}")?;
            Ok(false)
        }
    }
}
