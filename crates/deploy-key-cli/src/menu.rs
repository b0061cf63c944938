// ABOUTME: Top-level interactive menu.
// ABOUTME: Start -> generate | revoke | quit, each flow running once without re-entry.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};

use crate::prompt::Prompter;
use crate::settings::Settings;
use crate::{generate, revoke, Toolkit};

/// A menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Generate,
    Revoke,
    Quit,
}

impl MenuChoice {
    /// `1` generates, `2` revokes, anything else quits.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => Self::Generate,
            "2" => Self::Revoke,
            _ => Self::Quit,
        }
    }
}

/// Show the menu, read one choice, and run the chosen flow.
///
/// # Errors
/// Fails if no choice can be read, or if the chosen flow fails fatally.
pub fn run<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
    toolkit: &Toolkit,
) -> Result<()> {
    let out = prompter.out();
    writeln!(out, "{}", "=== GitHub Deploy Key Generator ===".bold())?;
    writeln!(out, "1: Generate deploy key")?;
    writeln!(out, "2: Remove deploy key")?;
    writeln!(out, "3: Quit")?;

    let choice = prompter
        .ask_line("Please select an option: ")?
        .context("Failed to read input")?;

    match MenuChoice::parse(&choice) {
        MenuChoice::Generate => generate::run(prompter, settings, toolkit),
        MenuChoice::Revoke => revoke::run(prompter, settings, toolkit),
        MenuChoice::Quit => {
            writeln!(prompter.out(), "Task completed")?;
            Ok(())
        }
    }
}
