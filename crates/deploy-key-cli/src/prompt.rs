// ABOUTME: Line-oriented prompts over any reader/writer pair.
// ABOUTME: Trimmed answers, default-on-empty, y/N confirmations, and warnings.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt::Display;
use std::io::{BufRead, Write};

/// Asks questions on `output` and reads one trimmed line per answer from `input`.
///
/// Production code wraps stdin/stdout; tests feed a byte slice and capture a `Vec<u8>`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` means input is exhausted.
    pub fn ask_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            // Keep the transcript readable when input ends mid-prompt.
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Print `prompt` and return the trimmed answer; end of input reads as empty.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self.ask_line(prompt)?.unwrap_or_default())
    }

    /// Like [`ask`](Self::ask), substituting `default` for an empty answer.
    pub fn ask_or(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask(prompt)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Yes/no question. Empty answer gives `default`; `y`/`yes` (any case) is
    /// yes; anything else is no.
    pub fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = self.ask(prompt)?;
        Ok(parse_confirmation(&answer, default))
    }

    /// Print a non-fatal warning. It is only logged at debug level: the
    /// default WARN filter would otherwise repeat it on stderr.
    pub fn warn(&mut self, message: impl Display) -> Result<()> {
        tracing::debug!("{message}");
        writeln!(self.output, "{} {}", "!".yellow().bold(), message)?;
        Ok(())
    }

    /// Writer for free-form output.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the prompter, returning the output writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

fn parse_confirmation(answer: &str, default: bool) -> bool {
    if answer.is_empty() {
        return default;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
