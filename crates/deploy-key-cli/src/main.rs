// ABOUTME: Entry point for the deploy-key tool
// ABOUTME: Parses flags, resolves settings, and runs the menu or a single flow

use clap::{Parser, Subcommand};
use deploy_key_cli::prompt::Prompter;
use deploy_key_cli::settings::{KeygenStrategy, Overrides, Settings};
use deploy_key_cli::{Command, Toolkit};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "deploy-key")]
#[command(about = "Generate and revoke SSH deploy keys for a single repository")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Default directory for key files (defaults to ~/.ssh)
    #[arg(long, env = "DEPLOY_KEY_SSH_DIR")]
    ssh_dir: Option<PathBuf>,

    /// SSH client config file to edit (defaults to ~/.ssh/config)
    #[arg(long, env = "DEPLOY_KEY_SSH_CONFIG")]
    ssh_config: Option<PathBuf>,

    /// Settings file (defaults to ~/.config/deploy-key/settings.toml if present)
    #[arg(long, env = "DEPLOY_KEY_SETTINGS")]
    settings: Option<PathBuf>,

    /// How to generate key pairs
    #[arg(long, value_enum, env = "DEPLOY_KEY_KEYGEN")]
    keygen: Option<KeygenStrategy>,

    /// Do not touch ssh-agent
    #[arg(long)]
    no_agent: bool,

    /// Do not back up the SSH config before editing it
    #[arg(long)]
    no_backup: bool,

    /// Log every external command and file edit to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a deploy key and SSH config entry
    Generate,
    /// Remove a deploy key, its SSH config entry, and its ssh-agent identity
    Revoke,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        deploy_key_log::init_verbose();
    } else {
        deploy_key_log::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging is always enabled at WARN or above, so this reaches stderr.
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        ssh_dir: cli.ssh_dir,
        ssh_config: cli.ssh_config,
        settings_file: cli.settings,
        keygen: cli.keygen,
        no_agent: cli.no_agent,
        no_backup: cli.no_backup,
    };
    let settings = Settings::load(&overrides)?;
    tracing::debug!(?settings, "resolved settings");

    let toolkit = Toolkit::from_settings(&settings);
    let command = match cli.command {
        None => Command::Menu,
        Some(Commands::Generate) => Command::Generate,
        Some(Commands::Revoke) => Command::Revoke,
    };

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    deploy_key_cli::run(command, &mut prompter, &settings, &toolkit)
}
