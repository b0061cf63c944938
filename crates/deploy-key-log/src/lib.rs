// ABOUTME: Shared logging setup for the deploy-key binary
// ABOUTME: Two functions: init() for quiet stderr logging, init_verbose() for debugging

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging to stderr. Default: WARN level, RUST_LOG override.
/// Prompts and instructions go to stdout, so normal runs stay uncluttered.
pub fn init() {
    init_with_level(Level::WARN);
}

/// Logging to stderr with every process invocation and file edit shown.
/// Default: DEBUG level, RUST_LOG override.
pub fn init_verbose() {
    init_with_level(Level::DEBUG);
}

fn init_with_level(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Filter directive used when RUST_LOG is unset: our crates at `level`,
/// everything else at WARN.
fn default_directive(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,deploy_key_cli={level},deploy_key_ssh={level}")
}
