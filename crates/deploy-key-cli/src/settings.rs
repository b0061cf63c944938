// ABOUTME: Resolved settings threaded through every flow.
// ABOUTME: Defaults from the home directory, an optional TOML file, then CLI/env overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Placeholder comment when the user leaves the email prompt blank.
pub const DEFAULT_COMMENT: &str = "no-email@example.com";

/// Which `KeyGenerator` to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeygenStrategy {
    /// Generate and encode the key pair inside this process.
    #[default]
    InProcess,
    /// Run `ssh-keygen`.
    SshKeygen,
}

/// Optional settings file (`~/.config/deploy-key/settings.toml`).
///
/// ```toml
/// ssh_dir = "~/.ssh/deploy"
/// hostname = "github.com"
/// alias_prefix = "github"
/// branch = "main"
/// keygen = "ssh-keygen"
/// agent = true
/// backup = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub ssh_dir: Option<String>,
    pub ssh_config: Option<String>,
    pub hostname: Option<String>,
    pub alias_prefix: Option<String>,
    pub default_comment: Option<String>,
    pub branch: Option<String>,
    pub keygen: Option<KeygenStrategy>,
    pub agent: Option<bool>,
    pub backup: Option<bool>,
    pub ssh_keygen_program: Option<String>,
    pub ssh_add_program: Option<String>,
}

impl SettingsFile {
    /// Parse a settings file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid settings TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }
}

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub ssh_dir: Option<PathBuf>,
    pub ssh_config: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
    pub keygen: Option<KeygenStrategy>,
    pub no_agent: bool,
    pub no_backup: bool,
}

/// Everything the flows need to know about the environment, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub home: PathBuf,
    /// Default directory for key files.
    pub ssh_dir: PathBuf,
    /// SSH client config file that receives `Host` blocks.
    pub ssh_config: PathBuf,
    /// Real host name of the code-hosting service.
    pub hostname: String,
    /// Host aliases are `<alias_prefix>-<repo>`.
    pub alias_prefix: String,
    pub default_comment: String,
    /// Branch used in the printed push commands.
    pub branch: String,
    pub keygen: KeygenStrategy,
    /// Offer to load/unload keys in a running ssh-agent.
    pub agent: bool,
    /// Snapshot the SSH config before editing it.
    pub backup: bool,
    pub ssh_keygen_program: String,
    pub ssh_add_program: String,
}

impl Settings {
    /// Built-in defaults for a user whose home directory is `home`.
    pub fn defaults(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let ssh_dir = home.join(".ssh");
        Self {
            ssh_config: ssh_dir.join("config"),
            ssh_dir,
            home,
            hostname: "github.com".to_string(),
            alias_prefix: "github".to_string(),
            default_comment: DEFAULT_COMMENT.to_string(),
            branch: "main".to_string(),
            keygen: KeygenStrategy::default(),
            agent: true,
            backup: true,
            ssh_keygen_program: "ssh-keygen".to_string(),
            ssh_add_program: "ssh-add".to_string(),
        }
    }

    /// Layer `file` and then `overrides` on top of the defaults.
    pub fn resolve(home: impl Into<PathBuf>, file: SettingsFile, overrides: &Overrides) -> Self {
        let mut settings = Self::defaults(home);

        if let Some(dir) = file.ssh_dir {
            settings.ssh_dir = settings.expand_path(&dir);
        }
        if let Some(config) = file.ssh_config {
            settings.ssh_config = settings.expand_path(&config);
        }
        if let Some(hostname) = file.hostname {
            settings.hostname = hostname;
        }
        if let Some(prefix) = file.alias_prefix {
            settings.alias_prefix = prefix;
        }
        if let Some(comment) = file.default_comment {
            settings.default_comment = comment;
        }
        if let Some(branch) = file.branch {
            settings.branch = branch;
        }
        if let Some(keygen) = file.keygen {
            settings.keygen = keygen;
        }
        if let Some(agent) = file.agent {
            settings.agent = agent;
        }
        if let Some(backup) = file.backup {
            settings.backup = backup;
        }
        if let Some(program) = file.ssh_keygen_program {
            settings.ssh_keygen_program = program;
        }
        if let Some(program) = file.ssh_add_program {
            settings.ssh_add_program = program;
        }

        if let Some(dir) = &overrides.ssh_dir {
            settings.ssh_dir = settings.expand_path(&dir.to_string_lossy());
        }
        if let Some(config) = &overrides.ssh_config {
            settings.ssh_config = settings.expand_path(&config.to_string_lossy());
        }
        if let Some(keygen) = overrides.keygen {
            settings.keygen = keygen;
        }
        if overrides.no_agent {
            settings.agent = false;
        }
        if overrides.no_backup {
            settings.backup = false;
        }

        settings
    }

    /// Resolve settings for the current user.
    ///
    /// An explicitly named settings file must exist; the default one is
    /// optional.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or a
    /// settings file cannot be read or parsed.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;

        let file = match &overrides.settings_file {
            Some(path) => SettingsFile::load(path)?,
            None => match default_settings_path() {
                Some(path) if path.is_file() => SettingsFile::load(&path)?,
                _ => SettingsFile::default(),
            },
        };

        Ok(Self::resolve(home, file, overrides))
    }

    /// Expand a leading `~` to the home directory.
    pub fn expand_path(&self, input: &str) -> PathBuf {
        if input == "~" {
            return self.home.clone();
        }
        match input.strip_prefix("~/") {
            Some(rest) => self.home.join(rest),
            None => PathBuf::from(input),
        }
    }

    /// SSH host alias for a repository.
    pub fn alias_for(&self, repo: &str) -> String {
        format!("{}-{}", self.alias_prefix, repo)
    }
}

/// `<config dir>/deploy-key/settings.toml`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("deploy-key").join("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_derive_from_home() {
        let settings = Settings::defaults("/home/me");
        assert_eq!(settings.ssh_dir, PathBuf::from("/home/me/.ssh"));
        assert_eq!(settings.ssh_config, PathBuf::from("/home/me/.ssh/config"));
        assert_eq!(settings.hostname, "github.com");
        assert_eq!(settings.default_comment, "no-email@example.com");
        assert_eq!(settings.keygen, KeygenStrategy::InProcess);
        assert!(settings.agent);
        assert!(settings.backup);
    }

    #[test]
    fn test_alias_convention() {
        let settings = Settings::defaults("/home/me");
        assert_eq!(settings.alias_for("myrepo"), "github-myrepo");
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file: SettingsFile = toml::from_str(
            r#"
            ssh_dir = "~/.ssh/deploy"
            hostname = "gitlab.example.com"
            alias_prefix = "gitlab"
            keygen = "ssh-keygen"
            backup = false
            "#,
        )
        .expect("settings should parse");

        let settings = Settings::resolve("/home/me", file, &Overrides::default());
        assert_eq!(settings.ssh_dir, PathBuf::from("/home/me/.ssh/deploy"));
        assert_eq!(settings.ssh_config, PathBuf::from("/home/me/.ssh/config"));
        assert_eq!(settings.hostname, "gitlab.example.com");
        assert_eq!(settings.alias_for("x"), "gitlab-x");
        assert_eq!(settings.keygen, KeygenStrategy::SshKeygen);
        assert!(!settings.backup);
        assert!(settings.agent);
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = SettingsFile {
            ssh_dir: Some("/from/file".to_string()),
            keygen: Some(KeygenStrategy::SshKeygen),
            agent: Some(true),
            ..Default::default()
        };
        let overrides = Overrides {
            ssh_dir: Some(PathBuf::from("~/keys")),
            keygen: Some(KeygenStrategy::InProcess),
            no_agent: true,
            ..Default::default()
        };

        let settings = Settings::resolve("/home/me", file, &overrides);
        assert_eq!(settings.ssh_dir, PathBuf::from("/home/me/keys"));
        assert_eq!(settings.keygen, KeygenStrategy::InProcess);
        assert!(!settings.agent);
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let result: std::result::Result<SettingsFile, _> = toml::from_str("colour = \"red\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_file_load() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "branch = \"trunk\"\n").unwrap();

        let file = SettingsFile::load(&path).expect("should load");
        assert_eq!(file.branch.as_deref(), Some("trunk"));

        std::fs::write(&path, "branch = [").unwrap();
        assert!(SettingsFile::load(&path).is_err());
    }

    #[test]
    fn test_expand_path() {
        let settings = Settings::defaults("/home/me");
        assert_eq!(settings.expand_path("~"), PathBuf::from("/home/me"));
        assert_eq!(settings.expand_path("~/k"), PathBuf::from("/home/me/k"));
        assert_eq!(settings.expand_path("/abs"), PathBuf::from("/abs"));
        assert_eq!(settings.expand_path("rel/dir"), PathBuf::from("rel/dir"));
    }
}
