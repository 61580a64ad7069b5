//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one subdirectory of transcripts per project.
    pub projects_dir: PathBuf,

    /// IANA timezone for day boundaries. Unset means the system timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let projects_dir = default_projects_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            projects_dir,
            timezone: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DAYLOG_*)
        figment = figment.merge(Env::prefixed("DAYLOG_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for daylog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("daylog"))
}

/// Returns the default transcript location.
///
/// On Linux: `~/.claude/projects`
pub fn default_projects_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".claude").join("projects"))
}
