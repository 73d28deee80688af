//! Skill configuration.
//!
//! Read from a YAML file: either the path given on the command line or the
//! first that exists of `./config.yaml`,
//! `~/.config/groceries-skill/config.yaml` and
//! `/etc/groceries-skill/config.yaml`. Missing sections fall back to
//! defaults. Account credentials can also come from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

use crate::consts::{DEFAULT_FAILURE_PHRASE, DEFAULT_LIST, SKILL_ID};

pub const USERNAME_ENV: &str = "OURGROCERIES_USERNAME";
pub const PASSWORD_ENV: &str = "OURGROCERIES_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            client_id: SKILL_ID.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    /// List used when an intent names none.
    pub default_list: String,
    /// Reject list-name matches scoring below this (0–100). Unset means
    /// the closest list always wins.
    pub min_match_score: Option<u8>,
    /// Spoken when the store can't be reached.
    pub failure_phrase: String,
    pub http_timeout_secs: u64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            default_list: DEFAULT_LIST.into(),
            min_match_score: None,
            failure_phrase: DEFAULT_FAILURE_PHRASE.into(),
            http_timeout_secs: 30,
        }
    }
}

impl SkillConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub account: AccountConfig,
    pub skill: SkillConfig,
}

impl Config {
    /// Load configuration. An explicit `path` must exist and parse; the
    /// standard locations are optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::search() {
                Some(found) => Self::from_file(&found)?,
                None => {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.account.apply_env(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        );
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(contents)?)
    }

    fn search() -> Option<PathBuf> {
        let candidates = [
            std::env::current_dir().ok().map(|d| d.join("config.yaml")),
            dirs::home_dir().map(|h| h.join(".config").join(SKILL_ID).join("config.yaml")),
            Some(PathBuf::from("/etc").join(SKILL_ID).join("config.yaml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }
}

impl AccountConfig {
    /// Environment values win over the file. Empty strings count as unset.
    pub fn apply_env(&mut self, username: Option<String>, password: Option<String>) {
        if let Some(u) = username.filter(|s| !s.is_empty()) {
            self.username = Some(u);
        }
        if let Some(p) = password.filter(|s| !s.is_empty()) {
            self.password = Some(p);
        }
        self.username = self.username.take().filter(|s| !s.is_empty());
        self.password = self.password.take().filter(|s| !s.is_empty());
    }

    /// Both credentials, or an error naming what's missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => Ok((u, p)),
            (None, _) => bail!("no Our Groceries username configured (set account.username or {USERNAME_ENV})"),
            (_, None) => bail!("no Our Groceries password configured (set account.password or {PASSWORD_ENV})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.mqtt.host, "localhost");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.skill.default_list, DEFAULT_LIST);
        assert_eq!(config.skill.min_match_score, None);
        assert_eq!(config.skill.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_yaml(
            "mqtt:\n  host: 192.168.86.2\nskill:\n  default_list: Groceries\n  min_match_score: 60\n",
        )
        .unwrap();
        assert_eq!(config.mqtt.host, "192.168.86.2");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.skill.default_list, "Groceries");
        assert_eq!(config.skill.min_match_score, Some(60));
        assert_eq!(config.skill.failure_phrase, DEFAULT_FAILURE_PHRASE);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(Config::from_yaml("mqtt: [not, a, map").is_err());
    }

    #[test]
    fn env_overrides_file_credentials() {
        let mut account = AccountConfig {
            username: Some("file@example.com".into()),
            password: Some("file-pass".into()),
        };
        account.apply_env(Some("env@example.com".into()), Some(String::new()));
        assert_eq!(account.username.as_deref(), Some("env@example.com"));
        assert_eq!(account.password.as_deref(), Some("file-pass"));
    }

    #[test]
    fn empty_credentials_are_missing() {
        let mut account = AccountConfig {
            username: Some(String::new()),
            password: Some("pw".into()),
        };
        account.apply_env(None, None);
        let err = account.credentials().unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "mqtt:\n  port: 1884\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mqtt.port, 1884);
    }

    #[test]
    fn load_fails_for_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.yaml"))).is_err());
    }
}
