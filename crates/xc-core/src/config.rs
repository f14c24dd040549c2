//! Configuration loaded from `~/.excavate/config.toml`.
//!
//! **Security**: this struct never stores API keys, tokens, or secrets.
//! Assistant processes inherit the environment and authenticate however
//! their own CLI does.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but is not valid TOML for this schema. Never
    /// silently ignored — a broken config should be fixed, not defaulted
    /// around.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Which external assistant CLI to invoke and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// `copilot`, `claude`, or `gemini`.
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra arguments appended before the prompt.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Transport timeout. Timeout policy lives here, at the collaborator
    /// boundary; the relic engine itself imposes none.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            extra_args: Vec::new(),
            timeout_secs: None,
        }
    }
}

/// Bounds for history embedded into prompts. The relic engine always takes
/// full history; this only limits what gets serialized for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_prompt_commits")]
    pub prompt_commits: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            prompt_commits: default_prompt_commits(),
        }
    }
}

fn default_command() -> String {
    "copilot".to_string()
}

fn default_prompt_commits() -> usize {
    10
}

impl Config {
    /// Canonical config location, `~/.excavate/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".excavate").join("config.toml"))
    }

    /// Load from the canonical location. A missing file yields defaults; a
    /// malformed file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.toml")).unwrap();

        assert_eq!(config.assistant.command, "copilot");
        assert!(config.assistant.extra_args.is_empty());
        assert_eq!(config.assistant.timeout_secs, None);
        assert_eq!(config.history.prompt_commits, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[assistant]\ncommand = \"claude\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.assistant.command, "claude");
        assert_eq!(config.history.prompt_commits, 10);
    }

    #[test]
    fn full_file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[assistant]
command = "gemini"
extra_args = ["--model", "latest"]
timeout_secs = 90

[history]
prompt_commits = 25
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.assistant.command, "gemini");
        assert_eq!(config.assistant.extra_args, vec!["--model", "latest"]);
        assert_eq!(config.assistant.timeout_secs, Some(90));
        assert_eq!(config.history.prompt_commits, 25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "assistant = not toml {").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
