//! Configuration management.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Generation provider settings
    pub ai: AiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Whether successful generations are saved to the signed-in
    /// account's documents automatically
    pub auto_save: bool,

    /// Override for the durable store location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider selection: `auto`, `gemini`, or `ollama`
    pub provider: String,

    /// Gemini model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,

    /// Ollama-specific settings
    pub ollama: OllamaConfig,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub base_url: String,

    /// Model to use
    pub model: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.remedyflow.toml` in the current directory
    /// 2. `~/.config/remedyflow/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".remedyflow.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("remedyflow").join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let remedyflow_dir = config_dir.join("remedyflow");
        std::fs::create_dir_all(&remedyflow_dir)?;

        let config_path = remedyflow_dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("remedyflow"))
    }

    /// Get the data directory path (for the durable store).
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("remedyflow"))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { auto_save: true, data_dir: None }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self { provider: "auto".to_string(), gemini_model: None, ollama: OllamaConfig::default() }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:11434".to_string(), model: "llama3.2".to_string() }
    }
}
