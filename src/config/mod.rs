// Generation provider configuration
//
// The API key comes from the environment first (CASEGEN_API_KEY, then
// OPENAI_API_KEY) and falls back to ~/.casegen/secrets.toml. The secrets
// file should be automatically gitignored.

use crate::generation::pricing::{DEFAULT_MODEL, VISION_MODEL};
use crate::generation::request::ModelSelection;
use crate::session::DEFAULT_SESSION_TTL;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Secrets stored in ~/.casegen/secrets.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl SecretsConfig {
    /// Get the secrets file path (~/.casegen/secrets.toml)
    pub fn get_secrets_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".casegen").join("secrets.toml"))
    }

    /// Load secrets from disk; a missing file is an empty config
    pub fn load() -> Result<Self> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read secrets file '{}': {}", path.display(), e))?;

        let config: SecretsConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse secrets file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save secrets to disk with owner-only permissions
    pub fn save(&self) -> Result<()> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create secrets directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize secrets: {}", e))?;

        fs::write(&path, contents)
            .map_err(|e| anyhow!("Failed to write secrets file '{}': {}", path.display(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, permissions).map_err(|e| {
                anyhow!(
                    "Failed to set permissions on secrets file '{}': {}",
                    path.display(),
                    e
                )
            })?;
        }

        log::info!("Saved secrets to: {}", path.display());
        Ok(())
    }
}

/// Resolved configuration for the generation pipeline
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub api_base: String,
    pub default_model: String,
    pub vision_model: String,
    /// Image session lifetime; CASEGEN_SESSION_TTL_MINUTES overrides
    pub session_ttl: Duration,
}

impl GenerationConfig {
    /// Resolve configuration from the environment, falling back to the
    /// secrets file for the API key and base URL.
    pub fn load() -> Result<Self> {
        let secrets = SecretsConfig::load().unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable secrets file: {}", e);
            SecretsConfig::default()
        });

        let api_key = std::env::var("CASEGEN_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or(secrets.api_key)
            .ok_or_else(|| {
                anyhow!("No API key configured (set CASEGEN_API_KEY or ~/.casegen/secrets.toml)")
            })?;

        let api_base = std::env::var("CASEGEN_API_BASE")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .or(secrets.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let session_ttl = std::env::var("CASEGEN_SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|minutes| *minutes > 0)
            .map(|minutes| Duration::from_secs(minutes * 60))
            .unwrap_or(DEFAULT_SESSION_TTL);

        Ok(Self {
            api_key,
            api_base,
            default_model: std::env::var("CASEGEN_DEFAULT_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vision_model: std::env::var("CASEGEN_VISION_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| VISION_MODEL.to_string()),
            session_ttl,
        })
    }

    /// Model identifiers for the request builder
    pub fn model_selection(&self) -> ModelSelection {
        ModelSelection {
            default_model: self.default_model.clone(),
            vision_model: self.vision_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_secrets_default_is_empty() {
        let config = SecretsConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_load_from_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = SecretsConfig::load_from(&dir.path().join("secrets.toml")).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_load_from_parses_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "api_key = \"sk-12345\"\napi_base = \"http://localhost:9999/v1\"\n")
            .unwrap();

        let config = SecretsConfig::load_from(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-12345"));
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:9999/v1"));
    }

    #[test]
    fn test_load_from_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "api_key = [not toml").unwrap();
        assert!(SecretsConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_model_selection_carries_configured_identifiers() {
        let config = GenerationConfig {
            api_key: "sk-12345".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            default_model: "custom-mini".to_string(),
            vision_model: "custom-vision".to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
        };

        let models = config.model_selection();
        assert_eq!(models.default_model, "custom-mini");
        assert_eq!(models.vision_model, "custom-vision");
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = SecretsConfig {
            api_key: Some("sk-12345".to_string()),
            api_base: None,
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("sk-12345"));
        assert!(!toml_str.contains("api_base"));

        let parsed: SecretsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_key.as_deref(), Some("sk-12345"));
    }
}
