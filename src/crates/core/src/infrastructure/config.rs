//! Application configuration
//!
//! Read once at process start from TOML, then overlaid with credentials
//! from the environment.

use crate::companion::OrchestratorSettings;
use crate::emotion::IntensityFormula;
use crate::util::errors::{XinyuError, XinyuResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use xinyu_ai_adapters::{Candidate, CompletionOptions, SecretString};

pub const APP_DIR_NAME: &str = "xinyu";
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Overrides `api_token` when set and non-empty.
pub const API_TOKEN_ENV: &str = "XINYU_API_TOKEN";

pub const GITHUB_MODELS_ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";
pub const ZHIPU_ENDPOINT: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    /// Tried in declaration order.
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,
    /// Environment variable holding this provider's key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn github_models() -> Self {
        Self {
            name: "github".to_string(),
            endpoint: GITHUB_MODELS_ENDPOINT.to_string(),
            models: vec![
                "openai/gpt-4o-mini".to_string(),
                "openai/gpt-4o".to_string(),
                "meta/llama-3.1-8b-instruct".to_string(),
            ],
            api_key: None,
            api_key_env: Some("GITHUB_TOKEN".to_string()),
        }
    }

    pub fn zhipu() -> Self {
        Self {
            name: "zhipu".to_string(),
            endpoint: ZHIPU_ENDPOINT.to_string(),
            models: vec!["glm-4.5-flash".to_string()],
            api_key: None,
            api_key_env: Some("ZHIPU_API_KEY".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fallback bearer credential for providers without their own key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<SecretString>,
    pub providers: Vec<ProviderConfig>,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub history_window: usize,
    /// Absent means a permission failure disables remote calls until restart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_access_cooldown_secs: Option<u64>,
    pub intensity_formula: IntensityFormula,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            providers: vec![ProviderConfig::github_models(), ProviderConfig::zhipu()],
            request_timeout_secs: 15,
            max_tokens: 800,
            temperature: 0.7,
            history_window: 6,
            no_access_cooldown_secs: None,
            intensity_formula: IntensityFormula::default(),
            user_id: "local".to_string(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/xinyu/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path` (or the default path), falling back to built-in
    /// defaults when the file does not exist, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> XinyuResult<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    XinyuError::config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration: path={}", path.display());
                config
            }
            Some(path) => {
                debug!(
                    "Config file not found, using defaults: path={}",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> XinyuResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve `XINYU_API_TOKEN` and every provider's `api_key_env` through
    /// `lookup`. Explicit `api_key` values in the file win over the
    /// provider's env var.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(
                "API token taken from environment: var={}, length={}",
                API_TOKEN_ENV,
                token.len()
            );
            self.api_token = Some(SecretString::new(token));
        }

        for provider in &mut self.providers {
            let has_inline_key = provider.api_key.as_ref().is_some_and(|k| !k.is_empty());
            if has_inline_key {
                continue;
            }
            let Some(var) = provider.api_key_env.as_deref() else {
                continue;
            };
            if let Some(key) = lookup(var).filter(|v| !v.trim().is_empty()) {
                debug!(
                    "Provider key taken from environment: provider={}, var={}, length={}",
                    provider.name,
                    var,
                    key.len()
                );
                provider.api_key = Some(SecretString::new(key));
            }
        }
    }

    pub fn validate(&self) -> XinyuResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(XinyuError::config("request_timeout_secs must be positive"));
        }
        if self.max_tokens == 0 {
            return Err(XinyuError::config("max_tokens must be positive"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(XinyuError::config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(XinyuError::config("user_id must not be empty"));
        }
        for provider in &self.providers {
            if provider.name.trim().is_empty() || provider.endpoint.trim().is_empty() {
                return Err(XinyuError::config(
                    "every provider needs a name and an endpoint",
                ));
            }
        }
        Ok(())
    }

    /// Provider × model cross product in declaration order. Providers with
    /// no usable credential contribute nothing.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for provider in &self.providers {
            let Some(credential) = self.credential_for(provider) else {
                warn!(
                    "Skipping provider without credential: provider={}",
                    provider.name
                );
                continue;
            };
            for model in &provider.models {
                candidates.push(Candidate::new(
                    provider.name.clone(),
                    provider.endpoint.clone(),
                    model.clone(),
                    credential.clone(),
                ));
            }
        }
        candidates
    }

    fn credential_for(&self, provider: &ProviderConfig) -> Option<SecretString> {
        provider
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_token.as_ref().filter(|k| !k.is_empty()))
            .cloned()
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            history_window: self.history_window,
            no_access_cooldown: self.no_access_cooldown_secs.map(Duration::from_secs),
            intensity_formula: self.intensity_formula,
        }
    }

    /// Root for the store snapshot and session logs.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ProviderConfig, API_TOKEN_ENV};
    use crate::emotion::IntensityFormula;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_candidates_without_credentials() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_with(lookup(&[]));
        assert!(config.candidates().is_empty());
        assert_eq!(config.orchestrator_settings().request_timeout, Duration::from_secs(15));
        assert_eq!(config.orchestrator_settings().history_window, 6);
        assert!(config.orchestrator_settings().no_access_cooldown.is_none());
    }

    #[test]
    fn provider_env_keys_build_cross_product_in_order() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_with(lookup(&[
            ("GITHUB_TOKEN", "gh-token"),
            ("ZHIPU_API_KEY", "zp-key"),
        ]));

        let candidates = config.candidates();
        let names: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "github/openai/gpt-4o-mini",
                "github/openai/gpt-4o",
                "github/meta/llama-3.1-8b-instruct",
                "zhipu/glm-4.5-flash",
            ]
        );
        assert_eq!(candidates[0].credential().expose(), "gh-token");
        assert_eq!(candidates[3].credential().expose(), "zp-key");
    }

    #[test]
    fn global_token_covers_providers_without_their_own_key() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_with(lookup(&[
            (API_TOKEN_ENV, "global"),
            ("ZHIPU_API_KEY", "zp-key"),
        ]));

        let candidates = config.candidates();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].credential().expose(), "global");
        assert_eq!(candidates[3].credential().expose(), "zp-key");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_with(lookup(&[(API_TOKEN_ENV, "  "), ("GITHUB_TOKEN", "")]));
        assert!(config.api_token.is_none());
        assert!(config.candidates().is_empty());
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
request_timeout_secs = 20
no_access_cooldown_secs = 600
intensity_formula = "length_and_keywords"
user_id = "alice"

[[providers]]
name = "local"
endpoint = "http://127.0.0.1:8080/v1/chat/completions"
models = ["qwen2.5"]
api_key = "inline"
"#,
        )
        .expect("valid toml");

        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.intensity_formula, IntensityFormula::LengthAndKeywords);
        assert_eq!(
            config.orchestrator_settings().no_access_cooldown,
            Some(Duration::from_secs(600))
        );
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.candidates()[0].to_string(), "local/qwen2.5");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inline_key_wins_over_provider_env() {
        let mut config = AppConfig {
            providers: vec![ProviderConfig {
                api_key: Some("inline".into()),
                ..ProviderConfig::github_models()
            }],
            ..AppConfig::default()
        };
        config.apply_env_overrides_with(lookup(&[("GITHUB_TOKEN", "env")]));
        assert_eq!(config.candidates()[0].credential().expose(), "inline");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn validate_rejects_nonsense() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            temperature: 3.5,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!(
            "xinyu-missing-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let config = AppConfig::load(Some(&path)).expect("defaults");
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.user_id, "local");
    }
}
