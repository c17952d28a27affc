use anyhow::{Context, Result};
use directories::UserDirs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use tokio::fs::File;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

const CONFIG_FILE_NAME: &str = "config.toml";

// ── Top-level config ──────────────────────────────────────────────

/// Provider selection written by onboarding, loaded from `config.toml`.
///
/// Resolution order: `ZEROCLAW_CONFIG_DIR` env → `~/.zeroclaw/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Default provider ID (e.g. `"ollama"`, `"lmstudio"`, or a custom provider ID).
    pub default_provider: Option<String>,
    /// Default model routed through the selected provider (e.g. `"llama3.3"`).
    pub default_model: Option<String>,
    /// Base URL of the default provider (e.g. `"http://127.0.0.1:11434/v1"`).
    pub api_url: Option<String>,

    /// Provider endpoints keyed by provider ID (`[providers.<id>]`).
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderEndpointConfig>,

    /// Short model aliases mapping to `"<provider>/<model>"` (`[model_aliases]`).
    #[serde(default)]
    pub model_aliases: BTreeMap<String, String>,
}

/// Wire protocol spoken by a provider endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    /// OpenAI chat completions (`/v1/chat/completions`, `/v1/models`).
    #[default]
    Openai,
    /// Anthropic messages API (`/v1/messages`).
    Anthropic,
}

impl CompatibilityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim() {
            "openai" => Some(Self::Openai),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderEndpointConfig {
    /// Base URL including the version segment (e.g. `"http://127.0.0.1:1234/v1"`).
    pub base_url: String,
    /// Wire protocol. Default: `"openai"`.
    #[serde(default)]
    pub api: CompatibilityMode,
    /// Model IDs known to be served by this endpoint.
    #[serde(default)]
    pub models: Vec<String>,
}

impl Config {
    /// Register `model` under `provider_id`, replacing the endpoint settings
    /// and keeping previously known models.
    pub fn upsert_provider(
        &mut self,
        provider_id: &str,
        base_url: &str,
        api: CompatibilityMode,
        model: &str,
    ) {
        let entry = self
            .providers
            .entry(provider_id.to_string())
            .or_insert_with(|| ProviderEndpointConfig {
                base_url: base_url.to_string(),
                api,
                models: Vec::new(),
            });
        entry.base_url = base_url.to_string();
        entry.api = api;
        if !entry.models.iter().any(|m| m == model) {
            entry.models.push(model.to_string());
        }
    }

    /// Point the default provider/model at an already registered endpoint.
    pub fn set_default_model(&mut self, provider_id: &str, model: &str) {
        self.default_provider = Some(provider_id.to_string());
        self.default_model = Some(model.to_string());
        self.api_url = self
            .providers
            .get(provider_id)
            .map(|endpoint| endpoint.base_url.clone());
    }

    pub fn set_model_alias(&mut self, alias: &str, provider_id: &str, model: &str) {
        self.model_aliases
            .insert(alias.to_string(), format!("{provider_id}/{model}"));
    }

    /// Apply `ZEROCLAW_PROVIDER`, `ZEROCLAW_MODEL` and `ZEROCLAW_API_URL` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(provider) = non_empty_env("ZEROCLAW_PROVIDER") {
            self.default_provider = Some(provider);
        }
        if let Some(model) = non_empty_env("ZEROCLAW_MODEL") {
            self.default_model = Some(model);
        }
        if let Some(url) = non_empty_env("ZEROCLAW_API_URL") {
            self.api_url = Some(url);
        }
    }

    pub async fn load_or_init() -> Result<Self> {
        let config_dir = resolve_config_dir()?;
        let config = Self::load_from_dir(&config_dir).await?;
        if !config.config_path.exists() {
            tracing::info!(path = %config.config_path.display(), "Initializing new config file");
            config.save().await?;
        }
        Ok(config)
    }

    /// Load `config.toml` from `config_dir`, or defaults when the file is absent.
    pub async fn load_from_dir(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                config_path,
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        // Set computed paths that are skipped during serialization
        config.config_path = config_path;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let parent_dir = self
            .config_path
            .parent()
            .context("Config path must have a parent directory")?;

        fs::create_dir_all(parent_dir).await.with_context(|| {
            format!(
                "Failed to create config directory: {}",
                parent_dir.display()
            )
        })?;

        let file_name = self
            .config_path
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or(CONFIG_FILE_NAME);
        let temp_path = parent_dir.join(format!(".{file_name}.tmp-{}", uuid::Uuid::new_v4()));

        let mut temp_file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to create temporary config file: {}",
                    temp_path.display()
                )
            })?;
        temp_file
            .write_all(toml_str.as_bytes())
            .await
            .context("Failed to write temporary config contents")?;
        temp_file
            .sync_all()
            .await
            .context("Failed to fsync temporary config file")?;
        drop(temp_file);

        if let Err(e) = fs::rename(&temp_path, &self.config_path).await {
            let _ = fs::remove_file(&temp_path).await;
            anyhow::bail!("Failed to atomically replace config file: {e}");
        }

        sync_directory(parent_dir).await?;
        tracing::debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".zeroclaw"))
}

/// `ZEROCLAW_CONFIG_DIR` when set and non-empty, else `~/.zeroclaw`.
pub fn resolve_config_dir() -> Result<PathBuf> {
    match non_empty_env("ZEROCLAW_CONFIG_DIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => default_config_dir(),
    }
}

async fn sync_directory(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = File::open(path)
            .await
            .with_context(|| format!("Failed to open directory for fsync: {}", path.display()))?;
        dir.sync_all()
            .await
            .with_context(|| format!("Failed to fsync directory metadata: {}", path.display()))?;
        return Ok(());
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
