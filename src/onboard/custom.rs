//! Generic "bring your own endpoint" provider prompt.
//!
//! Local onboarding hands over to this prompt with its preset values filled
//! in; the `custom-api` auth choice runs it from scratch.

use super::prompter::{Prompter, SelectOption, SelectParams, TextParams};
use crate::config::{CompatibilityMode, Config};
use anyhow::{Context, Result};

const DEFAULT_CUSTOM_PROVIDER_ID: &str = "custom";

/// Initial values and switches for [`prompt_custom_api_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomApiParams {
    pub initial_base_url: Option<String>,
    pub initial_model_id: Option<String>,
    pub initial_provider_id: Option<String>,
    pub initial_alias: Option<String>,
    /// Protocol to use, or to pre-select when the compatibility prompt runs.
    pub compatibility: Option<CompatibilityMode>,
    pub skip_compatibility_prompt: bool,
}

/// Endpoint the user settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEndpoint {
    pub base_url: String,
    pub compatibility: CompatibilityMode,
    pub model_id: String,
    pub provider_id: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomApiResult {
    pub config: Config,
    pub endpoint: CustomEndpoint,
}

/// Trim whitespace and trailing slashes; `None` unless the result is an
/// absolute `http`/`https` URL with a host.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Lowercase, `[a-z0-9-_]` only, no leading/trailing dashes.
pub fn normalize_provider_id(raw: &str) -> String {
    let mapped: String = raw
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_CUSTOM_PROVIDER_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Provider ID suggestion derived from the endpoint host.
fn provider_id_from_url(base_url: &str) -> String {
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .map_or_else(
            || DEFAULT_CUSTOM_PROVIDER_ID.to_string(),
            |host| {
                format!(
                    "{DEFAULT_CUSTOM_PROVIDER_ID}-{}",
                    normalize_provider_id(&host)
                )
            },
        )
}

async fn prompt_base_url(prompter: &dyn Prompter, initial: Option<&str>) -> Result<String> {
    let mut suggestion = initial.map(str::to_string);
    loop {
        let raw = prompter
            .text(TextParams {
                message: "API base URL (e.g. http://localhost:1234/v1)".into(),
                initial_value: suggestion.clone(),
            })
            .await?;

        if let Some(base_url) = normalize_base_url(&raw) {
            return Ok(base_url);
        }

        let rejected = raw.trim();
        let hint = format!("'{rejected}' is not an http(s) URL. Example: http://127.0.0.1:1234/v1");
        prompter.note(&hint, "Invalid base URL").await?;
        if !rejected.is_empty() {
            suggestion = Some(rejected.to_string());
        }
    }
}

async fn prompt_compatibility(
    prompter: &dyn Prompter,
    initial: CompatibilityMode,
) -> Result<CompatibilityMode> {
    let value = prompter
        .select(SelectParams {
            message: "Endpoint compatibility".into(),
            options: vec![
                SelectOption::new(CompatibilityMode::Openai.as_str(), "OpenAI-compatible")
                    .with_hint("Uses /chat/completions"),
                SelectOption::new(
                    CompatibilityMode::Anthropic.as_str(),
                    "Anthropic-compatible",
                )
                .with_hint("Uses /messages"),
            ],
            initial_value: Some(initial.as_str().to_string()),
        })
        .await?;

    CompatibilityMode::from_value(&value)
        .with_context(|| format!("unsupported compatibility mode '{value}'"))
}

async fn prompt_model_id(prompter: &dyn Prompter, initial: Option<&str>) -> Result<String> {
    loop {
        let raw = prompter
            .text(TextParams {
                message: "Model ID".into(),
                initial_value: initial.map(str::to_string),
            })
            .await?;
        let model = raw.trim();
        if !model.is_empty() {
            return Ok(model.to_string());
        }
        prompter
            .note(
                "Enter the model ID exactly as the endpoint lists it.",
                "Model ID required",
            )
            .await?;
    }
}

/// Collect endpoint settings and write them into a copy of `config`.
pub async fn prompt_custom_api_config(
    prompter: &dyn Prompter,
    config: Config,
    params: CustomApiParams,
) -> Result<CustomApiResult> {
    let base_url = prompt_base_url(prompter, params.initial_base_url.as_deref()).await?;

    let initial_compatibility = params.compatibility.unwrap_or_default();
    let compatibility = if params.skip_compatibility_prompt {
        initial_compatibility
    } else {
        prompt_compatibility(prompter, initial_compatibility).await?
    };

    let model_id = prompt_model_id(prompter, params.initial_model_id.as_deref()).await?;

    let provider_suggestion = params
        .initial_provider_id
        .clone()
        .unwrap_or_else(|| provider_id_from_url(&base_url));
    let provider_id = normalize_provider_id(
        &prompter
            .text(TextParams {
                message: "Provider ID".into(),
                initial_value: Some(provider_suggestion),
            })
            .await?,
    );

    let alias = prompter
        .text(TextParams {
            message: "Model alias (optional)".into(),
            initial_value: params.initial_alias.clone(),
        })
        .await?;
    let alias = Some(alias.trim().to_string()).filter(|a| !a.is_empty());

    let endpoint = CustomEndpoint {
        base_url,
        compatibility,
        model_id,
        provider_id,
        alias,
    };

    let mut config = config;
    config.upsert_provider(
        &endpoint.provider_id,
        &endpoint.base_url,
        endpoint.compatibility,
        &endpoint.model_id,
    );
    config.set_default_model(&endpoint.provider_id, &endpoint.model_id);
    if let Some(alias) = &endpoint.alias {
        config.set_model_alias(alias, &endpoint.provider_id, &endpoint.model_id);
    }

    tracing::info!(
        provider = %endpoint.provider_id,
        model = %endpoint.model_id,
        api = endpoint.compatibility.as_str(),
        "Custom provider configured"
    );

    prompter
        .note(
            &format!(
                "Provider: {}\nModel: {}\nBase URL: {}",
                endpoint.provider_id, endpoint.model_id, endpoint.base_url
            ),
            "Provider configured",
        )
        .await?;

    Ok(CustomApiResult { config, endpoint })
}
