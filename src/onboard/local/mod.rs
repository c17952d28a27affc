//! Onboarding for model servers running on this machine (Ollama, LM Studio).

pub mod preflight;
pub mod preset;
pub mod probe;

use super::custom::{prompt_custom_api_config, CustomApiParams};
use super::{ApplyAuthChoiceParams, ApplyAuthChoiceResult};
use crate::config::{CompatibilityMode, Config};
use anyhow::{Context, Result};

pub use preflight::{resolve_local_preflight, PreflightReport, UserDecision};
pub use preset::{resolve_preset, LocalPreset, LocalProvider};
pub use probe::{
    ModelListTransport, ModelProbe, PreflightFailure, PreflightOutcome, ReqwestTransport,
};

/// Handle the `ollama-local` / `lm-studio-local` auth choices.
///
/// Returns `Ok(None)` for any other choice so the caller can try the next
/// handler. The preflight result never blocks setup: once it is resolved the
/// custom provider prompt runs with the preset values as defaults.
pub async fn apply_local_auth_choice(
    params: &ApplyAuthChoiceParams<'_>,
    config: &Config,
) -> Result<Option<ApplyAuthChoiceResult>> {
    let Some(provider) = LocalProvider::from_auth_choice(params.auth_choice) else {
        return Ok(None);
    };

    let preset = resolve_preset(provider);

    let tip = preflight::setup_note(&preset);
    params
        .prompter
        .note(&tip.body, &tip.title)
        .await
        .context("failed to show local setup tips")?;

    let report = resolve_local_preflight(params.prompter, params.probe, &preset).await?;
    tracing::debug!(
        provider = preset.provider_id,
        probes = report.probes,
        passed = report.last_outcome.is_success(),
        "Local preflight resolved"
    );

    let result = prompt_custom_api_config(
        params.prompter,
        config.clone(),
        CustomApiParams {
            initial_base_url: Some(preset.base_url.to_string()),
            initial_model_id: Some(preset.expected_model_id.to_string()),
            initial_provider_id: Some(preset.provider_id.to_string()),
            initial_alias: Some(preset.alias.to_string()),
            compatibility: Some(CompatibilityMode::Openai),
            skip_compatibility_prompt: true,
        },
    )
    .await?;

    Ok(Some(ApplyAuthChoiceResult {
        config: result.config,
    }))
}
