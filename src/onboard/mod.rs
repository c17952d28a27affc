pub mod choices;
pub mod custom;
pub mod local;
pub mod prompter;
#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use anyhow::{bail, Result};

pub use choices::{
    build_auth_choice_groups, build_auth_choice_options, prompt_auth_choice, AuthChoice,
    AuthChoiceGroup, AuthChoiceGroupId, AuthChoiceOption, UnknownAuthChoice,
};
pub use custom::{prompt_custom_api_config, CustomApiParams, CustomApiResult, CustomEndpoint};
pub use local::{apply_local_auth_choice, LocalPreset, LocalProvider, ModelProbe};
pub use prompter::{Prompter, SelectOption, SelectParams, TerminalPrompter, TextParams};

/// Collaborators shared by every auth choice handler.
pub struct ApplyAuthChoiceParams<'a> {
    pub auth_choice: AuthChoice,
    pub prompter: &'a dyn Prompter,
    pub probe: &'a ModelProbe,
}

#[derive(Debug, Clone)]
pub struct ApplyAuthChoiceResult {
    pub config: Config,
}

/// Handle `custom-api`: the generic endpoint prompt with no preset values.
pub async fn apply_custom_auth_choice(
    params: &ApplyAuthChoiceParams<'_>,
    config: &Config,
) -> Result<Option<ApplyAuthChoiceResult>> {
    if params.auth_choice != AuthChoice::CustomApi {
        return Ok(None);
    }

    let result = prompt_custom_api_config(
        params.prompter,
        config.clone(),
        CustomApiParams::default(),
    )
    .await?;

    Ok(Some(ApplyAuthChoiceResult {
        config: result.config,
    }))
}

/// Run the first handler that accepts `params.auth_choice`.
pub async fn apply_auth_choice(
    params: &ApplyAuthChoiceParams<'_>,
    config: Config,
) -> Result<ApplyAuthChoiceResult> {
    if let Some(result) = apply_local_auth_choice(params, &config).await? {
        return Ok(result);
    }
    if let Some(result) = apply_custom_auth_choice(params, &config).await? {
        return Ok(result);
    }
    bail!(
        "no onboarding handler for auth choice '{}'",
        params.auth_choice
    )
}

/// Interactive onboarding: pick an auth choice (unless given) and apply it.
pub async fn run_onboarding(
    prompter: &dyn Prompter,
    probe: &ModelProbe,
    auth_choice: Option<AuthChoice>,
    config: Config,
) -> Result<Config> {
    let auth_choice = match auth_choice {
        Some(choice) => choice,
        None => prompt_auth_choice(prompter).await?,
    };
    tracing::info!(auth_choice = %auth_choice, "Starting provider onboarding");

    let params = ApplyAuthChoiceParams {
        auth_choice,
        prompter,
        probe,
    };
    Ok(apply_auth_choice(&params, config).await?.config)
}
