//! Catalog of provider auth choices offered during onboarding.

use super::prompter::{Prompter, SelectOption, SelectParams};
use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AuthChoice {
    /// Ollama on this machine (no API key needed)
    #[value(name = "ollama-local")]
    OllamaLocal,
    /// LM Studio local server mode (no API key needed)
    #[value(name = "lm-studio-local")]
    LmStudioLocal,
    /// Any OpenAI- or Anthropic-compatible endpoint
    #[value(name = "custom-api")]
    CustomApi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthChoiceGroupId {
    Local,
    Custom,
}

impl AuthChoiceGroupId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChoiceOption {
    pub value: AuthChoice,
    pub label: &'static str,
    pub hint: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChoiceGroup {
    pub id: AuthChoiceGroupId,
    pub label: &'static str,
    pub hint: &'static str,
    pub options: Vec<AuthChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown auth choice '{0}' (expected one of: ollama-local, lm-studio-local, custom-api)")]
pub struct UnknownAuthChoice(pub String);

const ALL_CHOICES: [AuthChoice; 3] = [
    AuthChoice::OllamaLocal,
    AuthChoice::LmStudioLocal,
    AuthChoice::CustomApi,
];

impl AuthChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OllamaLocal => "ollama-local",
            Self::LmStudioLocal => "lm-studio-local",
            Self::CustomApi => "custom-api",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OllamaLocal => "Ollama (local)",
            Self::LmStudioLocal => "LM Studio (local)",
            Self::CustomApi => "Custom provider",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::OllamaLocal => "Runs on 127.0.0.1:11434, no API key needed",
            Self::LmStudioLocal => "Runs on 127.0.0.1:1234, no API key needed",
            Self::CustomApi => "Any OpenAI- or Anthropic-compatible endpoint",
        }
    }

    pub fn group(self) -> AuthChoiceGroupId {
        match self {
            Self::OllamaLocal | Self::LmStudioLocal => AuthChoiceGroupId::Local,
            Self::CustomApi => AuthChoiceGroupId::Custom,
        }
    }
}

impl fmt::Display for AuthChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthChoice {
    type Err = UnknownAuthChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_CHOICES
            .into_iter()
            .find(|choice| choice.as_str() == wanted)
            .ok_or_else(|| UnknownAuthChoice(s.to_string()))
    }
}

fn option_for(choice: AuthChoice) -> AuthChoiceOption {
    AuthChoiceOption {
        value: choice,
        label: choice.label(),
        hint: choice.hint(),
    }
}

/// Every auth choice, local providers first.
pub fn build_auth_choice_options() -> Vec<AuthChoiceOption> {
    ALL_CHOICES.into_iter().map(option_for).collect()
}

pub fn build_auth_choice_groups() -> Vec<AuthChoiceGroup> {
    [
        (
            AuthChoiceGroupId::Local,
            "🏠 Local / private",
            "Ollama or LM Studio on this machine",
        ),
        (
            AuthChoiceGroupId::Custom,
            "🔧 Custom",
            "Bring your own OpenAI-compatible API",
        ),
    ]
    .into_iter()
    .map(|(id, label, hint)| AuthChoiceGroup {
        id,
        label,
        hint,
        options: build_auth_choice_options()
            .into_iter()
            .filter(|option| option.value.group() == id)
            .collect(),
    })
    .collect()
}

/// Ask for a provider group, then for a choice inside it.
pub async fn prompt_auth_choice(prompter: &dyn Prompter) -> Result<AuthChoice> {
    let groups = build_auth_choice_groups();

    let group_value = prompter
        .select(SelectParams {
            message: "Select provider category".into(),
            options: groups
                .iter()
                .map(|g| SelectOption::new(g.id.as_str(), g.label).with_hint(g.hint))
                .collect(),
            initial_value: Some(AuthChoiceGroupId::Local.as_str().into()),
        })
        .await?;

    let group = groups
        .into_iter()
        .find(|g| g.id.as_str() == group_value)
        .with_context(|| format!("unknown provider category '{group_value}'"))?;

    if let [only] = group.options.as_slice() {
        return Ok(only.value);
    }

    let choice_value = prompter
        .select(SelectParams {
            message: "Select your AI provider".into(),
            options: group
                .options
                .iter()
                .map(|o| SelectOption::new(o.value.as_str(), o.label).with_hint(o.hint))
                .collect(),
            initial_value: group.options.first().map(|o| o.value.as_str().to_string()),
        })
        .await?;

    Ok(choice_value.parse()?)
}
