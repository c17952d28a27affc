//! Prompt surface used by the onboarding flows.
//!
//! Onboarding logic only talks to [`Prompter`], so the same flow runs against
//! the real terminal ([`TerminalPrompter`]) and against scripted doubles in
//! tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use console::style;
use dialoguer::{Input, Select};

/// One entry of a [`Prompter::select`] menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub hint: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParams {
    pub message: String,
    pub options: Vec<SelectOption>,
    /// Value of the option highlighted when the menu opens.
    pub initial_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextParams {
    pub message: String,
    /// Pre-filled answer; accepted as-is when the user just presses Enter.
    pub initial_value: Option<String>,
}

/// Interactive prompt collaborator.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Show an informational block with a title.
    async fn note(&self, body: &str, title: &str) -> Result<()>;

    /// Present a menu and return the `value` of the chosen option.
    async fn select(&self, params: SelectParams) -> Result<String>;

    /// Ask for a single line of free text.
    async fn text(&self, params: TextParams) -> Result<String>;
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
///
/// Terminal reads block, so `select` and `text` run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn option_item(option: &SelectOption) -> String {
    match &option.hint {
        Some(hint) => format!("{} {}", option.label, style(format!("({hint})")).dim()),
        None => option.label.clone(),
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn note(&self, body: &str, title: &str) -> Result<()> {
        println!();
        println!("  {}", style(title).white().bold());
        println!("  {}", style("─".repeat(50)).dim());
        for line in body.lines() {
            println!("  {} {}", style("›").cyan(), line);
        }
        Ok(())
    }

    async fn select(&self, params: SelectParams) -> Result<String> {
        if params.options.is_empty() {
            anyhow::bail!("select prompt '{}' has no options", params.message);
        }

        let default_idx = params
            .initial_value
            .as_deref()
            .and_then(|value| params.options.iter().position(|o| o.value == value))
            .unwrap_or(0);
        let items: Vec<String> = params.options.iter().map(option_item).collect();
        let prompt = format!("  {}", params.message);

        let idx = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(prompt)
                .items(&items)
                .default(default_idx)
                .interact()
        })
        .await
        .context("select prompt task failed")??;

        params
            .options
            .get(idx)
            .map(|option| option.value.clone())
            .with_context(|| format!("select prompt returned out-of-range index {idx}"))
    }

    async fn text(&self, params: TextParams) -> Result<String> {
        let prompt = format!("  {}", params.message);
        let initial = params.initial_value;

        let answer = tokio::task::spawn_blocking(move || {
            let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
            if let Some(initial) = initial {
                input = input.default(initial);
            }
            input.interact_text()
        })
        .await
        .context("text prompt task failed")??;

        Ok(answer)
    }
}
