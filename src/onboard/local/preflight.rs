//! Probe → guidance → retry/continue loop for local model servers.

use super::preset::LocalPreset;
use super::probe::{ModelProbe, PreflightFailure, PreflightOutcome};
use crate::onboard::prompter::{Prompter, SelectOption, SelectParams};
use anyhow::{Context, Result};

const RETRY_VALUE: &str = "retry";
const CONTINUE_VALUE: &str = "continue";

/// Answer to the retry/continue menu shown after a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDecision {
    Retry,
    ContinueAnyway,
}

impl UserDecision {
    /// Only an explicit `retry` probes again; any other value continues.
    pub fn from_value(value: &str) -> Self {
        if value == RETRY_VALUE {
            Self::Retry
        } else {
            Self::ContinueAnyway
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreflightState {
    Probing,
    AwaitingDecision(PreflightFailure),
    Resolved,
}

/// What happened during one preflight run. Informational only: onboarding
/// continues with the preset values whatever the last outcome was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreflightReport {
    pub probes: u32,
    pub last_outcome: PreflightOutcome,
}

/// Title and body of a note shown through [`Prompter::note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub body: String,
}

pub fn setup_note(preset: &LocalPreset) -> Note {
    Note {
        title: format!("{} local setup", preset.display_name),
        body: [
            "Local setup tips:".to_string(),
            format!("- {}", preset.setup_step),
            format!("- ZeroClaw will connect to {}.", preset.base_url),
        ]
        .join("\n"),
    }
}

pub fn failure_note(preset: &LocalPreset, failure: PreflightFailure) -> Note {
    let name = preset.display_name;
    let model = preset.expected_model_id;
    let lines = match failure {
        PreflightFailure::EndpointUnreachable => [
            format!("Couldn't reach {name} at {}.", preset.base_url),
            preset.start_server_step.to_string(),
            preset.first_run_step.to_string(),
        ],
        PreflightFailure::ModelNotListed => [
            format!("Connected to {name}, but model \"{model}\" is not listed."),
            preset.load_model_step.to_string(),
            "You can still continue and pick a different model ID in the next step.".to_string(),
        ],
    };

    Note {
        title: format!("{name} preflight"),
        body: lines.join("\n"),
    }
}

fn decision_prompt(preset: &LocalPreset) -> SelectParams {
    SelectParams {
        message: format!("{} preflight check", preset.display_name),
        options: vec![
            SelectOption::new(RETRY_VALUE, "Retry preflight")
                .with_hint("Re-check endpoint + model before continuing"),
            SelectOption::new(CONTINUE_VALUE, "Continue setup anyway")
                .with_hint("Use custom provider prompts to adjust model/base URL"),
        ],
        initial_value: Some(RETRY_VALUE.to_string()),
    }
}

/// Probe until the endpoint passes or the user chooses to continue.
///
/// The first probe runs immediately. Every failure is explained with a note
/// before the user is asked to retry or continue. There is no retry cap.
pub async fn resolve_local_preflight(
    prompter: &dyn Prompter,
    probe: &ModelProbe,
    preset: &LocalPreset,
) -> Result<PreflightReport> {
    let mut state = PreflightState::Probing;
    let mut report = PreflightReport {
        probes: 0,
        last_outcome: PreflightOutcome::Success,
    };

    loop {
        state = match state {
            PreflightState::Probing => {
                report.probes += 1;
                report.last_outcome = probe
                    .probe(preset.base_url, preset.expected_model_id)
                    .await;

                match report.last_outcome {
                    PreflightOutcome::Success => {
                        tracing::info!(
                            provider = preset.provider_id,
                            attempt = report.probes,
                            "Local preflight passed"
                        );
                        PreflightState::Resolved
                    }
                    PreflightOutcome::Failure(failure) => {
                        tracing::warn!(
                            provider = preset.provider_id,
                            attempt = report.probes,
                            reason = failure.as_str(),
                            "Local preflight failed"
                        );
                        let note = failure_note(preset, failure);
                        prompter
                            .note(&note.body, &note.title)
                            .await
                            .context("failed to show preflight guidance")?;
                        PreflightState::AwaitingDecision(failure)
                    }
                }
            }
            PreflightState::AwaitingDecision(failure) => {
                let choice = prompter
                    .select(decision_prompt(preset))
                    .await
                    .context("failed to read preflight decision")?;

                match UserDecision::from_value(&choice) {
                    UserDecision::Retry => PreflightState::Probing,
                    UserDecision::ContinueAnyway => {
                        tracing::info!(
                            provider = preset.provider_id,
                            reason = failure.as_str(),
                            "Continuing setup despite failed local preflight"
                        );
                        PreflightState::Resolved
                    }
                }
            }
            PreflightState::Resolved => return Ok(report),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboard::local::preset::{resolve_preset, LocalProvider};
    use crate::onboard::testing::{RecordingPrompter, ScriptedTransport};
    use std::sync::Arc;

    const UNREACHABLE: PreflightOutcome =
        PreflightOutcome::Failure(PreflightFailure::EndpointUnreachable);

    #[test]
    fn decision_parsing_only_retries_on_retry() {
        assert_eq!(UserDecision::from_value("retry"), UserDecision::Retry);
        for value in ["continue", "RETRY", " retry", ""] {
            assert_eq!(
                UserDecision::from_value(value),
                UserDecision::ContinueAnyway
            );
        }
    }

    #[test]
    fn setup_note_names_base_url() {
        let note = setup_note(&resolve_preset(LocalProvider::LmStudioLocal));
        assert_eq!(note.title, "LM Studio local setup");
        assert_eq!(
            note.body,
            "Local setup tips:\n\
             - Start LM Studio local server mode and load a model.\n\
             - ZeroClaw will connect to http://127.0.0.1:1234/v1."
        );
    }

    #[test]
    fn unreachable_note_for_ollama() {
        let note = failure_note(
            &resolve_preset(LocalProvider::OllamaLocal),
            PreflightFailure::EndpointUnreachable,
        );
        assert_eq!(note.title, "Ollama preflight");
        assert_eq!(
            note.body,
            "Couldn't reach Ollama at http://127.0.0.1:11434/v1.\n\
             Start Ollama (`ollama serve`) and retry.\n\
             If this is your first run, pull a model first: `ollama pull llama3.3`."
        );
    }

    #[test]
    fn model_missing_note_for_lm_studio() {
        let note = failure_note(
            &resolve_preset(LocalProvider::LmStudioLocal),
            PreflightFailure::ModelNotListed,
        );
        assert_eq!(note.title, "LM Studio preflight");
        assert!(note.body.contains("model \"local-model\" is not listed"));
        assert!(note
            .body
            .contains("Load/select a model in LM Studio local server mode."));
        assert!(note.body.contains("pick a different model ID"));
    }

    #[test]
    fn decision_prompt_defaults_to_retry() {
        let params = decision_prompt(&resolve_preset(LocalProvider::OllamaLocal));
        assert_eq!(params.message, "Ollama preflight check");
        assert_eq!(params.initial_value.as_deref(), Some("retry"));
        let values: Vec<&str> = params.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["retry", "continue"]);
        assert_eq!(params.options[0].label, "Retry preflight");
        assert_eq!(params.options[1].label, "Continue setup anyway");
    }

    #[tokio::test]
    async fn success_resolves_without_prompting() {
        let transport = Arc::new(ScriptedTransport::listing(&["llama3.3"]));
        let probe = ModelProbe::new(transport.clone());
        let prompter = RecordingPrompter::new();

        let report = resolve_local_preflight(
            &prompter,
            &probe,
            &resolve_preset(LocalProvider::OllamaLocal),
        )
        .await
        .unwrap();

        assert_eq!(report.probes, 1);
        assert!(report.last_outcome.is_success());
        assert!(prompter.notes().is_empty());
        assert!(prompter.selects().is_empty());
    }

    #[tokio::test]
    async fn continue_ends_loop_without_reprobing() {
        let transport = Arc::new(ScriptedTransport::refusing());
        let probe = ModelProbe::new(transport.clone());
        let prompter = RecordingPrompter::new().with_selects(["continue"]);

        let report = resolve_local_preflight(
            &prompter,
            &probe,
            &resolve_preset(LocalProvider::OllamaLocal),
        )
        .await
        .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(report.probes, 1);
        assert_eq!(report.last_outcome, UNREACHABLE);
        assert_eq!(prompter.notes().len(), 1);
        assert_eq!(prompter.selects().len(), 1);
    }

    #[tokio::test]
    async fn each_retry_probes_exactly_once_more() {
        let transport = Arc::new(ScriptedTransport::refusing());
        let probe = ModelProbe::new(transport.clone());
        let prompter =
            RecordingPrompter::new().with_selects(["retry", "retry", "retry", "continue"]);

        let report = resolve_local_preflight(
            &prompter,
            &probe,
            &resolve_preset(LocalProvider::LmStudioLocal),
        )
        .await
        .unwrap();

        assert_eq!(transport.calls(), 4);
        assert_eq!(report.probes, 4);
        assert_eq!(prompter.notes().len(), 4);
        assert_eq!(prompter.selects().len(), 4);
    }

    #[tokio::test]
    async fn guidance_precedes_every_decision() {
        let transport = Arc::new(ScriptedTransport::listing(&["something-else"]));
        let probe = ModelProbe::new(transport);
        let prompter = RecordingPrompter::new().with_selects(["retry", "continue"]);

        resolve_local_preflight(
            &prompter,
            &probe,
            &resolve_preset(LocalProvider::LmStudioLocal),
        )
        .await
        .unwrap();

        let events = prompter.events();
        assert_eq!(events, vec!["note", "select", "note", "select"]);
    }
}
