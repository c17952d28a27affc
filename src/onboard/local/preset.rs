use crate::onboard::choices::AuthChoice;

pub const OLLAMA_LOCAL_BASE_URL: &str = "http://127.0.0.1:11434/v1";
pub const OLLAMA_LOCAL_DEFAULT_MODEL: &str = "llama3.3";
pub const LM_STUDIO_LOCAL_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const LM_STUDIO_LOCAL_DEFAULT_MODEL: &str = "local-model";

/// Local model server supported by the preflight flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LocalProvider {
    #[value(name = "ollama-local")]
    OllamaLocal,
    #[value(name = "lm-studio-local")]
    LmStudioLocal,
}

impl LocalProvider {
    /// Local variant behind an auth choice, `None` for non-local choices.
    pub fn from_auth_choice(choice: AuthChoice) -> Option<Self> {
        match choice {
            AuthChoice::OllamaLocal => Some(Self::OllamaLocal),
            AuthChoice::LmStudioLocal => Some(Self::LmStudioLocal),
            AuthChoice::CustomApi => None,
        }
    }
}

/// Fixed connection parameters and remediation copy for one local provider.
///
/// Built once by [`resolve_preset`]; everything downstream reads these fields
/// instead of matching on [`LocalProvider`] again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPreset {
    pub provider: LocalProvider,
    pub display_name: &'static str,
    pub base_url: &'static str,
    pub expected_model_id: &'static str,
    pub provider_id: &'static str,
    pub alias: &'static str,
    /// Setup tip bullet shown before the first probe.
    pub setup_step: &'static str,
    /// How to start the server when the endpoint is unreachable.
    pub start_server_step: &'static str,
    /// Follow-up once the server is running.
    pub first_run_step: &'static str,
    /// How to make the expected model show up in `/models`.
    pub load_model_step: &'static str,
}

pub fn resolve_preset(provider: LocalProvider) -> LocalPreset {
    match provider {
        LocalProvider::OllamaLocal => LocalPreset {
            provider,
            display_name: "Ollama",
            base_url: OLLAMA_LOCAL_BASE_URL,
            expected_model_id: OLLAMA_LOCAL_DEFAULT_MODEL,
            provider_id: "ollama",
            alias: "ollama",
            setup_step: "Install/start Ollama and run `ollama pull llama3.3`.",
            start_server_step: "Start Ollama (`ollama serve`) and retry.",
            first_run_step: "If this is your first run, pull a model first: `ollama pull llama3.3`.",
            load_model_step: "Run: ollama pull llama3.3",
        },
        LocalProvider::LmStudioLocal => LocalPreset {
            provider,
            display_name: "LM Studio",
            base_url: LM_STUDIO_LOCAL_BASE_URL,
            expected_model_id: LM_STUDIO_LOCAL_DEFAULT_MODEL,
            provider_id: "lmstudio",
            alias: "lmstudio",
            setup_step: "Start LM Studio local server mode and load a model.",
            start_server_step: "Start LM Studio local server mode on port 1234 and retry.",
            first_run_step: "Then load a model and confirm `/v1/models` returns entries.",
            load_model_step: "Load/select a model in LM Studio local server mode.",
        },
    }
}
