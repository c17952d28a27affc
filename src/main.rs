#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use console::style;
use std::io::Write;
use tracing_subscriber::{fmt, EnvFilter};
use zeroclaw_onboard::config::{self, Config};
use zeroclaw_onboard::onboard::local::preflight::failure_note;
use zeroclaw_onboard::onboard::local::{resolve_preset, LocalProvider, PreflightOutcome};
use zeroclaw_onboard::onboard::{
    build_auth_choice_groups, run_onboarding, AuthChoice, ModelProbe, Prompter, TerminalPrompter,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    #[value(name = "bash")]
    Bash,
    #[value(name = "fish")]
    Fish,
    #[value(name = "zsh")]
    Zsh,
    #[value(name = "powershell")]
    PowerShell,
    #[value(name = "elvish")]
    Elvish,
}

/// `ZeroClaw` onboarding for local and custom model providers.
#[derive(Parser, Debug)]
#[command(name = "zeroclaw-onboard")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(
    about = "Connect ZeroClaw to Ollama, LM Studio, or any OpenAI-compatible endpoint.",
    long_about = None
)]
struct Cli {
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick a provider, check it is reachable, and save it as the default
    Onboard {
        /// Skip the provider menu (ollama-local, lm-studio-local, custom-api)
        #[arg(long, value_enum)]
        auth_choice: Option<AuthChoice>,
    },

    /// Check once whether a local model server is up and serving its default model
    #[command(long_about = "\
Check once whether a local model server is up and serving its default model.

Sends GET <base-url>/models with a 3.5 second timeout and exits non-zero \
when the server is unreachable or the default model is not listed.

Examples:
  zeroclaw-onboard preflight ollama-local
  zeroclaw-onboard preflight lm-studio-local")]
    Preflight {
        /// Local provider to probe
        #[arg(value_enum)]
        provider: LocalProvider,
    },

    /// List the provider choices offered during onboarding
    Choices,

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },

    /// Generate shell completion script to stdout
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved config.toml
    Show,
    /// Dump the full configuration JSON Schema to stdout
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(config_dir) = &cli.config_dir {
        if config_dir.trim().is_empty() {
            bail!("--config-dir cannot be empty");
        }
        std::env::set_var("ZEROCLAW_CONFIG_DIR", config_dir);
    }

    // Completions must remain stdout-only and should not load config or initialize logging.
    if let Commands::Completions { shell } = &cli.command {
        let mut stdout = std::io::stdout().lock();
        write_shell_completion(*shell, &mut stdout)?;
        return Ok(());
    }

    // Respects RUST_LOG; defaults to WARN so log lines stay out of the prompts.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match cli.command {
        Commands::Completions { .. } => unreachable!(),
        Commands::Onboard { auth_choice } => onboard(auth_choice).await,
        Commands::Preflight { provider } => preflight(provider).await,
        Commands::Choices => {
            print_choices();
            Ok(())
        }
        Commands::Config { config_command } => match config_command {
            ConfigCommands::Show => {
                let mut config = Config::load_from_dir(&config::resolve_config_dir()?).await?;
                config.apply_env_overrides();
                println!("# {}", style(config.config_path.display()).dim());
                print!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to serialize config")?
                );
                Ok(())
            }
            ConfigCommands::Schema => {
                let schema = schemars::schema_for!(Config);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&schema)
                        .context("failed to serialize JSON Schema")?
                );
                Ok(())
            }
        },
    }
}

async fn onboard(auth_choice: Option<AuthChoice>) -> Result<()> {
    let config = Config::load_or_init().await?;
    let prompter = TerminalPrompter::new();
    let probe = ModelProbe::http()?;

    let config = run_onboarding(&prompter, &probe, auth_choice, config).await?;
    config.save().await?;

    println!();
    println!(
        "  {} Provider: {} | Model: {}",
        style("✓").green().bold(),
        style(config.default_provider.as_deref().unwrap_or("-")).green(),
        style(config.default_model.as_deref().unwrap_or("-")).green()
    );
    println!(
        "  {} Saved to {}",
        style("✓").green().bold(),
        style(config.config_path.display()).green()
    );
    Ok(())
}

async fn preflight(provider: LocalProvider) -> Result<()> {
    let preset = resolve_preset(provider);
    let probe = ModelProbe::http()?;

    match probe.probe(preset.base_url, preset.expected_model_id).await {
        PreflightOutcome::Success => {
            println!(
                "  {} {} is reachable at {} (model {})",
                style("✓").green().bold(),
                preset.display_name,
                style(preset.base_url).green(),
                style(preset.expected_model_id).green()
            );
            Ok(())
        }
        PreflightOutcome::Failure(failure) => {
            let note = failure_note(&preset, failure);
            TerminalPrompter::new().note(&note.body, &note.title).await?;
            bail!(
                "{} preflight failed ({})",
                preset.display_name,
                failure.as_str()
            )
        }
    }
}

fn print_choices() {
    for group in build_auth_choice_groups() {
        println!();
        println!(
            "  {} {}",
            style(group.label).white().bold(),
            style(format!("— {}", group.hint)).dim()
        );
        for option in group.options {
            println!(
                "  {} {:<16} {} {}",
                style("›").cyan(),
                option.value.as_str(),
                option.label,
                style(format!("({})", option.hint)).dim()
            );
        }
    }
}

fn write_shell_completion<W: Write>(shell: CompletionShell, writer: &mut W) -> Result<()> {
    use clap_complete::generate;
    use clap_complete::shells;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, bin_name.clone(), writer),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, bin_name.clone(), writer),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, bin_name.clone(), writer),
        CompletionShell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, bin_name.clone(), writer);
        }
        CompletionShell::Elvish => generate(shells::Elvish, &mut cmd, bin_name, writer),
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn onboard_cli_accepts_auth_choice() {
        let args = [
            "zeroclaw-onboard",
            "onboard",
            "--auth-choice",
            "lm-studio-local",
        ];
        let cli = Cli::try_parse_from(args).expect("onboard --auth-choice should parse");

        match cli.command {
            Commands::Onboard { auth_choice } => {
                assert_eq!(auth_choice, Some(AuthChoice::LmStudioLocal));
            }
            other => panic!("expected onboard command, got {other:?}"),
        }
    }

    #[test]
    fn onboard_cli_without_choice_prompts_later() {
        let cli =
            Cli::try_parse_from(["zeroclaw-onboard", "onboard"]).expect("onboard should parse");
        match cli.command {
            Commands::Onboard { auth_choice } => assert!(auth_choice.is_none()),
            other => panic!("expected onboard command, got {other:?}"),
        }
    }

    #[test]
    fn onboard_cli_rejects_unknown_auth_choice() {
        let args = ["zeroclaw-onboard", "onboard", "--auth-choice", "openrouter"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn preflight_cli_accepts_only_local_providers() {
        let cli = Cli::try_parse_from(["zeroclaw-onboard", "preflight", "ollama-local"])
            .expect("preflight ollama-local should parse");
        match cli.command {
            Commands::Preflight { provider } => assert_eq!(provider, LocalProvider::OllamaLocal),
            other => panic!("expected preflight command, got {other:?}"),
        }

        let args = ["zeroclaw-onboard", "preflight", "custom-api"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn global_config_dir_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["zeroclaw-onboard", "choices", "--config-dir", "/tmp/zc"])
            .expect("global --config-dir should parse");
        assert_eq!(cli.config_dir.as_deref(), Some("/tmp/zc"));
    }

    #[test]
    fn completions_cli_parses_supported_shells() {
        for shell in ["bash", "fish", "zsh", "powershell", "elvish"] {
            let cli = Cli::try_parse_from(["zeroclaw-onboard", "completions", shell])
                .expect("completions invocation should parse");
            match cli.command {
                Commands::Completions { .. } => {}
                other => panic!("expected completions command, got {other:?}"),
            }
        }
    }

    #[test]
    fn completion_generation_mentions_binary_name() {
        let mut output = Vec::new();
        write_shell_completion(CompletionShell::Bash, &mut output)
            .expect("completion generation should succeed");
        let script = String::from_utf8(output).expect("completion output should be valid utf-8");
        assert!(
            script.contains("zeroclaw-onboard"),
            "completion script should reference binary name"
        );
    }
}
