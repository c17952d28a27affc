#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::needless_pass_by_value,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unnecessary_literal_bound,
    clippy::unnecessary_wraps
)]

pub mod config;
pub mod onboard;

pub use config::Config;
pub use onboard::{
    apply_auth_choice, apply_local_auth_choice, run_onboarding, ApplyAuthChoiceParams,
    ApplyAuthChoiceResult, AuthChoice,
};
