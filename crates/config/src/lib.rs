//! Configuration loading, validation, and env substitution.
//!
//! Config files: `tutorbot.toml`, `tutorbot.yaml`, or `tutorbot.json`
//! Searched in `./` then `~/.config/tutorbot/`.
//!
//! Supports `${ENV_VAR}` substitution anywhere in the file, and falls back to
//! the `LINE_CHANNEL_SECRET`, `LINE_CHANNEL_ACCESS_TOKEN`, `GEMINI_API_KEY`
//! and `PORT` environment variables for unset values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        BindingsConfig, DataConfig, LineConfig, LlmConfig, RoutingConfig, ServerConfig,
        TutorbotConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
