//! `${VAR}` references in credential fields.

use secrecy::{ExposeSecret, Secret};

use crate::schema::TutorbotConfig;

/// Resolve credential fields written as `${VAR}` from the process environment.
///
/// Only the LINE channel secret, the LINE access token and the LLM API key
/// are considered. A reference to an unset variable is kept verbatim so
/// validation reports it as unresolved.
pub fn resolve_secret_refs(config: &mut TutorbotConfig) {
    resolve_secret_refs_with(config, |name| std::env::var(name).ok());
}

fn resolve_secret_refs_with(config: &mut TutorbotConfig, lookup: impl Fn(&str) -> Option<String>) {
    for slot in [
        &mut config.line.channel_secret,
        &mut config.line.channel_access_token,
        &mut config.llm.api_key,
    ] {
        let Some(name) = var_reference(slot.expose_secret()) else {
            continue;
        };
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            *slot = Secret::new(value);
        }
    }
}

/// `Some("NAME")` when the whole value is `${NAME}`.
fn var_reference(value: &str) -> Option<&str> {
    let name = value.trim().strip_prefix("${")?.strip_suffix('}')?;
    (!name.is_empty() && !name.contains(['$', '{', '}'])).then_some(name)
}
