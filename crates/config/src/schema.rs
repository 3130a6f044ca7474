/// Config schema types (server, LINE channel, LLM, data sources, bindings, routing).
use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorbotConfig {
    pub server: ServerConfig,
    pub line: LineConfig,
    pub llm: LlmConfig,
    pub data: DataConfig,
    pub bindings: BindingsConfig,
    pub routing: RoutingConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "0.0.0.0" so the platform can reach the webhook.
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// LINE Messaging API credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Channel secret used to verify `x-line-signature`.
    #[serde(serialize_with = "serialize_secret")]
    pub channel_secret: Secret<String>,

    /// Long-lived channel access token used for the reply API.
    #[serde(serialize_with = "serialize_secret")]
    pub channel_access_token: Secret<String>,

    /// Base URL of the Messaging API.
    pub api_base: String,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_secret", &"[REDACTED]")
            .field("channel_access_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: Secret::new(String::new()),
            channel_access_token: Secret::new(String::new()),
            api_base: "https://api.line.me".into(),
        }
    }
}

/// Language model provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// Caller-side timeout for one completion. Unset means no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            model: "gemini-1.5-flash-latest".into(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            timeout_secs: None,
        }
    }
}

/// Where student data sources and teacher notes live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory of `*.json` row files.
    pub dir: PathBuf,
    /// Directory of `<name>_<date>.txt` teacher notes.
    pub notes_dir: PathBuf,
    /// Column holding the student name.
    pub name_column: String,
    /// Column holding the student id, consulted only when id verification is on.
    pub id_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            notes_dir: PathBuf::from("notes"),
            name_column: "姓名".into(),
            id_column: "學號".into(),
        }
    }
}

/// Binding persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    pub path: PathBuf,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("auth/user_binding.json"),
        }
    }
}

/// Session routing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Identities that skip binding and always get unrestricted answers.
    pub test_identities: Vec<String>,
    /// Any of these appearing in a message logs the identity out.
    pub logout_phrases: Vec<String>,
    /// Require the login id to match the record's id column.
    pub verify_student_id: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            test_identities: vec!["Uxxxxxxxxxxxx".into()],
            logout_phrases: vec!["沒事了".into(), "登出".into(), "logout".into()],
            verify_student_id: false,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_layout() {
        let cfg = TutorbotConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.bindings.path, PathBuf::from("auth/user_binding.json"));
        assert_eq!(cfg.data.name_column, "姓名");
        assert_eq!(cfg.routing.test_identities, vec!["Uxxxxxxxxxxxx"]);
        assert!(cfg.routing.logout_phrases.iter().any(|p| p == "沒事了"));
        assert!(!cfg.routing.verify_student_id);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: TutorbotConfig = toml::from_str(
            r#"
            [line]
            channel_secret = "s3cret"

            [routing]
            test_identities = ["Uabc"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.line.channel_secret.expose_secret(), "s3cret");
        assert_eq!(cfg.line.api_base, "https://api.line.me");
        assert_eq!(cfg.routing.test_identities, vec!["Uabc"]);
        assert_eq!(cfg.routing.logout_phrases.len(), 3);
        assert_eq!(cfg.llm.model, "gemini-1.5-flash-latest");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut cfg = TutorbotConfig::default();
        cfg.line.channel_secret = Secret::new("top-secret".into());
        cfg.llm.api_key = Secret::new("key-123".into());
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("top-secret"));
        assert!(!dbg.contains("key-123"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
