use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{env_subst::resolve_secret_refs, schema::TutorbotConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "tutorbot.toml",
    "tutorbot.yaml",
    "tutorbot.yml",
    "tutorbot.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<TutorbotConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let mut config = parse_config(&raw, path)?;
    resolve_secret_refs(&mut config);
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tutorbot.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tutorbot/tutorbot.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TutorbotConfig::default()` if no config file is found. Environment
/// overrides are applied in every case.
pub fn discover_and_load() -> TutorbotConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                TutorbotConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        TutorbotConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/tutorbot/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tutorbot").map(|d| d.config_dir().to_path_buf())
}

/// Fill credentials and the port from the process environment when the
/// config file leaves them empty.
///
/// Reads `LINE_CHANNEL_SECRET`, `LINE_CHANNEL_ACCESS_TOKEN`, `GEMINI_API_KEY`
/// and `PORT`.
pub fn apply_env_overrides(config: &mut TutorbotConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut TutorbotConfig, lookup: impl Fn(&str) -> Option<String>) {
    fill_secret(
        &mut config.line.channel_secret,
        lookup("LINE_CHANNEL_SECRET"),
    );
    fill_secret(
        &mut config.line.channel_access_token,
        lookup("LINE_CHANNEL_ACCESS_TOKEN"),
    );
    fill_secret(&mut config.llm.api_key, lookup("GEMINI_API_KEY"));

    if let Some(port) = lookup("PORT") {
        match port.trim().parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(e) => warn!(value = %port, error = %e, "ignoring invalid PORT"),
        }
    }
}

fn fill_secret(slot: &mut Secret<String>, value: Option<String>) {
    if slot.expose_secret().is_empty()
        && let Some(v) = value.filter(|v| !v.is_empty())
    {
        *slot = Secret::new(v);
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<TutorbotConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutorbot.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[server]\nport = 8080\n[data]\ndir = \"scores\"").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.data.dir, PathBuf::from("scores"));
        assert_eq!(cfg.data.notes_dir, PathBuf::from("notes"));
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutorbot.yaml");
        std::fs::write(&path, "routing:\n  verify_student_id: true\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(cfg.routing.verify_student_id);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutorbot.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn env_fills_only_empty_secrets() {
        let mut cfg = TutorbotConfig::default();
        cfg.llm.api_key = Secret::new("from-file".into());
        apply_env_overrides_with(&mut cfg, |name| match name {
            "LINE_CHANNEL_SECRET" => Some("env-secret".into()),
            "GEMINI_API_KEY" => Some("env-key".into()),
            "PORT" => Some("7000".into()),
            _ => None,
        });
        assert_eq!(cfg.line.channel_secret.expose_secret(), "env-secret");
        assert_eq!(cfg.llm.api_key.expose_secret(), "from-file");
        assert!(cfg.line.channel_access_token.expose_secret().is_empty());
        assert_eq!(cfg.server.port, 7000);
    }

    #[test]
    fn invalid_port_is_ignored() {
        let mut cfg = TutorbotConfig::default();
        apply_env_overrides_with(&mut cfg, |name| (name == "PORT").then(|| "abc".to_string()));
        assert_eq!(cfg.server.port, 5000);
    }
}
