mod bindings_commands;
mod config_commands;
mod students_commands;

use std::path::{Path, PathBuf};

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use tutorbot_config::TutorbotConfig;

#[derive(Parser)]
#[command(name = "tutorbot", about = "tutorbot — LINE tutor-assistant gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "TUTORBOT_CONFIG")]
    config: Option<PathBuf>,

    // Gateway arguments (used when no subcommand is provided, or with `gateway` subcommand)
    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Inspect or edit identity bindings.
    Bindings {
        #[command(subcommand)]
        action: bindings_commands::BindingsAction,
    },
    /// Query the student data sources.
    Students {
        #[command(subcommand)]
        action: students_commands::StudentsAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load `--config` when given, otherwise discover the config file. Env
/// fallbacks apply either way.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<TutorbotConfig> {
    match explicit {
        Some(path) => {
            let mut config = tutorbot_config::load_config(path)?;
            tutorbot_config::apply_env_overrides(&mut config);
            Ok(config)
        },
        None => Ok(tutorbot_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tutorbot starting");

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Gateway) => {
            // CLI args override config values
            if let Some(bind) = cli.bind {
                config.server.bind = bind;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            tutorbot_gateway::start_gateway(config).await
        },
        Some(Commands::Bindings { action }) => {
            bindings_commands::handle_bindings(action, &config).await
        },
        Some(Commands::Students { action }) => {
            students_commands::handle_students(action, &config).await
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, &config, cli.config.as_deref())
        },
    }
}
