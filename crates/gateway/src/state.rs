use std::{sync::Arc, time::Duration};

use secrecy::{ExposeSecret, Secret};

use {
    tutorbot_agents::{GeminiProvider, LlmAnswerService},
    tutorbot_config::TutorbotConfig,
    tutorbot_line::{LineReplyClient, ReplyOutbound},
    tutorbot_routing::{RouterSettings, SessionRouter},
    tutorbot_sessions::JsonFileBindingStore,
    tutorbot_students::{FsNoteStore, FsStudentDirectory, NoteStore},
};

/// Everything a request handler needs, shared across connections.
pub struct GatewayState {
    pub version: String,
    pub router: SessionRouter,
    pub outbound: Arc<dyn ReplyOutbound>,
    pub notes: Arc<dyn NoteStore>,
    channel_secret: Secret<String>,
}

impl GatewayState {
    pub fn new(
        router: SessionRouter,
        outbound: Arc<dyn ReplyOutbound>,
        notes: Arc<dyn NoteStore>,
        channel_secret: Secret<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            router,
            outbound,
            notes,
            channel_secret,
        })
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &TutorbotConfig) -> anyhow::Result<Arc<Self>> {
        let directory = Arc::new(FsStudentDirectory::new(
            &config.data.dir,
            &config.data.name_column,
        ));
        let notes = Arc::new(FsNoteStore::new(&config.data.notes_dir));

        let mut provider = GeminiProvider::new(
            config.llm.api_key.clone(),
            config.llm.model.clone(),
            config.llm.base_url.clone(),
        );
        if let Some(secs) = config.llm.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs))?;
        }

        let answers = Arc::new(LlmAnswerService::new(
            Arc::clone(&directory) as _,
            Arc::clone(&notes) as _,
            Arc::new(provider),
            &config.data.name_column,
        ));
        let store = Arc::new(JsonFileBindingStore::new(&config.bindings.path));
        let router = SessionRouter::new(
            store,
            directory,
            answers,
            RouterSettings::from_config(&config.routing, &config.data),
        );
        let outbound = Arc::new(LineReplyClient::new(
            config.line.channel_access_token.clone(),
            config.line.api_base.clone(),
        ));

        Ok(Self::new(
            router,
            outbound,
            notes,
            config.line.channel_secret.clone(),
        ))
    }

    pub fn channel_secret(&self) -> &str {
        self.channel_secret.expose_secret()
    }
}
