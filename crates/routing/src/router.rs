use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, warn};

use {
    tutorbot_agents::{AnswerError, AnswerService},
    tutorbot_config::{DataConfig, RoutingConfig},
    tutorbot_sessions::{BindingRecord, BindingStore, IdentityLocks},
    tutorbot_students::StudentDirectory,
};

use crate::{
    Result,
    guard::{AccessPolicy, MentionsBoundSubject},
    login::{LoginOutcome, attempt_login},
    messages,
};

/// Which of the four routing branches handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Logout,
    TestPassthrough,
    BoundQuery,
    Unauthenticated,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::TestPassthrough => "test_passthrough",
            Self::BoundQuery => "bound_query",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing decision for one message, before anything is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Logout,
    TestPassthrough,
    BoundQuery(BindingRecord),
    Unauthenticated,
}

impl RouteDecision {
    pub fn route(&self) -> Route {
        match self {
            Self::Logout => Route::Logout,
            Self::TestPassthrough => Route::TestPassthrough,
            Self::BoundQuery(_) => Route::BoundQuery,
            Self::Unauthenticated => Route::Unauthenticated,
        }
    }

    /// Whether executing this decision writes the binding.
    pub fn mutates_binding(&self) -> bool {
        matches!(self, Self::Logout | Self::Unauthenticated)
    }
}

/// Text to send back, and the branch that produced it.
///
/// `route` is `None` only when the binding state could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub route: Option<Route>,
}

#[derive(Debug, Clone, Default)]
pub struct RouterSettings {
    pub test_identities: HashSet<String>,
    pub logout_phrases: Vec<String>,
    /// Record column the login id must match, when id verification is on.
    pub verify_id_column: Option<String>,
}

impl RouterSettings {
    pub fn from_config(routing: &RoutingConfig, data: &DataConfig) -> Self {
        Self {
            test_identities: routing
                .test_identities
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            logout_phrases: routing
                .logout_phrases
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect(),
            verify_id_column: (routing.verify_student_id && !data.id_column.is_empty())
                .then(|| data.id_column.clone()),
        }
    }

    pub fn is_test_identity(&self, identity: &str) -> bool {
        self.test_identities.contains(identity)
    }

    pub fn is_logout(&self, text: &str) -> bool {
        self.logout_phrases.iter().any(|p| text.contains(p.as_str()))
    }
}

/// Routes each inbound text message from the identity's current binding.
///
/// Every message re-reads the binding; nothing about a conversation is kept
/// in memory. The binding read and any logout or login write for one identity
/// happen under that identity's lock. Answer generation runs after the lock
/// is released, so a slow answer never holds up the next message.
pub struct SessionRouter {
    store: Arc<dyn BindingStore>,
    directory: Arc<dyn StudentDirectory>,
    answers: Arc<dyn AnswerService>,
    policy: Arc<dyn AccessPolicy>,
    settings: RouterSettings,
    locks: IdentityLocks,
}

impl SessionRouter {
    pub fn new(
        store: Arc<dyn BindingStore>,
        directory: Arc<dyn StudentDirectory>,
        answers: Arc<dyn AnswerService>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            store,
            directory,
            answers,
            policy: Arc::new(MentionsBoundSubject),
            settings,
            locks: IdentityLocks::new(),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Pick the branch for `text` without acting on it.
    pub async fn decide(&self, identity: &str, text: &str) -> Result<RouteDecision> {
        if self.settings.is_logout(text) {
            return Ok(RouteDecision::Logout);
        }
        if self.settings.is_test_identity(identity) {
            return Ok(RouteDecision::TestPassthrough);
        }
        Ok(match self.store.get(identity).await? {
            Some(binding) => RouteDecision::BoundQuery(binding),
            None => RouteDecision::Unauthenticated,
        })
    }

    /// Route and answer one message. Never fails: every error becomes one of
    /// the fixed fallback texts.
    pub async fn handle(&self, identity: &str, text: &str) -> Reply {
        let text = text.trim();
        let guard = self.locks.acquire(identity).await;

        let decision = match self.decide(identity, text).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(identity, error = %e, "could not read binding");
                drop(guard);
                self.locks.prune();
                return Reply {
                    text: unavailable_text(),
                    route: None,
                };
            },
        };
        let route = decision.route();
        debug!(identity, route = %route, "routing message");

        let reply_text = if decision.mutates_binding() {
            let reply_text = self.execute(identity, text, decision).await;
            drop(guard);
            reply_text
        } else {
            drop(guard);
            self.execute(identity, text, decision).await
        };

        self.locks.prune();
        Reply {
            text: reply_text,
            route: Some(route),
        }
    }

    async fn execute(&self, identity: &str, text: &str, decision: RouteDecision) -> String {
        match decision {
            RouteDecision::Logout => match self.store.remove(identity).await {
                Ok(removed) => {
                    info!(identity, removed, "logout");
                    messages::LOGOUT_CONFIRMATION.to_string()
                },
                Err(e) => {
                    warn!(identity, error = %e, "logout failed");
                    unavailable_text()
                },
            },
            RouteDecision::TestPassthrough => self.unrestricted(identity, text).await,
            RouteDecision::BoundQuery(binding) => {
                if !self.policy.permits(&binding, text) {
                    info!(
                        identity,
                        student = %binding.name,
                        policy = self.policy.name(),
                        "question refused by access guard"
                    );
                    return messages::access_denied(&binding.name);
                }
                answer_text(
                    identity,
                    self.answers
                        .analyze_question(text, Some(&binding.name))
                        .await,
                )
            },
            RouteDecision::Unauthenticated => {
                let outcome = attempt_login(
                    identity,
                    text,
                    self.directory.as_ref(),
                    self.store.as_ref(),
                    self.settings.verify_id_column.as_deref(),
                )
                .await;
                match outcome {
                    Ok(LoginOutcome::Bound(binding)) => {
                        info!(identity, student = %binding.name, "identity bound");
                        messages::login_success(&binding.name)
                    },
                    Ok(LoginOutcome::Rejected(reason)) => {
                        debug!(identity, ?reason, "login rejected");
                        messages::LOGIN_PROMPT.to_string()
                    },
                    Err(e) => {
                        warn!(identity, error = %e, "could not save binding");
                        unavailable_text()
                    },
                }
            },
        }
    }

    /// Answer without any access restriction: a single-student summary when
    /// the text names a known student, otherwise open analysis.
    async fn unrestricted(&self, identity: &str, text: &str) -> String {
        let name = match self.answers.identify_student(text).await {
            Ok(name) => name,
            Err(e) => {
                warn!(identity, kind = e.kind(), error = %e, "student identification failed");
                None
            },
        };

        let Some(name) = name else {
            return answer_text(identity, self.answers.analyze_question(text, None).await);
        };

        match self.directory.query_student(&name).await {
            Ok(Some(record)) => answer_text(identity, self.answers.generate_reply(&record).await),
            Ok(None) => messages::no_record_for(&name),
            Err(e) => answer_text(identity, Err(AnswerError::from(e))),
        }
    }
}

fn answer_text(identity: &str, result: std::result::Result<String, AnswerError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(identity, kind = e.kind(), error = %e, "answer generation failed");
            e.fallback_text().to_string()
        },
    }
}

fn unavailable_text() -> String {
    AnswerError::DataSourceUnavailable(String::new())
        .fallback_text()
        .to_string()
}
