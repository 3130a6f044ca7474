//! Collaborator doubles shared by the routing tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use {async_trait::async_trait, tokio::sync::Notify};

use {
    tutorbot_agents::{AnswerError, AnswerService},
    tutorbot_common::types::StudentRecord,
    tutorbot_sessions::{BindingRecord, BindingStore},
    tutorbot_students::StudentDirectory,
};

/// In-memory student rows keyed by name.
pub struct FakeDirectory {
    rows: HashMap<String, StudentRecord>,
    unavailable: bool,
}

impl FakeDirectory {
    pub fn with_students(students: &[(&str, &str)]) -> Self {
        let rows = students
            .iter()
            .map(|(id, name)| {
                let mut record = StudentRecord::new();
                record.insert("學號", *id);
                record.insert("姓名", *name);
                (name.to_string(), record)
            })
            .collect();
        Self {
            rows,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            rows: HashMap::new(),
            unavailable: true,
        }
    }

    fn check(&self) -> tutorbot_students::Result<()> {
        if self.unavailable {
            return Err(tutorbot_students::Error::Message("data dir gone".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for FakeDirectory {
    async fn query_student(&self, name: &str) -> tutorbot_students::Result<Option<StudentRecord>> {
        self.check()?;
        Ok(self.rows.get(name).cloned())
    }

    async fn all_names(&self) -> tutorbot_students::Result<Vec<String>> {
        self.check()?;
        Ok(self.rows.keys().cloned().collect())
    }

    async fn all_records(&self) -> tutorbot_students::Result<Vec<StudentRecord>> {
        self.check()?;
        Ok(self.rows.values().cloned().collect())
    }
}

enum Identify {
    Nobody,
    Name(String),
    Fail,
}

/// Answer service that counts calls and returns canned text.
pub struct CountingAnswers {
    identify: Identify,
    analysis_error: Option<fn() -> AnswerError>,
    stall: bool,
    analysis_entered: Notify,
    summaries: AtomicUsize,
    analyses: AtomicUsize,
    identifications: AtomicUsize,
    last_subject: Mutex<Option<String>>,
}

impl Default for CountingAnswers {
    fn default() -> Self {
        Self {
            identify: Identify::Nobody,
            analysis_error: None,
            stall: false,
            analysis_entered: Notify::new(),
            summaries: AtomicUsize::new(0),
            analyses: AtomicUsize::new(0),
            identifications: AtomicUsize::new(0),
            last_subject: Mutex::new(None),
        }
    }
}

impl CountingAnswers {
    pub fn identifying(name: &str) -> Self {
        Self {
            identify: Identify::Name(name.to_string()),
            ..Self::default()
        }
    }

    pub fn identify_failing() -> Self {
        Self {
            identify: Identify::Fail,
            ..Self::default()
        }
    }

    pub fn analysis_failing(make: fn() -> AnswerError) -> Self {
        Self {
            analysis_error: Some(make),
            ..Self::default()
        }
    }

    /// `analyze_question` never returns.
    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    /// Resolves once `analyze_question` has been entered.
    pub async fn analysis_started(&self) {
        self.analysis_entered.notified().await;
    }

    pub fn summary_calls(&self) -> usize {
        self.summaries.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyses.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.summary_calls() + self.analyze_calls() + self.identifications.load(Ordering::SeqCst)
    }

    pub fn last_subject(&self) -> Option<String> {
        self.last_subject.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerService for CountingAnswers {
    async fn generate_reply(&self, record: &StudentRecord) -> Result<String, AnswerError> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("summary of {}", record.get("姓名").unwrap_or("?")))
    }

    async fn analyze_question(
        &self,
        _question: &str,
        default_subject: Option<&str>,
    ) -> Result<String, AnswerError> {
        self.analyses.fetch_add(1, Ordering::SeqCst);
        *self.last_subject.lock().unwrap() = default_subject.map(str::to_string);
        self.analysis_entered.notify_one();
        if self.stall {
            std::future::pending::<()>().await;
        }
        match self.analysis_error {
            Some(make) => Err(make()),
            None => Ok("analysis".to_string()),
        }
    }

    async fn identify_student(&self, _text: &str) -> Result<Option<String>, AnswerError> {
        self.identifications.fetch_add(1, Ordering::SeqCst);
        match &self.identify {
            Identify::Nobody => Ok(None),
            Identify::Name(name) => Ok(Some(name.clone())),
            Identify::Fail => Err(AnswerError::ExternalService("HTTP 500".into())),
        }
    }
}

/// Binding store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl BindingStore for FailingStore {
    async fn get(&self, _identity: &str) -> tutorbot_sessions::Result<Option<BindingRecord>> {
        Err(tutorbot_sessions::Error::lock_failed("disk full"))
    }

    async fn put(&self, _identity: &str, _id: &str, _name: &str) -> tutorbot_sessions::Result<()> {
        Err(tutorbot_sessions::Error::lock_failed("disk full"))
    }

    async fn remove(&self, _identity: &str) -> tutorbot_sessions::Result<bool> {
        Err(tutorbot_sessions::Error::lock_failed("disk full"))
    }

    async fn list(&self) -> tutorbot_sessions::Result<Vec<(String, BindingRecord)>> {
        Err(tutorbot_sessions::Error::lock_failed("disk full"))
    }
}
