use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{debug, info},
};

use {
    tutorbot_common::types::{StudentRecord, normalize_name},
    tutorbot_students::{NoteStore, StudentDirectory, closest_match},
};

use crate::{error::AnswerError, model::LlmProvider, prompt};

/// Minimum similarity for the model's pick to count as a known student.
pub const NAME_MATCH_CUTOFF: f64 = 0.6;

/// Produces reply text for questions about students.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Short analysis of one student's record.
    async fn generate_reply(&self, record: &StudentRecord) -> Result<String, AnswerError>;

    /// Open question over all score data and notes. `default_subject` names
    /// the student the question is about when the text does not say.
    async fn analyze_question(
        &self,
        question: &str,
        default_subject: Option<&str>,
    ) -> Result<String, AnswerError>;

    /// Which known student, if any, `text` is about.
    async fn identify_student(&self, text: &str) -> Result<Option<String>, AnswerError>;
}

/// [`AnswerService`] backed by the student data and a language model.
///
/// Nothing is cached: every call reads the data sources again.
pub struct LlmAnswerService {
    directory: Arc<dyn StudentDirectory>,
    notes: Arc<dyn NoteStore>,
    llm: Arc<dyn LlmProvider>,
    name_column: String,
}

impl LlmAnswerService {
    pub fn new(
        directory: Arc<dyn StudentDirectory>,
        notes: Arc<dyn NoteStore>,
        llm: Arc<dyn LlmProvider>,
        name_column: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            notes,
            llm,
            name_column: name_column.into(),
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String, AnswerError> {
        self.llm
            .complete(prompt)
            .await
            .map_err(|e| AnswerError::external(&e))
    }
}

#[async_trait]
impl AnswerService for LlmAnswerService {
    async fn generate_reply(&self, record: &StudentRecord) -> Result<String, AnswerError> {
        if record.is_empty() {
            return Err(AnswerError::StudentNotFound("empty record".into()));
        }
        self.ask(&prompt::student_summary(record)).await
    }

    async fn analyze_question(
        &self,
        question: &str,
        default_subject: Option<&str>,
    ) -> Result<String, AnswerError> {
        let mut records = self.directory.all_records().await?;
        let mut notes = self.notes.all_notes().await?;

        if let Some(subject) = default_subject {
            let wanted = normalize_name(subject);
            let own_records: Vec<StudentRecord> = records
                .iter()
                .filter(|r| {
                    r.get(&self.name_column)
                        .is_some_and(|cell| normalize_name(cell) == wanted)
                })
                .cloned()
                .collect();
            let own_notes: Vec<_> = notes
                .iter()
                .filter(|n| normalize_name(&n.student_name) == wanted)
                .cloned()
                .collect();
            if !own_records.is_empty() || !own_notes.is_empty() {
                records = own_records;
                notes = own_notes;
            }
        }

        debug!(
            rows = records.len(),
            notes = notes.len(),
            subject = default_subject.unwrap_or(""),
            "analyzing question"
        );
        let prompt = prompt::analyze_question(question, default_subject, &records, &notes);
        self.ask(&prompt).await
    }

    async fn identify_student(&self, text: &str) -> Result<Option<String>, AnswerError> {
        let names = self.directory.all_names().await?;
        if names.is_empty() {
            return Ok(None);
        }
        let raw = self.ask(&prompt::identify_student(text, &names)).await?;
        let picked = normalize_name(raw.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '「' | '」' | '"' | '\'' | '。')
        }));
        if picked.is_empty() || picked == prompt::NO_STUDENT_MARKER {
            return Ok(None);
        }
        let matched = closest_match(&picked, names.iter().map(String::as_str), NAME_MATCH_CUTOFF)
            .map(str::to_string);
        info!(picked = %picked, matched = ?matched, "identified student");
        Ok(matched)
    }
}
