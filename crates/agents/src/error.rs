/// Why an answer could not be produced.
///
/// The set is closed: every failure during answer generation lands in one of
/// these kinds, and [`AnswerError::fallback_text`] is the only place that
/// decides what the user is told.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("language model call failed: {0}")]
    ExternalService(String),
}

impl AnswerError {
    /// Fixed user-facing text for this kind of failure.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            Self::StudentNotFound(_) => "很抱歉，查無此學生資料，請確認姓名是否正確輸入。",
            Self::ExternalService(_) => "目前 AI 回應配額已用完或服務異常，請稍後再試。",
            Self::DataSourceUnavailable(_) => "分析資料時發生錯誤，請稍後再試。",
        }
    }

    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StudentNotFound(_) => "student_not_found",
            Self::DataSourceUnavailable(_) => "data_source_unavailable",
            Self::ExternalService(_) => "external_service",
        }
    }

    pub fn external(err: &anyhow::Error) -> Self {
        Self::ExternalService(format!("{err:#}"))
    }
}

impl From<tutorbot_students::Error> for AnswerError {
    fn from(err: tutorbot_students::Error) -> Self {
        Self::DataSourceUnavailable(err.to_string())
    }
}
