//! Answer generation: the language-model provider and the prompts built over
//! student rows and teacher notes.

pub mod answer;
pub mod error;
pub mod model;
pub mod prompt;
pub mod providers;

pub use {
    answer::{AnswerService, LlmAnswerService},
    error::AnswerError,
    model::LlmProvider,
    providers::gemini::GeminiProvider,
};
