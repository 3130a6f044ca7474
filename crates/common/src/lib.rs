//! Student row types and the error-context helpers shared by tutorbot crates.

pub mod error;
pub mod types;

pub use error::FromMessage;
