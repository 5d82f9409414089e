//! Prompt construction for quiz generation.

pub mod template;

pub use template::{MAX_CONTENT_CHARS, QuizPromptTemplate};
