//! Domain layer for quizgen
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Quiz
//!
//! A [`Quiz`] is a title, up to five keywords and a list of questions, each
//! with exactly four answers of which exactly one is correct. A `Quiz` value
//! can only be built from a candidate that passed the schema check.
//!
//! ## Response recovery
//!
//! Model output travels through:
//!
//! ```text
//! Envelope ──validate_envelope──> &str ──parse_content──> Value
//!     ──check_quiz_schema──> ok ──────────────────────────────> Quiz
//!                         └─ err ──repair──check_quiz_schema──> Quiz | unrepairable
//! ```

pub mod completion;
pub mod core;
pub mod prompt;
pub mod quiz;

// Re-export commonly used types
pub use completion::{
    ChatMessage, CompletionRequest, ContentParseError, Envelope, Role, StructuralError,
    parse_content, validate_envelope,
};
pub use crate::core::error::DomainError;
pub use prompt::QuizPromptTemplate;
pub use quiz::{
    Answer, Question, Quiz, QuizSource, RepairError, SchemaError, check_quiz_schema,
    matches_quiz_schema, repair,
};
