//! Quiz subdomain.
//!
//! - [`entities`]: [`Quiz`](entities::Quiz), [`Question`](entities::Question), [`Answer`](entities::Answer)
//! - [`schema`]: structural predicate over untyped candidates
//! - [`repair`]: single best-effort repair pass
//! - [`source`]: topic or content a quiz is generated from

pub mod entities;
pub mod repair;
pub mod schema;
pub mod source;

pub use entities::{ANSWERS_PER_QUESTION, Answer, MAX_KEYWORDS, QUESTIONS_PER_QUIZ, Question, Quiz};
pub use repair::{RepairError, repair};
pub use schema::{SchemaError, check_quiz_schema, matches_quiz_schema};
pub use source::QuizSource;
