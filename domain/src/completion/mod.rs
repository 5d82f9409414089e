//! Chat-completion wire concepts and response recovery.
//!
//! - [`request`]: what is sent
//! - [`envelope`]: what comes back, and its structural validation
//! - [`parsing`]: tolerant JSON extraction from the model's text

pub mod envelope;
pub mod parsing;
pub mod request;

pub use envelope::{Choice, ChoiceMessage, Envelope, StructuralError, validate_envelope};
pub use parsing::{ContentParseError, extract_brace_span, parse_content};
pub use request::{ChatMessage, CompletionRequest, Role};
