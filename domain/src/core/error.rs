//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Either a topic or content is required to generate a quiz")]
    MissingSource,

    #[error("A topic and content were both given; pick one")]
    AmbiguousSource,
}
