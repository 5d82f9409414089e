//! Application layer for quizgen
//!
//! This crate contains the quiz generation use case and the ports its
//! adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    completion_transport::{CompletionTransport, DispatchError},
    progress::{GenerationProgress, GenerationStage, NoProgress},
};
pub use use_cases::generate_quiz::{
    GenerateQuizError, GenerateQuizUseCase, QuizGenerationError, UnrepairableCause,
};
