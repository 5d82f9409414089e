//! Generate Quiz use case
//!
//! Orchestrates the full generation flow:
//!
//! ```text
//! prompt ─> dispatch ─> validate_envelope ─> parse_content ─> check_quiz_schema
//!                                                               │ ok       │ err
//!                                                               ▼          ▼
//!                                                             Quiz <── repair + re-check
//! ```
//!
//! Transport faults are recovered inside the transport adapter; everything
//! that reaches this use case is surfaced immediately, typed, and wrapped
//! with the subject of the request.

use crate::ports::completion_transport::{CompletionTransport, DispatchError};
use crate::ports::progress::{GenerationProgress, GenerationStage, NoProgress};
use quizgen_domain::{
    CompletionRequest, ContentParseError, DomainError, Quiz, QuizPromptTemplate, QuizSource,
    RepairError, SchemaError, StructuralError, check_quiz_schema, parse_content, repair,
    validate_envelope,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a repaired candidate was still rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnrepairableCause {
    #[error(transparent)]
    Refused(#[from] RepairError),

    #[error("still invalid after repair: {0}")]
    StillInvalid(#[from] SchemaError),
}

/// Errors that can occur while generating a quiz
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizGenerationError {
    #[error("Invalid request: {0}")]
    InvalidSource(#[from] DomainError),

    #[error("Transport error: {0}")]
    Transport(#[from] DispatchError),

    #[error("Malformed response envelope: {0}")]
    Structural(#[from] StructuralError),

    #[error("Unparsable model output: {0}")]
    Parse(#[from] ContentParseError),

    #[error("Invalid quiz: {0}")]
    Schema(#[from] SchemaError),

    #[error("Quiz failed validation ({initial}) and could not be repaired: {cause}")]
    Unrepairable {
        initial: SchemaError,
        #[source]
        cause: UnrepairableCause,
    },
}

/// A [`QuizGenerationError`] with the subject of the request attached
///
/// Displays as `Failed to generate quiz about "<topic>": ...` or
/// `Failed to generate quiz from content: ...`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to generate quiz {subject}: {source}")]
pub struct GenerateQuizError {
    subject: String,
    source: QuizGenerationError,
}

impl GenerateQuizError {
    pub fn new(source_of_quiz: &QuizSource, error: QuizGenerationError) -> Self {
        Self {
            subject: source_of_quiz.describe(),
            source: error,
        }
    }

    /// The typed cause.
    pub fn kind(&self) -> &QuizGenerationError {
        &self.source
    }

    pub fn into_kind(self) -> QuizGenerationError {
        self.source
    }

    /// `about "<topic>"` or `from content`
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Use case for generating a validated quiz
pub struct GenerateQuizUseCase<T: CompletionTransport + ?Sized> {
    transport: Arc<T>,
}

impl<T: CompletionTransport + ?Sized> GenerateQuizUseCase<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Generate a quiz about `topic`.
    pub async fn generate_quiz(&self, topic: &str) -> Result<Quiz, GenerateQuizError> {
        let source = QuizSource::topic(topic);
        self.execute(source).await
    }

    /// Generate a quiz drawn from `content`.
    pub async fn generate_quiz_from_content(&self, content: &str) -> Result<Quiz, GenerateQuizError> {
        let source = QuizSource::content(content);
        self.execute(source).await
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, source: QuizSource) -> Result<Quiz, GenerateQuizError> {
        self.execute_with_progress(source, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        source: QuizSource,
        progress: &dyn GenerationProgress,
    ) -> Result<Quiz, GenerateQuizError> {
        match self.run(&source, progress).await {
            Ok(quiz) => {
                info!(
                    title = quiz.title(),
                    questions = quiz.question_count(),
                    "Quiz generated {}",
                    source
                );
                progress.on_complete(&quiz);
                Ok(quiz)
            }
            Err(e) => {
                let error = GenerateQuizError::new(&source, e);
                // The caller reports the error; keep a trace for -vv only
                debug!("{}", error);
                progress.on_failed(&error.to_string());
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        source: &QuizSource,
        progress: &dyn GenerationProgress,
    ) -> Result<Quiz, QuizGenerationError> {
        // Blank subjects are a caller error; never spend a request on them
        let source = match source {
            QuizSource::Topic(topic) => QuizSource::from_parts(Some(topic.clone()), None)?,
            QuizSource::Content(content) => QuizSource::from_parts(None, Some(content.clone()))?,
        };

        progress.on_stage(GenerationStage::Prompt);
        let request = CompletionRequest::user(QuizPromptTemplate::build(&source));

        progress.on_stage(GenerationStage::Dispatch);
        info!("Requesting quiz {}", source);
        let envelope = self.transport.dispatch(&request).await?;

        progress.on_stage(GenerationStage::Extract);
        let content = validate_envelope(&envelope)?;
        let candidate = parse_content(content)?;
        debug!("Model content parsed as JSON");

        progress.on_stage(GenerationStage::Validate);
        let candidate = match check_quiz_schema(&candidate) {
            Ok(()) => candidate,
            Err(initial) => {
                warn!(violation = %initial, "Generated quiz failed validation, attempting repair");
                progress.on_stage(GenerationStage::Repair);
                progress.on_repair(&initial);

                let repaired = match repair(&candidate) {
                    Ok(repaired) => repaired,
                    Err(e) => {
                        return Err(QuizGenerationError::Unrepairable {
                            initial,
                            cause: e.into(),
                        });
                    }
                };

                if let Err(e) = check_quiz_schema(&repaired) {
                    return Err(QuizGenerationError::Unrepairable {
                        initial,
                        cause: e.into(),
                    });
                }

                info!("Repaired quiz passed validation");
                repaired
            }
        };

        Ok(Quiz::from_validated(candidate)?)
    }
}
