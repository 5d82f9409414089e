//! Progress notification port
//!
//! Defines the interface for reporting progress during quiz generation.

use quizgen_domain::{Quiz, SchemaError};

/// Stages of a single generation request, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Prompt,
    Dispatch,
    Extract,
    Validate,
    Repair,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Prompt => "prompt",
            GenerationStage::Dispatch => "dispatch",
            GenerationStage::Extract => "extract",
            GenerationStage::Validate => "validate",
            GenerationStage::Repair => "repair",
        }
    }
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback for progress updates during quiz generation
///
/// Implementations live in the presentation layer.
pub trait GenerationProgress: Send + Sync {
    /// Called when a stage starts
    fn on_stage(&self, stage: GenerationStage);

    /// Called when the candidate failed validation and is about to be repaired
    fn on_repair(&self, _violation: &SchemaError) {}

    /// Called once with the validated quiz
    fn on_complete(&self, _quiz: &Quiz) {}

    /// Called once when generation fails
    fn on_failed(&self, _message: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl GenerationProgress for NoProgress {
    fn on_stage(&self, _stage: GenerationStage) {}
}
