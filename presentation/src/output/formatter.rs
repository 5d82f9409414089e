//! Output formatter trait

use crate::cli::commands::OutputFormat;
use quizgen_domain::Quiz;

/// Trait for formatting generated quizzes
pub trait OutputFormatter {
    /// Human-readable rendering
    fn format(&self, quiz: &Quiz) -> String;

    /// Format as JSON
    fn format_json(&self, quiz: &Quiz) -> String;

    /// Render in the format selected with `--output`
    fn render(&self, quiz: &Quiz, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(quiz),
            OutputFormat::Json => self.format_json(quiz),
        }
    }
}
