//! Progress reporting for quiz generation

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quizgen_application::ports::progress::{GenerationProgress, GenerationStage};
use quizgen_domain::{Quiz, SchemaError};
use std::io::{Stderr, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner on stderr
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Spinner prefixed with what is being generated, e.g. `about "Volcanoes"`.
    pub fn new(subject: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(bar, subject)
    }

    fn with_bar(bar: ProgressBar, subject: &str) -> Self {
        bar.set_style(Self::spinner_style());
        bar.set_prefix(format!("Quiz {}", subject));
        Self { bar }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn stage_message(stage: GenerationStage) -> &'static str {
        match stage {
            GenerationStage::Prompt => "Building prompt...",
            GenerationStage::Dispatch => "Waiting for the model...",
            GenerationStage::Extract => "Reading response...",
            GenerationStage::Validate => "Validating quiz...",
            GenerationStage::Repair => "Repairing quiz...",
        }
    }
}

impl GenerationProgress for ProgressReporter {
    fn on_stage(&self, stage: GenerationStage) {
        self.bar.set_message(Self::stage_message(stage));
    }

    fn on_repair(&self, violation: &SchemaError) {
        self.bar
            .println(format!("  {} {}", "!".yellow(), violation));
    }

    fn on_complete(&self, quiz: &Quiz) {
        self.bar.finish_with_message(format!(
            "{} {} questions",
            "v".green(),
            quiz.question_count()
        ));
    }

    fn on_failed(&self, _message: &str) {
        self.bar.abandon_with_message(format!("{}", "x failed".red()));
    }
}

/// Plain line-per-event progress for non-interactive stderr
pub struct SimpleProgress<W: Write + Send = Stderr> {
    out: Mutex<W>,
}

impl SimpleProgress {
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }
}

impl<W: Write + Send> SimpleProgress<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: std::fmt::Arguments<'_>) {
        if let Ok(mut out) = self.out.lock() {
            // Progress output is best-effort
            let _ = writeln!(out, "{}", text);
        }
    }
}

impl<W: Write + Send> GenerationProgress for SimpleProgress<W> {
    fn on_stage(&self, stage: GenerationStage) {
        self.line(format_args!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::stage_message(stage).bold()
        ));
    }

    fn on_repair(&self, violation: &SchemaError) {
        self.line(format_args!("  {} {}", "!".yellow(), violation));
    }

    fn on_complete(&self, quiz: &Quiz) {
        self.line(format_args!(
            "  {} {} questions",
            "v".green(),
            quiz.question_count()
        ));
    }

    fn on_failed(&self, _message: &str) {
        self.line(format_args!("  {} failed", "x".red()));
    }
}

/// Spinner on a terminal, plain lines otherwise.
pub fn progress_for(subject: &str, interactive: bool) -> Box<dyn GenerationProgress> {
    if interactive {
        Box::new(ProgressReporter::new(subject))
    } else {
        Box::new(SimpleProgress::stderr())
    }
}
