//! Console output formatter for generated quizzes

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use quizgen_domain::{Question, Quiz};

const ANSWER_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Formats quizzes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete quiz with correct answers and explanations
    pub fn format(quiz: &Quiz) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(quiz.title()));
        output.push('\n');

        if !quiz.keywords().is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Keywords:".cyan().bold(),
                quiz.keywords().join(", ")
            ));
        }

        for (index, question) in quiz.questions().iter().enumerate() {
            output.push_str(&Self::format_question(index, question));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(quiz: &Quiz) -> String {
        serde_json::to_string_pretty(quiz).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_question(index: usize, question: &Question) -> String {
        let mut output = Self::section_header(&format!(
            "Q{}. {}",
            index + 1,
            question.question_text
        ));

        for (i, answer) in question.answers.iter().enumerate() {
            let label = ANSWER_LABELS
                .get(i)
                .map(|c| c.to_string())
                .unwrap_or_else(|| (i + 1).to_string());

            if answer.is_correct {
                output.push_str(&format!(
                    "  {} {}) {}\n",
                    "v".green().bold(),
                    label,
                    answer.answer_text.green()
                ));
            } else {
                output.push_str(&format!("    {}) {}\n", label, answer.answer_text));
            }
        }

        output.push_str(&format!(
            "\n{}\n",
            Self::indent(&question.explanation, "    ").dimmed()
        ));

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, quiz: &Quiz) -> String {
        Self::format(quiz)
    }

    fn format_json(&self, quiz: &Quiz) -> String {
        Self::format_json(quiz)
    }
}
