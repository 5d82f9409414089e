//! Prompt templates for quiz generation

use crate::core::string::take_chars;
use crate::quiz::entities::{ANSWERS_PER_QUESTION, QUESTIONS_PER_QUIZ};
use crate::quiz::source::QuizSource;

/// Content longer than this (in characters) is cut before being embedded.
pub const MAX_CONTENT_CHARS: usize = 12_000;

/// Templates for generating quiz prompts
pub struct QuizPromptTemplate;

impl QuizPromptTemplate {
    /// Build the single user prompt for a generation request.
    pub fn build(source: &QuizSource) -> String {
        let task = match source {
            QuizSource::Topic(topic) => Self::topic_task(topic),
            QuizSource::Content(content) => Self::content_task(content),
        };

        format!("{}\n\n{}", task, Self::output_contract())
    }

    fn topic_task(topic: &str) -> String {
        format!(
            r#"Create a multiple-choice quiz about the following topic: "{}".

Requirements:
- Exactly {} questions.
- Each question has exactly {} answers, and exactly one of them is correct.
- Each question has a short explanation of why the correct answer is right.
- Give the quiz a concise title.
- Provide 3 to 5 keywords describing the quiz."#,
            topic.trim(),
            QUESTIONS_PER_QUIZ,
            ANSWERS_PER_QUESTION
        )
    }

    fn content_task(content: &str) -> String {
        format!(
            r#"Create a multiple-choice quiz based only on the content below.

Content:
"""
{}
"""

Requirements:
- Exactly {} questions, each answerable from the content.
- Each question has exactly {} answers, and exactly one of them is correct.
- Each question has a short explanation of why the correct answer is right.
- Give the quiz a concise title.
- Provide 3 to 5 keywords describing the quiz."#,
            take_chars(content.trim(), MAX_CONTENT_CHARS),
            QUESTIONS_PER_QUIZ,
            ANSWERS_PER_QUESTION
        )
    }

    /// The exact JSON shape the model must answer with.
    pub fn output_contract() -> &'static str {
        r#"Respond with ONLY a JSON object in exactly this shape, with no markdown, comments or any other text before or after it:

{
  "title": "string",
  "keywords": ["string"],
  "questions": [
    {
      "question_text": "string",
      "explanation": "string",
      "answers": [
        { "answer_text": "string", "is_correct": true },
        { "answer_text": "string", "is_correct": false },
        { "answer_text": "string", "is_correct": false },
        { "answer_text": "string", "is_correct": false }
      ]
    }
  ]
}"#
    }
}
