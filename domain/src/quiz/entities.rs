//! Quiz entities
//!
//! A [`Quiz`] can only be built from a candidate that passed
//! [`check_quiz_schema`](super::schema::check_quiz_schema), so every value of
//! this type upholds the one-correct-answer-out-of-four invariant.

use super::schema::{SchemaError, check_quiz_schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of questions the model is asked to generate.
pub const QUESTIONS_PER_QUIZ: usize = 5;

/// Every question carries exactly this many answers.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// Upper bound on the keyword list.
pub const MAX_KEYWORDS: usize = 5;

/// A single answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer_text: String,
    pub is_correct: bool,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_text: String,
    pub explanation: String,
    pub answers: Vec<Answer>,
}

impl Question {
    /// The single correct answer.
    ///
    /// Only meaningful for questions that came out of a validated [`Quiz`].
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }

    /// Zero-based index of the correct answer.
    pub fn correct_index(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.is_correct)
    }
}

/// A validated quiz (Entity)
///
/// Immutable once constructed; owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    title: String,
    keywords: Vec<String>,
    questions: Vec<Question>,
}

impl Quiz {
    /// Convert a schema-compliant candidate into a typed quiz.
    ///
    /// Keywords are not part of the schema predicate, so they are
    /// normalised here: non-string and blank entries are dropped, the rest
    /// trimmed and capped at [`MAX_KEYWORDS`].
    pub fn from_validated(data: Value) -> Result<Self, SchemaError> {
        check_quiz_schema(&data)?;

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let keywords = data
            .get("keywords")
            .and_then(Value::as_array)
            .map(|items| normalize_keywords(items))
            .unwrap_or_default();

        let questions = data
            .get("questions")
            .cloned()
            .map(serde_json::from_value::<Vec<Question>>)
            .transpose()
            .map_err(|e| SchemaError::new("questions", e.to_string()))?
            .unwrap_or_default();

        Ok(Self {
            title,
            keywords,
            questions,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

impl TryFrom<Value> for Quiz {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Quiz::from_validated(value)
    }
}

/// Keep string entries that are non-blank after trimming, at most [`MAX_KEYWORDS`].
pub(crate) fn normalize_keywords(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}
