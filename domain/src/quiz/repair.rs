//! Best-effort repair of near-valid quiz candidates.
//!
//! [`repair`] is a pure transformation: it reads the candidate and returns a
//! new value, leaving the input untouched. It does not guarantee schema
//! compliance; the caller re-validates the result exactly once.
//!
//! Answer arrays longer than [`ANSWERS_PER_QUESTION`] are left as they are,
//! so such candidates still fail re-validation.

use super::entities::{ANSWERS_PER_QUESTION, normalize_keywords};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Title used when the candidate has none.
pub const PLACEHOLDER_TITLE: &str = "Generated Quiz";

/// Explanation used when a question has none.
pub const PLACEHOLDER_EXPLANATION: &str = "No explanation provided";

/// How many keywords to derive from the title when none survive.
const DERIVED_KEYWORD_LIMIT: usize = 3;

/// Title words must be longer than this to become keywords.
const DERIVED_KEYWORD_MIN_CHARS: usize = 3;

/// Candidate cannot be repaired at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepairError {
    #[error("`questions` is not an array; there is nothing to repair")]
    QuestionsNotArray,
}

/// Nudge `data` towards schema compliance.
pub fn repair(data: &Value) -> Result<Value, RepairError> {
    let source = data.as_object().cloned().unwrap_or_default();
    let mut repaired = source.clone();

    let title = non_blank_title(&source).unwrap_or(PLACEHOLDER_TITLE).to_string();
    repaired.insert("title".to_string(), Value::String(title.clone()));

    let keywords = repair_keywords(source.get("keywords"), &title);
    repaired.insert(
        "keywords".to_string(),
        Value::Array(keywords.into_iter().map(Value::String).collect()),
    );

    let questions = source
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(RepairError::QuestionsNotArray)?;

    let questions = questions
        .iter()
        .enumerate()
        .map(|(index, question)| repair_question(index, question))
        .collect();
    repaired.insert("questions".to_string(), Value::Array(questions));

    Ok(Value::Object(repaired))
}

fn non_blank_title(quiz: &Map<String, Value>) -> Option<&str> {
    quiz.get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
}

fn repair_keywords(keywords: Option<&Value>, title: &str) -> Vec<String> {
    let items = keywords
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let keywords = normalize_keywords(items);
    if !keywords.is_empty() {
        return keywords;
    }

    derive_keywords(title)
}

/// Words of the title longer than three characters, in order, at most three.
pub fn derive_keywords(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .filter(|word| word.chars().count() > DERIVED_KEYWORD_MIN_CHARS)
        .take(DERIVED_KEYWORD_LIMIT)
        .map(str::to_string)
        .collect()
}

fn repair_question(index: usize, question: &Value) -> Value {
    let mut question = question.as_object().cloned().unwrap_or_default();

    if !question.get("question_text").is_some_and(Value::is_string) {
        question.insert(
            "question_text".to_string(),
            Value::String(format!("Question {}", index + 1)),
        );
    }

    if !question.get("explanation").is_some_and(Value::is_string) {
        question.insert(
            "explanation".to_string(),
            Value::String(PLACEHOLDER_EXPLANATION.to_string()),
        );
    }

    let mut answers = question
        .get("answers")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    while answers.len() < ANSWERS_PER_QUESTION {
        let slot = answers.len() + 1;
        answers.push(json!({
            "answer_text": format!("Option {}", slot),
            "is_correct": false,
        }));
    }

    let has_correct = answers
        .iter()
        .any(|a| a.get("is_correct").and_then(Value::as_bool) == Some(true));
    if !has_correct && let Some(Value::Object(first)) = answers.first_mut() {
        first.insert("is_correct".to_string(), Value::Bool(true));
    }

    question.insert("answers".to_string(), Value::Array(answers));
    Value::Object(question)
}
