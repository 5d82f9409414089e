//! Structural quiz schema validation.
//!
//! Candidates coming out of the model are untyped [`serde_json::Value`]s.
//! [`matches_quiz_schema`] is the yes/no predicate used by the pipeline;
//! [`check_quiz_schema`] returns the first violation for diagnostics.
//!
//! Checked:
//!
//! | Path | Rule |
//! |------|------|
//! | `$` | object |
//! | `title` | non-empty string |
//! | `questions` | non-empty array |
//! | `questions[i].question_text`, `.explanation` | non-empty strings |
//! | `questions[i].answers` | array of exactly 4 |
//! | `questions[i].answers[j]` | string `answer_text`, boolean `is_correct` |
//! | `questions[i].answers` | exactly one `is_correct == true` |
//!
//! `keywords` is deliberately not part of the predicate.

use super::entities::ANSWERS_PER_QUESTION;
use serde_json::{Map, Value};
use thiserror::Error;

/// First schema violation found in a candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema violation at {path}: {reason}")]
pub struct SchemaError {
    /// Location of the offending field, e.g. `questions[2].answers`
    pub path: String,
    pub reason: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Does `data` satisfy the quiz schema? Never panics.
pub fn matches_quiz_schema(data: &Value) -> bool {
    check_quiz_schema(data).is_ok()
}

/// Validate `data`, reporting the first violation.
///
/// Stops at the first failure, but every question is visited until then,
/// so a bad question late in the list is never masked by earlier good ones.
pub fn check_quiz_schema(data: &Value) -> Result<(), SchemaError> {
    let quiz = data
        .as_object()
        .ok_or_else(|| SchemaError::new("$", "expected an object"))?;

    if non_blank_str(quiz, "title").is_none() {
        return Err(SchemaError::new("title", "expected a non-empty string"));
    }

    let questions = match quiz.get("questions").and_then(Value::as_array) {
        Some(questions) if !questions.is_empty() => questions,
        Some(_) => {
            return Err(SchemaError::new(
                "questions",
                "expected at least one question",
            ));
        }
        None => return Err(SchemaError::new("questions", "expected an array")),
    };

    for (index, question) in questions.iter().enumerate() {
        check_question(index, question)?;
    }

    Ok(())
}

fn check_question(index: usize, question: &Value) -> Result<(), SchemaError> {
    let path = format!("questions[{}]", index);
    let question = question
        .as_object()
        .ok_or_else(|| SchemaError::new(&path, "expected an object"))?;

    for field in ["question_text", "explanation"] {
        if non_blank_str(question, field).is_none() {
            return Err(SchemaError::new(
                format!("{}.{}", path, field),
                "expected a non-empty string",
            ));
        }
    }

    let answers_path = format!("{}.answers", path);
    let answers = question
        .get("answers")
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaError::new(&answers_path, "expected an array"))?;

    if answers.len() != ANSWERS_PER_QUESTION {
        return Err(SchemaError::new(
            &answers_path,
            format!(
                "expected exactly {} answers, found {}",
                ANSWERS_PER_QUESTION,
                answers.len()
            ),
        ));
    }

    let mut correct = 0;
    for (j, answer) in answers.iter().enumerate() {
        let answer_path = format!("{}[{}]", answers_path, j);
        let Some(answer) = answer.as_object() else {
            return Err(SchemaError::new(answer_path, "expected an object"));
        };
        if !answer.get("answer_text").is_some_and(Value::is_string) {
            return Err(SchemaError::new(
                format!("{}.answer_text", answer_path),
                "expected a string",
            ));
        }
        match answer.get("is_correct").and_then(Value::as_bool) {
            Some(true) => correct += 1,
            Some(false) => {}
            None => {
                return Err(SchemaError::new(
                    format!("{}.is_correct", answer_path),
                    "expected a boolean",
                ));
            }
        }
    }

    if correct != 1 {
        return Err(SchemaError::new(
            answers_path,
            format!("expected exactly one correct answer, found {}", correct),
        ));
    }

    Ok(())
}

fn non_blank_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(correct: &[bool]) -> Value {
        json!({
            "question_text": "What does the borrow checker enforce?",
            "explanation": "Aliasing XOR mutability",
            "answers": correct
                .iter()
                .enumerate()
                .map(|(i, c)| json!({"answer_text": format!("Option {}", i + 1), "is_correct": c}))
                .collect::<Vec<_>>(),
        })
    }

    fn valid_quiz() -> Value {
        json!({
            "title": "Rust Basics",
            "keywords": ["rust", "ownership"],
            "questions": [
                question(&[true, false, false, false]),
                question(&[false, false, true, false]),
                question(&[false, true, false, false]),
            ],
        })
    }

    #[test]
    fn test_valid_quiz_matches() {
        assert!(matches_quiz_schema(&valid_quiz()));
        assert_eq!(check_quiz_schema(&valid_quiz()), Ok(()));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(!matches_quiz_schema(&json!([])));
        assert!(!matches_quiz_schema(&json!("quiz")));
        assert!(!matches_quiz_schema(&Value::Null));
    }

    #[test]
    fn test_title_rules() {
        let mut quiz = valid_quiz();
        quiz["title"] = json!("");
        assert_eq!(check_quiz_schema(&quiz).unwrap_err().path, "title");

        quiz["title"] = json!(7);
        assert!(!matches_quiz_schema(&quiz));

        quiz.as_object_mut().unwrap().remove("title");
        assert!(!matches_quiz_schema(&quiz));
    }

    #[test]
    fn test_questions_must_be_non_empty_array() {
        let mut quiz = valid_quiz();
        quiz["questions"] = json!([]);
        assert!(!matches_quiz_schema(&quiz));

        quiz["questions"] = json!({"0": {}});
        assert!(!matches_quiz_schema(&quiz));
    }

    #[test]
    fn test_zero_or_two_correct_flips_result() {
        let mut quiz = valid_quiz();
        quiz["questions"][1]["answers"][2]["is_correct"] = json!(false);
        let err = check_quiz_schema(&quiz).unwrap_err();
        assert_eq!(err.path, "questions[1].answers");
        assert!(err.reason.contains("found 0"));

        let mut quiz = valid_quiz();
        quiz["questions"][1]["answers"][0]["is_correct"] = json!(true);
        let err = check_quiz_schema(&quiz).unwrap_err();
        assert!(err.reason.contains("found 2"));
    }

    #[test]
    fn test_late_question_failure_not_masked() {
        let mut quiz = valid_quiz();
        quiz["questions"][2]["explanation"] = json!(null);
        let err = check_quiz_schema(&quiz).unwrap_err();
        assert_eq!(err.path, "questions[2].explanation");
    }

    #[test]
    fn test_answer_count_must_be_four() {
        let mut quiz = valid_quiz();
        quiz["questions"][0] = question(&[true, false, false]);
        assert!(!matches_quiz_schema(&quiz));

        quiz["questions"][0] = question(&[true, false, false, false, false]);
        assert!(!matches_quiz_schema(&quiz));
    }

    #[test]
    fn test_answer_field_types() {
        let mut quiz = valid_quiz();
        quiz["questions"][0]["answers"][3]["is_correct"] = json!("false");
        assert_eq!(
            check_quiz_schema(&quiz).unwrap_err().path,
            "questions[0].answers[3].is_correct"
        );

        let mut quiz = valid_quiz();
        quiz["questions"][0]["answers"][1] = json!({"is_correct": false});
        assert_eq!(
            check_quiz_schema(&quiz).unwrap_err().path,
            "questions[0].answers[1].answer_text"
        );
    }

    #[test]
    fn test_keywords_not_checked() {
        let mut quiz = valid_quiz();
        quiz["keywords"] = json!("not a list");
        assert!(matches_quiz_schema(&quiz));
    }
}
