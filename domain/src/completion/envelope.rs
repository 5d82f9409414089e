//! Chat-completion response envelope.
//!
//! The envelope is the deserialized body returned by the endpoint, as
//! opposed to the quiz JSON nested inside `choices[0].message.content`.
//! Every field is optional at the type level so that a missing piece is
//! reported by [`validate_envelope`] with a precise [`StructuralError`]
//! instead of a generic deserialization failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The envelope is missing a field the pipeline depends on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    #[error("response envelope has no `choices` field")]
    MissingChoices,

    #[error("response envelope has an empty `choices` array")]
    EmptyChoices,

    #[error("first choice has no `message` field")]
    MissingMessage,

    #[error("first choice message has no non-empty `content` field")]
    MissingContent,
}

impl StructuralError {
    /// JSON path of the field that was missing.
    pub fn field(&self) -> &'static str {
        match self {
            StructuralError::MissingChoices | StructuralError::EmptyChoices => "choices",
            StructuralError::MissingMessage => "choices[0].message",
            StructuralError::MissingContent => "choices[0].message.content",
        }
    }
}

/// Descriptive fields keep strings only; any other JSON type reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

/// Message carried by a choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One completion choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<String>,
}

/// Deserialized completion response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

impl Envelope {
    /// Envelope whose first choice carries `content`.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            model: None,
            choices: Some(vec![Choice {
                message: Some(ChoiceMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                }),
                finish_reason: Some("stop".to_string()),
            }]),
        }
    }

    /// Interpret an already-parsed JSON body as an envelope.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Non-empty `choices[0].message.content`, if present.
    pub fn content(&self) -> Option<&str> {
        validate_envelope(self).ok()
    }
}

/// Check the envelope shape and return the model's raw text.
///
/// Checks, in order: `choices` present, `choices` non-empty, first choice
/// has `message`, message has non-empty `content`.
pub fn validate_envelope(envelope: &Envelope) -> Result<&str, StructuralError> {
    let choices = envelope
        .choices
        .as_ref()
        .ok_or(StructuralError::MissingChoices)?;
    let first = choices.first().ok_or(StructuralError::EmptyChoices)?;
    let message = first
        .message
        .as_ref()
        .ok_or(StructuralError::MissingMessage)?;

    match message.content.as_deref() {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(StructuralError::MissingContent),
    }
}
