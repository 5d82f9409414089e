//! What a quiz is generated from.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The subject of a generation request (Value Object)
///
/// Topic and content are mutually exclusive, which the enum makes
/// unrepresentable to get wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
    /// A short topic, e.g. "The French Revolution"
    Topic(String),
    /// A body of text (notes, an article) the quiz must be drawn from
    Content(String),
}

impl QuizSource {
    pub fn topic(topic: impl Into<String>) -> Self {
        Self::Topic(topic.into())
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self::Content(content.into())
    }

    /// Build from the optional pair accepted at the outer boundary.
    ///
    /// Blank strings count as absent.
    pub fn from_parts(
        topic: Option<String>,
        content: Option<String>,
    ) -> Result<Self, DomainError> {
        let topic = topic.filter(|t| !t.trim().is_empty());
        let content = content.filter(|c| !c.trim().is_empty());

        match (topic, content) {
            (Some(topic), None) => Ok(Self::Topic(topic)),
            (None, Some(content)) => Ok(Self::Content(content)),
            (Some(_), Some(_)) => Err(DomainError::AmbiguousSource),
            (None, None) => Err(DomainError::MissingSource),
        }
    }

    /// Human-readable description used as error context,
    /// e.g. `about "Volcanoes"` or `from content`.
    pub fn describe(&self) -> String {
        match self {
            Self::Topic(topic) => format!("about \"{}\"", topic),
            Self::Content(_) => "from content".to_string(),
        }
    }
}

impl std::fmt::Display for QuizSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(
            QuizSource::from_parts(Some("Volcanoes".into()), None),
            Ok(QuizSource::topic("Volcanoes"))
        );
        assert_eq!(
            QuizSource::from_parts(None, Some("notes".into())),
            Ok(QuizSource::content("notes"))
        );
        assert_eq!(
            QuizSource::from_parts(None, None),
            Err(DomainError::MissingSource)
        );
        assert_eq!(
            QuizSource::from_parts(Some("   ".into()), Some("".into())),
            Err(DomainError::MissingSource)
        );
        assert_eq!(
            QuizSource::from_parts(Some("a".into()), Some("b".into())),
            Err(DomainError::AmbiguousSource)
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(QuizSource::topic("Volcanoes").describe(), "about \"Volcanoes\"");
        assert_eq!(QuizSource::content("long text").to_string(), "from content");
    }
}
