use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error document returned by the quiz API on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// The server message, if it carried a non-blank one.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("quiz id must be exactly 6 digits, got {0:?}")]
    InvalidQuizId(String),
    #[error("correct answer must be between 1 and 4, got {0}")]
    InvalidAnswerPosition(i64),
    #[error("question {index} has no server-assigned id")]
    MissingQuestionId { index: usize },
    #[error("quiz {0} has no questions")]
    EmptyQuiz(String),
}
