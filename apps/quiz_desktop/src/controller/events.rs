//! UI/backend events and error modeling for the quiz desktop controller.

use client_core::RequestError;
use shared::domain::{Quiz, QuizId};

pub enum UiEvent {
    Info(String),
    QuizLoaded(Quiz),
    QuizLoadFailed(RequestError),
    QuizCreated {
        quiz_id: String,
        created: Option<Quiz>,
    },
    QuizCreateFailed(RequestError),
    QuizIdGenerated(QuizId),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    NotFound,
    Transport,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FetchQuiz,
    CreateQuiz,
    GenerateQuizId,
    General,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// Turns a worker-side failure into the one-line status shown under the pages.
pub fn classify_request_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("backend worker startup failure")
        || lower.contains("failed to build backend runtime")
    {
        "Backend worker startup failure; restart the app.".to_string()
    } else if lower.contains("error sending request")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Quiz API unreachable; check the API URL and network, then retry.".to_string()
    } else {
        format!("Quiz API error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("404") || message_lower.contains("not found") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("must be")
            || message_lower.contains("400")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("error sending request")
            || message_lower.contains("network")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("server returned 5")
            || message_lower.contains("internal server error")
        {
            UiErrorCategory::Server
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_request(context: UiErrorContext, err: &RequestError) -> Self {
        let mut ui_err = Self::from_message(context, err.to_string());
        if let Some(message) = err.server_message() {
            ui_err.message = message.to_string();
        }
        ui_err
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failures the user cannot fix by editing input get a banner instead of a status line.
    pub fn wants_banner(&self) -> bool {
        matches!(self.context, UiErrorContext::BackendStartup)
            || matches!(
                self.category,
                UiErrorCategory::Transport | UiErrorCategory::Server
            )
    }
}
