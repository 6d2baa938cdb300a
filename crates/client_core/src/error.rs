use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("unexpected success status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl RequestError {
    /// Message supplied by the server in its `{message}` error body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// The server message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// The server message when present, otherwise this error's own text.
    pub fn detail(&self) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } | RequestError::UnexpectedStatus { status } => {
                Some(*status)
            }
            RequestError::Transport(err) => err.status().map(|s| s.as_u16()),
            RequestError::Decode(_) => None,
        }
    }
}
