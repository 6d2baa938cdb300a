//! Backend commands queued from UI to backend worker.

use shared::{domain::QuizId, protocol::CreateQuizRequest};

#[derive(Debug, Clone)]
pub enum BackendCommand {
    FetchQuiz { quiz_id: QuizId },
    CreateQuiz { request: CreateQuizRequest },
    GenerateQuizId,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchQuiz { .. } => "fetch_quiz",
            BackendCommand::CreateQuiz { .. } => "create_quiz",
            BackendCommand::GenerateQuizId => "generate_quiz_id",
        }
    }
}
