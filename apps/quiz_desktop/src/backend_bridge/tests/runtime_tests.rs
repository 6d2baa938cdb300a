use super::*;

use std::time::Duration;

use async_trait::async_trait;
use client_core::RequestError;
use crossbeam_channel::bounded;
use shared::{
    domain::{AnswerPosition, Difficulty, Question, QuestionId, Quiz, QuizId},
    protocol::{CreateQuizRequest, QuizDocument},
};

use crate::controller::events::UiErrorContext;

struct FakeApi {
    known: Quiz,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            known: Quiz {
                id: QuizId::parse("123456").expect("id"),
                name: "Smart pointers".into(),
                difficulty: Difficulty::Hard,
                questions: vec![Question {
                    id: QuestionId(7),
                    title: "Box or Rc?".into(),
                    answers: ["Box".into(), "Rc".into(), "Arc".into(), "Cell".into()],
                    correct: AnswerPosition::Third,
                }],
            },
        }
    }
}

#[async_trait]
impl QuizApi for FakeApi {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, RequestError> {
        if id == &self.known.id {
            Ok(self.known.clone())
        } else {
            Err(RequestError::Status {
                status: 404,
                message: Some("Quiz not found".into()),
            })
        }
    }

    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<Option<Quiz>, RequestError> {
        if request.id == self.known.id.as_str() {
            return Err(RequestError::Status {
                status: 409,
                message: Some("Quiz ID already in use".into()),
            });
        }
        Ok(None)
    }

    async fn generate_quiz_id(&self) -> Result<QuizId, RequestError> {
        Err(RequestError::Decode("generator offline".into()))
    }

    async fn quiz_exists(&self, id: &QuizId) -> Result<bool, RequestError> {
        Ok(id == &self.known.id)
    }
}

fn create_request(id: &str) -> CreateQuizRequest {
    let mut doc = QuizDocument::from(&FakeApi::new().known);
    doc.id = id.to_string();
    doc
}

#[tokio::test]
async fn fetch_maps_to_loaded_and_failed_events() {
    let api = FakeApi::new();

    let event = handle_command(
        &api,
        BackendCommand::FetchQuiz {
            quiz_id: QuizId::parse("123456").expect("id"),
        },
    )
    .await;
    assert!(matches!(event, UiEvent::QuizLoaded(ref quiz) if quiz.name == "Smart pointers"));

    let event = handle_command(
        &api,
        BackendCommand::FetchQuiz {
            quiz_id: QuizId::parse("999999").expect("id"),
        },
    )
    .await;
    match event {
        UiEvent::QuizLoadFailed(err) => assert_eq!(err.server_message(), Some("Quiz not found")),
        _ => panic!("expected QuizLoadFailed"),
    }
}

#[tokio::test]
async fn create_reports_the_submitted_id() {
    let api = FakeApi::new();

    match handle_command(
        &api,
        BackendCommand::CreateQuiz {
            request: create_request("654321"),
        },
    )
    .await
    {
        UiEvent::QuizCreated { quiz_id, created } => {
            assert_eq!(quiz_id, "654321");
            assert!(created.is_none());
        }
        _ => panic!("expected QuizCreated"),
    }

    match handle_command(
        &api,
        BackendCommand::CreateQuiz {
            request: create_request("123456"),
        },
    )
    .await
    {
        UiEvent::QuizCreateFailed(err) => assert_eq!(err.status(), Some(409)),
        _ => panic!("expected QuizCreateFailed"),
    }
}

#[tokio::test]
async fn generate_id_failure_becomes_ui_error() {
    match handle_command(&FakeApi::new(), BackendCommand::GenerateQuizId).await {
        UiEvent::Error(err) => {
            assert_eq!(err.context(), UiErrorContext::GenerateQuizId);
            assert!(err.message().contains("generator offline"));
        }
        _ => panic!("expected Error"),
    }
}

#[test]
fn launched_worker_answers_queued_commands() {
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(4);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(4);
    launch(FakeApi::new(), cmd_rx, ui_tx);

    cmd_tx
        .send(BackendCommand::FetchQuiz {
            quiz_id: QuizId::parse("123456").expect("id"),
        })
        .expect("send");

    let mut loaded = false;
    for _ in 0..2 {
        match ui_rx.recv_timeout(Duration::from_secs(5)).expect("event") {
            UiEvent::Info(_) => {}
            UiEvent::QuizLoaded(quiz) => {
                assert_eq!(quiz.id.as_str(), "123456");
                loaded = true;
                break;
            }
            _ => panic!("unexpected event"),
        }
    }
    assert!(loaded);
}
