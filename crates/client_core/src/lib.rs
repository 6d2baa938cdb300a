use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Quiz, QuizId},
    error::ApiError,
    protocol::{CreateQuizRequest, QuizDocument, ValidateQuizRequest},
};
use tracing::{debug, info, warn};

pub mod attempt;
pub mod authoring;
pub mod config;
pub mod error;
pub mod notice;

pub use attempt::{AttemptController, AttemptError, AttemptPhase, ScoreTier, StepState};
pub use authoring::{AuthoringController, AuthoringError, QuestionEdit, QuizDraft};
pub use config::ClientSettings;
pub use error::RequestError;
pub use notice::{Notice, NoticeKind};

/// The remote quiz API. All persistence lives behind it.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, RequestError>;
    /// Succeeds only on 200/201. Returns the created quiz when the server echoes it back.
    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<Option<Quiz>, RequestError>;
    async fn generate_quiz_id(&self) -> Result<QuizId, RequestError>;
    async fn quiz_exists(&self, id: &QuizId) -> Result<bool, RequestError>;
}

#[derive(Debug, Clone)]
pub struct QuizApiClient {
    http: Client,
    base_url: String,
}

impl QuizApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = config::prepare_api_base_url(&settings.api_base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn error_from_response(res: Response) -> RequestError {
    let status = res.status().as_u16();
    let message = match res.bytes().await {
        Ok(body) => serde_json::from_slice::<ApiError>(&body)
            .ok()
            .and_then(|err| err.message().map(str::to_string)),
        Err(err) => {
            debug!(%err, "failed to read error body");
            None
        }
    };
    RequestError::Status { status, message }
}

async fn decode_json<T: DeserializeOwned>(res: Response) -> Result<T, RequestError> {
    let body = res.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| RequestError::Decode(err.to_string()))
}

fn quiz_from_document(doc: QuizDocument) -> Result<Quiz, RequestError> {
    Quiz::try_from(doc).map_err(|err| RequestError::Decode(err.to_string()))
}

#[async_trait]
impl QuizApi for QuizApiClient {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, RequestError> {
        let res = self
            .http
            .get(self.url(&format!("/quizzes/{id}")))
            .send()
            .await?;
        if !res.status().is_success() {
            let err = error_from_response(res).await;
            warn!(quiz_id = %id, error = %err, "fetch quiz failed");
            return Err(err);
        }
        let doc: QuizDocument = decode_json(res).await?;
        let quiz = quiz_from_document(doc)?;
        info!(quiz_id = %id, questions = quiz.questions.len(), "fetched quiz");
        Ok(quiz)
    }

    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<Option<Quiz>, RequestError> {
        let res = self
            .http
            .post(self.url("/quizzes"))
            .json(request)
            .send()
            .await?;
        let status = res.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            if status.is_success() {
                return Err(RequestError::UnexpectedStatus {
                    status: status.as_u16(),
                });
            }
            return Err(error_from_response(res).await);
        }
        let created = decode_json::<QuizDocument>(res)
            .await
            .ok()
            .and_then(|doc| Quiz::try_from(doc).ok());
        info!(quiz_id = %request.id, status = status.as_u16(), "created quiz");
        Ok(created)
    }

    async fn generate_quiz_id(&self) -> Result<QuizId, RequestError> {
        let res = self
            .http
            .get(self.url("/quizzes/generate-id"))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        let text = res.text().await?;
        QuizId::parse(text.trim().trim_matches('"'))
            .map_err(|err| RequestError::Decode(err.to_string()))
    }

    async fn quiz_exists(&self, id: &QuizId) -> Result<bool, RequestError> {
        let res = self
            .http
            .post(self.url("/quizzes/validate"))
            .json(&ValidateQuizRequest {
                quiz_id: id.to_string(),
            })
            .send()
            .await?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(error_from_response(res).await),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
