//! Quiz authoring: an editable draft that is validated and submitted to `POST /quizzes`.

use std::time::{Duration, Instant};

use shared::{
    domain::{digits_only, AnswerPosition, Difficulty, Quiz, QuizId, QUIZ_ID_LEN},
    error::DomainError,
    protocol::{CreateQuizRequest, QuestionDocument, QuizDocument},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::RequestError,
    notice::{Notice, NoticeSlot},
};

pub const ID_LENGTH_ERROR: &str = "ID must be exactly 6 digits";
pub const CREATE_SUCCESS_MESSAGE: &str = "Quiz created successfully!";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create quiz. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftQuestion {
    pub title: String,
    pub answers: [String; 4],
    pub correct: AnswerPosition,
}

impl DraftQuestion {
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && self.answers.iter().all(|a| !a.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub questions: Vec<DraftQuestion>,
}

impl Default for QuizDraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            difficulty: Difficulty::default(),
            questions: vec![DraftQuestion::default()],
        }
    }
}

impl QuizDraft {
    pub fn is_valid(&self) -> bool {
        QuizId::parse(&self.id).is_ok()
            && !self.name.trim().is_empty()
            && !self.questions.is_empty()
            && self.questions.iter().all(DraftQuestion::is_complete)
    }

    pub fn to_request(&self) -> CreateQuizRequest {
        QuizDocument {
            id: self.id.clone(),
            name: self.name.clone(),
            difficulty: self.difficulty,
            questions: self
                .questions
                .iter()
                .map(|q| QuestionDocument::from_parts(None, &q.title, &q.answers, q.correct))
                .collect(),
        }
    }
}

impl TryFrom<QuizDocument> for QuizDraft {
    type Error = DomainError;

    fn try_from(doc: QuizDocument) -> Result<Self, Self::Error> {
        let questions = doc
            .questions
            .iter()
            .map(|q| -> Result<DraftQuestion, DomainError> {
                Ok(DraftQuestion {
                    title: q.title.clone(),
                    answers: q.answers(),
                    correct: q.correct_position()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: doc.id,
            name: doc.name,
            difficulty: doc.difficulty,
            questions: if questions.is_empty() {
                vec![DraftQuestion::default()]
            } else {
                questions
            },
        })
    }
}

/// A single-field change to one draft question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionEdit {
    Title(String),
    Answer(AnswerPosition, String),
    Correct(AnswerPosition),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("quiz draft is incomplete")]
    Incomplete,
    #[error("a quiz submission is already in flight")]
    SubmissionInFlight,
    #[error("no draft question at index {0}")]
    NoSuchQuestion(usize),
}

#[derive(Debug, Clone)]
pub struct AuthoringController {
    draft: QuizDraft,
    id_error: Option<&'static str>,
    submitting: bool,
    notice: NoticeSlot,
}

impl Default for AuthoringController {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthoringController {
    pub fn new() -> Self {
        Self::with_notice_ttl(crate::notice::DEFAULT_NOTICE_TTL)
    }

    pub fn with_notice_ttl(ttl: Duration) -> Self {
        Self {
            draft: QuizDraft::default(),
            id_error: None,
            submitting: false,
            notice: NoticeSlot::new(ttl),
        }
    }

    /// Starts from an existing draft, e.g. one loaded from a file.
    pub fn with_draft(mut self, draft: QuizDraft) -> Self {
        self.draft = draft;
        let digits = digits_only(&self.draft.id);
        self.id_error = id_length_error(&digits);
        self.draft.id = sanitize_id(&digits).unwrap_or_default();
        if self.draft.questions.is_empty() {
            self.draft.questions.push(DraftQuestion::default());
        }
        self
    }

    pub fn draft(&self) -> &QuizDraft {
        &self.draft
    }

    /// Inline error for the id field, from the last attempted input. Never blocks typing.
    pub fn id_error(&self) -> Option<&'static str> {
        self.id_error
    }

    /// Keeps digits only. Input that would exceed six digits is rejected outright,
    /// but still flags the length error.
    pub fn edit_id(&mut self, value: &str) {
        let digits = digits_only(value);
        self.id_error = id_length_error(&digits);
        if let Some(id) = sanitize_id(&digits) {
            self.draft.id = id;
        }
    }

    pub fn apply_generated_id(&mut self, id: &QuizId) {
        self.draft.id = id.to_string();
        self.id_error = None;
    }

    pub fn edit_name(&mut self, value: impl Into<String>) {
        self.draft.name = value.into();
    }

    pub fn edit_difficulty(&mut self, difficulty: Difficulty) {
        self.draft.difficulty = difficulty;
    }

    pub fn edit_question(&mut self, index: usize, edit: QuestionEdit) -> Result<(), AuthoringError> {
        let question = self
            .draft
            .questions
            .get_mut(index)
            .ok_or(AuthoringError::NoSuchQuestion(index))?;
        match edit {
            QuestionEdit::Title(title) => question.title = title,
            QuestionEdit::Answer(position, text) => question.answers[position.index()] = text,
            QuestionEdit::Correct(position) => question.correct = position,
        }
        Ok(())
    }

    pub fn add_question(&mut self) {
        self.draft.questions.push(DraftQuestion::default());
    }

    /// Removes the draft at `index` unless it is the last one left.
    pub fn remove_question(&mut self, index: usize) -> bool {
        if self.draft.questions.len() <= 1 || index >= self.draft.questions.len() {
            return false;
        }
        self.draft.questions.remove(index);
        true
    }

    pub fn can_remove_questions(&self) -> bool {
        self.draft.questions.len() > 1
    }

    pub fn is_valid(&self) -> bool {
        self.draft.is_valid()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.is_valid()
    }

    /// Marks a submission in flight and returns the request body to send.
    pub fn begin_submit(&mut self) -> Result<CreateQuizRequest, AuthoringError> {
        if self.submitting {
            return Err(AuthoringError::SubmissionInFlight);
        }
        if !self.is_valid() {
            return Err(AuthoringError::Incomplete);
        }
        self.submitting = true;
        Ok(self.draft.to_request())
    }

    pub fn complete_submit(&mut self, outcome: Result<Option<Quiz>, RequestError>, now: Instant) {
        self.submitting = false;
        let notice = match outcome {
            Ok(_) => {
                info!(quiz_id = %self.draft.id, "quiz created");
                self.draft = QuizDraft::default();
                self.id_error = None;
                Notice::success(CREATE_SUCCESS_MESSAGE)
            }
            Err(RequestError::UnexpectedStatus { status }) => {
                warn!(status, "quiz creation returned an unexpected status");
                Notice::error(CREATE_FAILED_MESSAGE)
            }
            Err(err) => {
                warn!(error = %err, "quiz creation failed");
                Notice::error(format!("Error submitting quiz: {}", err.detail()))
            }
        };
        self.notice.show(notice, now);
    }

    /// Drops the in-flight flag for a request that was never sent. The draft is kept.
    pub fn abort_submit(&mut self) {
        self.submitting = false;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.current()
    }

    pub fn notice_remaining(&self, now: Instant) -> Option<Duration> {
        self.notice.remaining(now)
    }

    pub fn dismiss_notice(&mut self) {
        self.notice.dismiss();
    }

    pub fn tick(&mut self, now: Instant) {
        self.notice.tick(now);
    }
}

fn sanitize_id(value: &str) -> Option<String> {
    let digits = digits_only(value);
    (digits.len() <= QUIZ_ID_LEN).then_some(digits)
}

fn id_length_error(digits: &str) -> Option<&'static str> {
    let len = digits.len();
    (len > 0 && len != QUIZ_ID_LEN).then_some(ID_LENGTH_ERROR)
}

#[cfg(test)]
#[path = "tests/authoring_tests.rs"]
mod tests;
