//! Quiz attempt session: fetch by id, answer question by question, submit, review.
//!
//! ```text
//! AwaitingId --begin_fetch--> Loading --ok--> InProgress --submit--> Submitted
//!     ^                          |                ^                      |
//!     +----------err-------------+                +--------retry---------+
//!     ^                                                                  |
//!     +------------------------------new_quiz----------------------------+
//! ```

use std::collections::HashMap;

use shared::domain::{
    digits_only, AnswerPosition, Question, QuestionId, Quiz, QuizId, QUIZ_ID_LEN,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::RequestError;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load quiz. Please check the ID and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    AwaitingId,
    Loading,
    InProgress,
    Submitted,
}

/// Per-question marker for the step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Current,
    Answered,
    Unanswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Perfect,
    Pass,
    KeepPracticing,
}

impl ScoreTier {
    /// Exactly half of the questions still counts as a pass.
    pub fn for_score(score: usize, total: usize) -> Self {
        if score == total {
            ScoreTier::Perfect
        } else if score * 2 >= total {
            ScoreTier::Pass
        } else {
            ScoreTier::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreTier::Perfect => "Perfect score! You got all questions right.",
            ScoreTier::Pass => "Good job! You passed the quiz.",
            ScoreTier::KeepPracticing => "Keep practicing. You'll do better next time.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview {
    pub position: AnswerPosition,
    pub text: String,
    pub is_correct: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub title: String,
    pub options: Vec<OptionReview>,
    pub selected: Option<AnswerPosition>,
    pub correct: AnswerPosition,
}

impl QuestionReview {
    pub fn answered_correctly(&self) -> bool {
        self.selected == Some(self.correct)
    }

    pub fn summary(&self) -> String {
        if self.answered_correctly() {
            "You answered correctly!".to_string()
        } else {
            let selected = self
                .selected
                .map(|p| p.to_string())
                .unwrap_or_else(|| "None".to_string());
            format!("Your answer: {selected}, Correct answer: {}", self.correct)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("quiz id must be exactly 6 digits")]
    IncompleteId,
    #[error("action is not available while {0:?}")]
    WrongPhase(AttemptPhase),
    #[error("question {0:?} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("the current question has not been answered")]
    CurrentUnanswered,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("already at the last question")]
    AtLastQuestion,
    #[error("{0} question(s) still unanswered")]
    Unanswered(usize),
}

/// Counts questions whose selection matches their correct position.
pub fn score_answers(quiz: &Quiz, selected: &HashMap<QuestionId, AnswerPosition>) -> usize {
    quiz.questions
        .iter()
        .filter(|q| selected.get(&q.id) == Some(&q.correct))
        .count()
}

#[derive(Debug, Clone)]
struct Attempt {
    quiz: Quiz,
    current_index: usize,
    selected: HashMap<QuestionId, AnswerPosition>,
}

impl Attempt {
    fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current_index: 0,
            selected: HashMap::new(),
        }
    }

    fn current(&self) -> &Question {
        &self.quiz.questions[self.current_index]
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.quiz.questions.len()
    }

    fn unanswered(&self) -> usize {
        self.quiz
            .questions
            .iter()
            .filter(|q| !self.selected.contains_key(&q.id))
            .count()
    }
}

#[derive(Debug, Clone)]
enum Session {
    AwaitingId,
    Loading,
    InProgress(Attempt),
    Submitted { attempt: Attempt, score: usize },
}

#[derive(Debug, Clone)]
pub struct AttemptController {
    quiz_id_input: String,
    error: Option<String>,
    session: Session,
}

impl Default for AttemptController {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptController {
    pub fn new() -> Self {
        Self {
            quiz_id_input: String::new(),
            error: None,
            session: Session::AwaitingId,
        }
    }

    pub fn phase(&self) -> AttemptPhase {
        match self.session {
            Session::AwaitingId => AttemptPhase::AwaitingId,
            Session::Loading => AttemptPhase::Loading,
            Session::InProgress(_) => AttemptPhase::InProgress,
            Session::Submitted { .. } => AttemptPhase::Submitted,
        }
    }

    pub fn quiz_id_input(&self) -> &str {
        &self.quiz_id_input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn attempt(&self) -> Option<&Attempt> {
        match &self.session {
            Session::InProgress(attempt) | Session::Submitted { attempt, .. } => Some(attempt),
            Session::AwaitingId | Session::Loading => None,
        }
    }

    fn in_progress_mut(&mut self) -> Result<&mut Attempt, AttemptError> {
        let phase = self.phase();
        match &mut self.session {
            Session::InProgress(attempt) => Ok(attempt),
            _ => Err(AttemptError::WrongPhase(phase)),
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.attempt().map(|a| &a.quiz)
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.session {
            Session::InProgress(attempt) => Some(attempt.current_index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.session {
            Session::InProgress(attempt) => Some(attempt.current()),
            _ => None,
        }
    }

    pub fn selected(&self, question_id: QuestionId) -> Option<AnswerPosition> {
        self.attempt()
            .and_then(|a| a.selected.get(&question_id).copied())
    }

    pub fn score(&self) -> Option<usize> {
        match &self.session {
            Session::Submitted { score, .. } => Some(*score),
            _ => None,
        }
    }

    /// Digits only, truncated to six. Ignored outside `AwaitingId`.
    pub fn edit_quiz_id(&mut self, value: &str) -> Result<(), AttemptError> {
        if !matches!(self.session, Session::AwaitingId) {
            return Err(AttemptError::WrongPhase(self.phase()));
        }
        self.quiz_id_input = digits_only(value).chars().take(QUIZ_ID_LEN).collect();
        Ok(())
    }

    pub fn can_fetch(&self) -> bool {
        matches!(self.session, Session::AwaitingId) && self.quiz_id_input.len() == QUIZ_ID_LEN
    }

    pub fn begin_fetch(&mut self) -> Result<QuizId, AttemptError> {
        if !matches!(self.session, Session::AwaitingId) {
            return Err(AttemptError::WrongPhase(self.phase()));
        }
        let id = QuizId::parse(&self.quiz_id_input).map_err(|_| AttemptError::IncompleteId)?;
        self.error = None;
        self.session = Session::Loading;
        Ok(id)
    }

    pub fn complete_fetch(&mut self, result: Result<Quiz, RequestError>) {
        if !matches!(self.session, Session::Loading) {
            warn!(phase = ?self.phase(), "applying quiz fetch result outside of Loading");
        }
        match result {
            Ok(quiz) if !quiz.questions.is_empty() => {
                info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz loaded");
                self.error = None;
                self.session = Session::InProgress(Attempt::new(quiz));
            }
            Ok(quiz) => {
                warn!(quiz_id = %quiz.id, "fetched quiz has no questions");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
                self.session = Session::AwaitingId;
            }
            Err(err) => {
                warn!(error = %err, quiz_id = %self.quiz_id_input, "quiz fetch failed");
                self.error = Some(err.user_message(FETCH_FAILED_MESSAGE));
                self.session = Session::AwaitingId;
            }
        }
    }

    /// Leaves `Loading` for a fetch that was never sent.
    pub fn abort_fetch(&mut self, reason: impl Into<String>) {
        if matches!(self.session, Session::Loading) {
            self.error = Some(reason.into());
            self.session = Session::AwaitingId;
        }
    }

    /// Records or overwrites the choice for one question. Does not advance.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        position: AnswerPosition,
    ) -> Result<(), AttemptError> {
        let attempt = self.in_progress_mut()?;
        if attempt.quiz.question(question_id).is_none() {
            return Err(AttemptError::UnknownQuestion(question_id));
        }
        attempt.selected.insert(question_id, position);
        Ok(())
    }

    pub fn can_go_next(&self) -> bool {
        match &self.session {
            Session::InProgress(attempt) => {
                !attempt.is_last() && attempt.selected.contains_key(&attempt.current().id)
            }
            _ => false,
        }
    }

    pub fn next(&mut self) -> Result<(), AttemptError> {
        let attempt = self.in_progress_mut()?;
        if attempt.is_last() {
            return Err(AttemptError::AtLastQuestion);
        }
        if !attempt.selected.contains_key(&attempt.current().id) {
            return Err(AttemptError::CurrentUnanswered);
        }
        attempt.current_index += 1;
        Ok(())
    }

    pub fn can_go_prev(&self) -> bool {
        matches!(&self.session, Session::InProgress(attempt) if attempt.current_index > 0)
    }

    pub fn prev(&mut self) -> Result<(), AttemptError> {
        let attempt = self.in_progress_mut()?;
        if attempt.current_index == 0 {
            return Err(AttemptError::AtFirstQuestion);
        }
        attempt.current_index -= 1;
        Ok(())
    }

    pub fn is_last_question(&self) -> bool {
        matches!(&self.session, Session::InProgress(attempt) if attempt.is_last())
    }

    pub fn steps(&self) -> Vec<StepState> {
        let Session::InProgress(attempt) = &self.session else {
            return Vec::new();
        };
        attempt
            .quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                if index == attempt.current_index {
                    StepState::Current
                } else if attempt.selected.contains_key(&question.id) {
                    StepState::Answered
                } else {
                    StepState::Unanswered
                }
            })
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        matches!(&self.session, Session::InProgress(attempt) if attempt.unanswered() == 0)
    }

    pub fn submit(&mut self) -> Result<usize, AttemptError> {
        let attempt = self.in_progress_mut()?;
        let unanswered = attempt.unanswered();
        if unanswered > 0 {
            return Err(AttemptError::Unanswered(unanswered));
        }
        let score = score_answers(&attempt.quiz, &attempt.selected);
        info!(
            quiz_id = %attempt.quiz.id,
            score,
            total = attempt.quiz.questions.len(),
            "quiz submitted"
        );
        if let Session::InProgress(attempt) =
            std::mem::replace(&mut self.session, Session::AwaitingId)
        {
            self.session = Session::Submitted { attempt, score };
        }
        Ok(score)
    }

    pub fn tier(&self) -> Option<ScoreTier> {
        match &self.session {
            Session::Submitted { attempt, score } => {
                Some(ScoreTier::for_score(*score, attempt.quiz.questions.len()))
            }
            _ => None,
        }
    }

    /// Every question with its four options annotated, available once submitted.
    pub fn review(&self) -> Vec<QuestionReview> {
        let Session::Submitted { attempt, .. } = &self.session else {
            return Vec::new();
        };
        attempt
            .quiz
            .questions
            .iter()
            .map(|question| {
                let selected = attempt.selected.get(&question.id).copied();
                QuestionReview {
                    question_id: question.id,
                    title: question.title.clone(),
                    options: AnswerPosition::ALL
                        .iter()
                        .map(|&position| OptionReview {
                            position,
                            text: question.answer(position).to_string(),
                            is_correct: position == question.correct,
                            is_selected: selected == Some(position),
                        })
                        .collect(),
                    selected,
                    correct: question.correct,
                }
            })
            .collect()
    }

    /// Starts the same quiz over with no answers.
    pub fn retry(&mut self) -> Result<(), AttemptError> {
        match std::mem::replace(&mut self.session, Session::AwaitingId) {
            Session::Submitted { attempt, .. } => {
                self.session = Session::InProgress(Attempt::new(attempt.quiz));
                Ok(())
            }
            other => {
                self.session = other;
                Err(AttemptError::WrongPhase(self.phase()))
            }
        }
    }

    /// Drops the quiz and all attempt state and clears the id field.
    pub fn new_quiz(&mut self) -> Result<(), AttemptError> {
        if !matches!(self.session, Session::Submitted { .. }) {
            return Err(AttemptError::WrongPhase(self.phase()));
        }
        self.session = Session::AwaitingId;
        self.quiz_id_input.clear();
        self.error = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/attempt_tests.rs"]
mod tests;
