use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const QUIZ_ID_LEN: usize = 6;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(QuestionId);

/// Keeps only the ASCII digits of `input`, in order.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Caller-supplied quiz identifier: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizId(String);

impl QuizId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() == QUIZ_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidQuizId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuizId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QuizId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuizId> for String {
    fn from(value: QuizId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// One of the four answer slots of a question, numbered 1 to 4 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnswerPosition {
    #[default]
    First,
    Second,
    Third,
    Fourth,
}

impl AnswerPosition {
    pub const ALL: [AnswerPosition; 4] = [
        AnswerPosition::First,
        AnswerPosition::Second,
        AnswerPosition::Third,
        AnswerPosition::Fourth,
    ];

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(AnswerPosition::First),
            2 => Some(AnswerPosition::Second),
            3 => Some(AnswerPosition::Third),
            4 => Some(AnswerPosition::Fourth),
            _ => None,
        }
    }

    /// 1-based number used on the wire and in the UI.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn index(self) -> usize {
        match self {
            AnswerPosition::First => 0,
            AnswerPosition::Second => 1,
            AnswerPosition::Third => 2,
            AnswerPosition::Fourth => 3,
        }
    }
}

impl fmt::Display for AnswerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl TryFrom<u8> for AnswerPosition {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(DomainError::InvalidAnswerPosition(value as i64))
    }
}

impl From<AnswerPosition> for u8 {
    fn from(value: AnswerPosition) -> Self {
        value.number()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub answers: [String; 4],
    pub correct: AnswerPosition,
}

impl Question {
    pub fn answer(&self, position: AnswerPosition) -> &str {
        &self.answers[position.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: QuizId,
    pub name: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
