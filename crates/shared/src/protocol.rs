use serde::{Deserialize, Serialize};

use crate::{
    domain::{AnswerPosition, Difficulty, Question, QuestionId, Quiz, QuizId},
    error::DomainError,
};

/// Question as the quiz API sends and receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub answer4: String,
    pub correct_answer: i64,
}

impl QuestionDocument {
    pub fn from_parts(
        id: Option<QuestionId>,
        title: &str,
        answers: &[String; 4],
        correct: AnswerPosition,
    ) -> Self {
        let [answer1, answer2, answer3, answer4] = answers.clone();
        Self {
            id: id.map(|id| id.0),
            title: title.to_string(),
            answer1,
            answer2,
            answer3,
            answer4,
            correct_answer: correct.number() as i64,
        }
    }

    pub fn answers(&self) -> [String; 4] {
        [
            self.answer1.clone(),
            self.answer2.clone(),
            self.answer3.clone(),
            self.answer4.clone(),
        ]
    }

    pub fn correct_position(&self) -> Result<AnswerPosition, DomainError> {
        u8::try_from(self.correct_answer)
            .ok()
            .and_then(AnswerPosition::from_number)
            .ok_or(DomainError::InvalidAnswerPosition(self.correct_answer))
    }
}

/// Quiz document for `GET /quizzes/{id}` responses and `POST /quizzes` bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
}

/// Body of `POST /quizzes`. Questions carry no ids until the server assigns them.
pub type CreateQuizRequest = QuizDocument;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQuizRequest {
    pub quiz_id: String,
}

impl TryFrom<QuestionDocument> for Question {
    type Error = DomainError;

    fn try_from(doc: QuestionDocument) -> Result<Self, Self::Error> {
        let correct = doc.correct_position()?;
        let Some(id) = doc.id else {
            return Err(DomainError::MissingQuestionId { index: 0 });
        };
        Ok(Question {
            id: QuestionId(id),
            answers: [doc.answer1, doc.answer2, doc.answer3, doc.answer4],
            title: doc.title,
            correct,
        })
    }
}

impl TryFrom<QuizDocument> for Quiz {
    type Error = DomainError;

    fn try_from(doc: QuizDocument) -> Result<Self, Self::Error> {
        let id = QuizId::parse(&doc.id)?;
        if doc.questions.is_empty() {
            return Err(DomainError::EmptyQuiz(doc.id));
        }
        let questions = doc
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| {
                Question::try_from(question).map_err(|err| match err {
                    DomainError::MissingQuestionId { .. } => {
                        DomainError::MissingQuestionId { index }
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz {
            id,
            name: doc.name,
            difficulty: doc.difficulty,
            questions,
        })
    }
}

impl From<&Quiz> for QuizDocument {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.to_string(),
            name: quiz.name.clone(),
            difficulty: quiz.difficulty,
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionDocument::from_parts(Some(q.id), &q.title, &q.answers, q.correct))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FETCHED: &str = r#"{
        "id": "123456",
        "name": "Rust basics",
        "difficulty": "MEDIUM",
        "questions": [
            {"id": 11, "title": "Borrow?", "answer1": "a", "answer2": "b",
             "answer3": "c", "answer4": "d", "correctAnswer": 3}
        ]
    }"#;

    #[test]
    fn decodes_backend_quiz_document_into_domain_quiz() {
        let doc: QuizDocument = serde_json::from_str(FETCHED).expect("json");
        let quiz = Quiz::try_from(doc).expect("quiz");
        assert_eq!(quiz.id.as_str(), "123456");
        assert_eq!(quiz.difficulty, Difficulty::Medium);
        assert_eq!(quiz.questions[0].id, QuestionId(11));
        assert_eq!(quiz.questions[0].correct, AnswerPosition::Third);
        assert_eq!(quiz.questions[0].answer(AnswerPosition::Fourth), "d");
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let doc: QuizDocument =
            serde_json::from_str(&FETCHED.replace("\"correctAnswer\": 3", "\"correctAnswer\": 9"))
                .expect("json");
        assert_eq!(
            Quiz::try_from(doc),
            Err(DomainError::InvalidAnswerPosition(9))
        );
    }

    #[test]
    fn rejects_quiz_without_questions_or_question_ids() {
        let empty = QuizDocument {
            id: "123456".into(),
            name: "empty".into(),
            difficulty: Difficulty::Easy,
            questions: Vec::new(),
        };
        assert_eq!(
            Quiz::try_from(empty),
            Err(DomainError::EmptyQuiz("123456".into()))
        );

        let doc: QuizDocument =
            serde_json::from_str(&FETCHED.replace("\"id\": 11, ", "")).expect("json");
        assert_eq!(
            Quiz::try_from(doc),
            Err(DomainError::MissingQuestionId { index: 0 })
        );
    }

    #[test]
    fn create_body_omits_question_ids_and_uses_camel_case() {
        let body = CreateQuizRequest {
            id: "654321".into(),
            name: "Draft".into(),
            difficulty: Difficulty::Hard,
            questions: vec![QuestionDocument::from_parts(
                None,
                "Q",
                &["1".into(), "2".into(), "3".into(), "4".into()],
                AnswerPosition::Second,
            )],
        };
        let value = serde_json::to_value(&body).expect("json");
        assert_eq!(value["difficulty"], "HARD");
        assert_eq!(value["questions"][0]["correctAnswer"], 2);
        assert!(value["questions"][0].get("id").is_none());
    }
}
