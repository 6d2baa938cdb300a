use super::*;

use shared::domain::Difficulty;

fn quiz_with_correct(correct: &[u8]) -> Quiz {
    Quiz {
        id: QuizId::parse("123456").expect("id"),
        name: "Traits".to_string(),
        difficulty: Difficulty::Medium,
        questions: correct
            .iter()
            .enumerate()
            .map(|(i, &c)| Question {
                id: QuestionId(100 + i as i64),
                title: format!("Question {}", i + 1),
                answers: [
                    "one".to_string(),
                    "two".to_string(),
                    "three".to_string(),
                    "four".to_string(),
                ],
                correct: AnswerPosition::from_number(c).expect("position"),
            })
            .collect(),
    }
}

fn pos(n: u8) -> AnswerPosition {
    AnswerPosition::from_number(n).expect("position")
}

fn loaded(correct: &[u8]) -> AttemptController {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("123456").expect("edit");
    controller.begin_fetch().expect("fetch");
    controller.complete_fetch(Ok(quiz_with_correct(correct)));
    assert_eq!(controller.phase(), AttemptPhase::InProgress);
    controller
}

/// Answers every question in order with `choices`, walking forward with `next`.
fn answer_all(controller: &mut AttemptController, choices: &[u8]) {
    for (i, &choice) in choices.iter().enumerate() {
        let question_id = controller.current_question().expect("question").id;
        controller
            .select_answer(question_id, pos(choice))
            .expect("select");
        if i + 1 < choices.len() {
            controller.next().expect("next");
        }
    }
}

#[test]
fn quiz_id_input_is_digits_only_and_at_most_six() {
    let mut controller = AttemptController::new();
    for raw in ["abc", "12ab34", "1234567890", "!@#9", "98 76 54 32", ""] {
        controller.edit_quiz_id(raw).expect("edit");
        let stored = controller.quiz_id_input();
        assert!(stored.len() <= 6, "{raw:?} stored as {stored:?}");
        assert!(stored.chars().all(|c| c.is_ascii_digit()));
    }
    controller.edit_quiz_id("1234567890").expect("edit");
    assert_eq!(controller.quiz_id_input(), "123456");
}

#[test]
fn fetch_enabled_only_with_exactly_six_digits() {
    let mut controller = AttemptController::new();
    for (raw, enabled) in [("", false), ("12345", false), ("123456", true), ("1234x5", false)] {
        controller.edit_quiz_id(raw).expect("edit");
        assert_eq!(controller.can_fetch(), enabled, "input {raw:?}");
    }

    controller.edit_quiz_id("123").expect("edit");
    assert_eq!(controller.begin_fetch(), Err(AttemptError::IncompleteId));
    assert_eq!(controller.phase(), AttemptPhase::AwaitingId);
}

#[test]
fn begin_fetch_moves_to_loading_and_blocks_a_second_fetch() {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("654321").expect("edit");
    let id = controller.begin_fetch().expect("fetch");
    assert_eq!(id.as_str(), "654321");
    assert_eq!(controller.phase(), AttemptPhase::Loading);
    assert!(!controller.can_fetch());
    assert_eq!(
        controller.begin_fetch(),
        Err(AttemptError::WrongPhase(AttemptPhase::Loading))
    );
    assert!(controller.edit_quiz_id("111111").is_err());
}

#[test]
fn successful_fetch_starts_at_first_question_with_no_answers() {
    let controller = loaded(&[1, 2, 3]);
    assert_eq!(controller.current_index(), Some(0));
    assert_eq!(controller.current_question().map(|q| q.id), Some(QuestionId(100)));
    assert!(controller.quiz().is_some());
    assert!(controller.error().is_none());
    assert_eq!(
        controller.steps(),
        vec![StepState::Current, StepState::Unanswered, StepState::Unanswered]
    );
}

#[test]
fn failed_fetch_returns_to_awaiting_id_with_server_message() {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("999999").expect("edit");
    controller.begin_fetch().expect("fetch");
    controller.complete_fetch(Err(RequestError::Status {
        status: 404,
        message: Some("Quiz not found with id : '999999'".into()),
    }));

    assert_eq!(controller.phase(), AttemptPhase::AwaitingId);
    assert_eq!(controller.error(), Some("Quiz not found with id : '999999'"));
    assert_eq!(controller.quiz_id_input(), "999999");
    assert!(controller.quiz().is_none());
    assert!(controller.can_fetch());
}

#[test]
fn failed_fetch_without_message_uses_fallback_and_next_fetch_clears_it() {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("999999").expect("edit");
    controller.begin_fetch().expect("fetch");
    controller.complete_fetch(Err(RequestError::Decode("eof".into())));
    assert_eq!(controller.error(), Some(FETCH_FAILED_MESSAGE));

    controller.begin_fetch().expect("fetch again");
    assert!(controller.error().is_none());
}

#[test]
fn quiz_without_questions_is_treated_as_failed_fetch() {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("123456").expect("edit");
    controller.begin_fetch().expect("fetch");
    controller.complete_fetch(Ok(quiz_with_correct(&[])));
    assert_eq!(controller.phase(), AttemptPhase::AwaitingId);
    assert_eq!(controller.error(), Some(FETCH_FAILED_MESSAGE));
}

#[test]
fn select_answer_overwrites_without_advancing() {
    let mut controller = loaded(&[1, 2]);
    controller
        .select_answer(QuestionId(100), pos(3))
        .expect("select");
    controller
        .select_answer(QuestionId(100), pos(1))
        .expect("select");
    assert_eq!(controller.selected(QuestionId(100)), Some(pos(1)));
    assert_eq!(controller.current_index(), Some(0));
}

#[test]
fn select_answer_rejects_questions_outside_the_quiz() {
    let mut controller = loaded(&[1, 2]);
    assert_eq!(
        controller.select_answer(QuestionId(7), pos(1)),
        Err(AttemptError::UnknownQuestion(QuestionId(7)))
    );
    assert_eq!(controller.selected(QuestionId(7)), None);
}

#[test]
fn next_never_advances_past_an_unanswered_question() {
    for size in 1..=5 {
        let correct = vec![1u8; size];
        let mut controller = loaded(&correct);
        assert!(!controller.can_go_next());
        let expected = if size == 1 {
            AttemptError::AtLastQuestion
        } else {
            AttemptError::CurrentUnanswered
        };
        assert_eq!(controller.next(), Err(expected));
        assert_eq!(controller.current_index(), Some(0));
    }
}

#[test]
fn next_stops_at_last_question() {
    let mut controller = loaded(&[1, 2]);
    controller
        .select_answer(QuestionId(100), pos(1))
        .expect("select");
    assert!(controller.can_go_next());
    controller.next().expect("next");
    controller
        .select_answer(QuestionId(101), pos(1))
        .expect("select");
    assert!(controller.is_last_question());
    assert!(!controller.can_go_next());
    assert_eq!(controller.next(), Err(AttemptError::AtLastQuestion));
    assert_eq!(controller.current_index(), Some(1));
}

#[test]
fn prev_never_goes_below_zero_and_needs_no_answer() {
    let mut controller = loaded(&[1, 2, 3]);
    assert!(!controller.can_go_prev());
    assert_eq!(controller.prev(), Err(AttemptError::AtFirstQuestion));
    assert_eq!(controller.current_index(), Some(0));

    controller
        .select_answer(QuestionId(100), pos(2))
        .expect("select");
    controller.next().expect("next");
    assert!(controller.can_go_prev());
    controller.prev().expect("prev");
    assert_eq!(controller.current_index(), Some(0));
}

#[test]
fn step_indicator_marks_current_answered_and_unanswered() {
    let mut controller = loaded(&[1, 2, 3]);
    controller
        .select_answer(QuestionId(100), pos(2))
        .expect("select");
    controller.next().expect("next");
    assert_eq!(
        controller.steps(),
        vec![StepState::Answered, StepState::Current, StepState::Unanswered]
    );
    controller
        .select_answer(QuestionId(101), pos(2))
        .expect("select");
    assert_eq!(controller.steps()[1], StepState::Current);
}

#[test]
fn submit_requires_every_question_answered() {
    let mut controller = loaded(&[1, 2, 3]);
    answer_all(&mut controller, &[1, 2]);
    assert!(!controller.can_submit());
    assert_eq!(controller.submit(), Err(AttemptError::Unanswered(1)));
    assert_eq!(controller.phase(), AttemptPhase::InProgress);
    assert_eq!(controller.score(), None);
}

#[test]
fn four_questions_three_right_is_a_pass() {
    let mut controller = loaded(&[1, 2, 3, 4]);
    answer_all(&mut controller, &[1, 2, 3, 1]);
    assert!(controller.can_submit());
    assert_eq!(controller.submit(), Ok(3));
    assert_eq!(controller.phase(), AttemptPhase::Submitted);
    assert_eq!(controller.score(), Some(3));
    assert_eq!(controller.tier(), Some(ScoreTier::Pass));
}

#[test]
fn two_questions_none_right_keeps_practicing() {
    let mut controller = loaded(&[1, 2]);
    answer_all(&mut controller, &[2, 1]);
    assert_eq!(controller.submit(), Ok(0));
    assert_eq!(controller.tier(), Some(ScoreTier::KeepPracticing));
}

#[test]
fn tier_boundaries_around_half() {
    assert_eq!(ScoreTier::for_score(4, 4), ScoreTier::Perfect);
    assert_eq!(ScoreTier::for_score(2, 4), ScoreTier::Pass);
    assert_eq!(ScoreTier::for_score(1, 4), ScoreTier::KeepPracticing);
    assert_eq!(ScoreTier::for_score(2, 5), ScoreTier::KeepPracticing);
    assert_eq!(ScoreTier::for_score(3, 5), ScoreTier::Pass);
    assert_eq!(ScoreTier::for_score(0, 1), ScoreTier::KeepPracticing);
    assert_eq!(ScoreTier::for_score(1, 1), ScoreTier::Perfect);
    assert_eq!(
        ScoreTier::Pass.message(),
        "Good job! You passed the quiz."
    );
}

#[test]
fn score_is_independent_of_selection_order() {
    let quiz = quiz_with_correct(&[1, 2, 3, 4]);
    let final_choices = [(100, 1), (101, 3), (102, 3), (103, 4)];

    let mut forward = HashMap::new();
    for (id, choice) in final_choices {
        forward.insert(QuestionId(id), pos(choice));
    }

    let mut shuffled = HashMap::new();
    shuffled.insert(QuestionId(103), pos(1));
    for (id, choice) in final_choices.iter().rev() {
        shuffled.insert(QuestionId(*id), pos(*choice));
    }

    assert_eq!(score_answers(&quiz, &forward), 3);
    assert_eq!(score_answers(&quiz, &shuffled), 3);
    assert_eq!(score_answers(&quiz, &forward), score_answers(&quiz, &forward));
}

#[test]
fn review_annotates_every_option_of_every_question() {
    let mut controller = loaded(&[1, 2]);
    answer_all(&mut controller, &[1, 4]);
    controller.submit().expect("submit");

    let review = controller.review();
    assert_eq!(review.len(), 2);

    let first = &review[0];
    assert!(first.answered_correctly());
    assert_eq!(first.summary(), "You answered correctly!");
    assert_eq!(first.options.len(), 4);
    assert!(first.options[0].is_correct && first.options[0].is_selected);

    let second = &review[1];
    assert!(!second.answered_correctly());
    assert_eq!(second.summary(), "Your answer: 4, Correct answer: 2");
    assert!(second.options[1].is_correct && !second.options[1].is_selected);
    assert!(second.options[3].is_selected && !second.options[3].is_correct);
    assert_eq!(second.options[3].text, "four");
}

#[test]
fn navigation_is_rejected_after_submit() {
    let mut controller = loaded(&[1]);
    answer_all(&mut controller, &[1]);
    controller.submit().expect("submit");
    assert_eq!(controller.tier(), Some(ScoreTier::Perfect));
    assert_eq!(
        controller.select_answer(QuestionId(100), pos(2)),
        Err(AttemptError::WrongPhase(AttemptPhase::Submitted))
    );
    assert_eq!(
        controller.next(),
        Err(AttemptError::WrongPhase(AttemptPhase::Submitted))
    );
    assert!(controller.steps().is_empty());
}

#[test]
fn new_quiz_drops_everything_and_clears_the_id() {
    let mut controller = loaded(&[1, 2]);
    assert_eq!(
        controller.new_quiz(),
        Err(AttemptError::WrongPhase(AttemptPhase::InProgress))
    );
    answer_all(&mut controller, &[1, 2]);
    controller.submit().expect("submit");

    controller.new_quiz().expect("new quiz");
    assert_eq!(controller.phase(), AttemptPhase::AwaitingId);
    assert_eq!(controller.quiz_id_input(), "");
    assert!(controller.quiz().is_none());
    assert_eq!(controller.score(), None);
    assert_eq!(controller.selected(QuestionId(100)), None);
    assert!(!controller.can_fetch());
}

#[test]
fn retry_keeps_quiz_and_clears_answers() {
    let mut controller = loaded(&[1, 2]);
    assert!(controller.retry().is_err());
    assert_eq!(controller.phase(), AttemptPhase::InProgress);

    answer_all(&mut controller, &[2, 2]);
    controller.submit().expect("submit");
    controller.retry().expect("retry");

    assert_eq!(controller.phase(), AttemptPhase::InProgress);
    assert_eq!(controller.current_index(), Some(0));
    assert_eq!(controller.selected(QuestionId(100)), None);
    assert_eq!(controller.quiz().map(|q| q.questions.len()), Some(2));
    assert_eq!(controller.quiz_id_input(), "123456");
}

#[test]
fn abort_fetch_returns_to_id_entry_with_reason() {
    let mut controller = AttemptController::new();
    controller.edit_quiz_id("123456").expect("edit");
    controller.begin_fetch().expect("begin");

    controller.abort_fetch("queue full");

    assert_eq!(controller.phase(), AttemptPhase::AwaitingId);
    assert_eq!(controller.error(), Some("queue full"));
    assert_eq!(controller.quiz_id_input(), "123456");
    assert!(controller.can_fetch());

    let mut in_progress = loaded(&[1]);
    in_progress.abort_fetch("ignored");
    assert_eq!(in_progress.phase(), AttemptPhase::InProgress);
    assert_eq!(in_progress.error(), None);
}
