//! Line-oriented quiz attempt on top of `AttemptController`.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use client_core::{attempt::AttemptPhase, AttemptController};
use shared::domain::{AnswerPosition, Quiz};

/// Prints a quiz with its correct answers marked.
pub fn render_quiz(quiz: &Quiz) -> String {
    let mut out = format!(
        "{} [{}] id={} ({} questions)\n",
        quiz.name,
        quiz.difficulty.label(),
        quiz.id,
        quiz.len()
    );
    for (index, question) in quiz.questions.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", index + 1, question.title));
        for position in AnswerPosition::ALL {
            let marker = if position == question.correct { '*' } else { ' ' };
            out.push_str(&format!(
                "  {marker} {position}) {}\n",
                question.answer(position)
            ));
        }
    }
    out
}

enum Input {
    Answer(AnswerPosition),
    Prev,
    Next,
    Submit,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "prev" => Some(Input::Prev),
        "n" | "next" => Some(Input::Next),
        "s" | "submit" => Some(Input::Submit),
        "q" | "quit" => Some(Input::Quit),
        other => other
            .parse::<u8>()
            .ok()
            .and_then(AnswerPosition::from_number)
            .map(Input::Answer),
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_current<W: Write>(controller: &AttemptController, out: &mut W) -> Result<()> {
    let (Some(quiz), Some(question), Some(index)) = (
        controller.quiz(),
        controller.current_question(),
        controller.current_index(),
    ) else {
        return Ok(());
    };
    writeln!(out, "\nQuestion {} of {}: {}", index + 1, quiz.len(), question.title)?;
    let selected = controller.selected(question.id);
    for position in AnswerPosition::ALL {
        let marker = if selected == Some(position) { '>' } else { ' ' };
        writeln!(out, " {marker} {position}) {}", question.answer(position))?;
    }
    let hint = if controller.is_last_question() {
        "answer 1-4, p = previous, s = submit, q = quit"
    } else {
        "answer 1-4, p = previous, n = next, q = quit"
    };
    write!(out, "[{hint}] > ")?;
    out.flush()?;
    Ok(())
}

fn print_results<W: Write>(controller: &AttemptController, out: &mut W) -> Result<()> {
    let total = controller.quiz().map(Quiz::len).unwrap_or(0);
    let score = controller.score().unwrap_or(0);
    writeln!(out, "\nYou scored {score} out of {total}")?;
    if let Some(tier) = controller.tier() {
        writeln!(out, "{}", tier.message())?;
    }
    for (index, review) in controller.review().iter().enumerate() {
        writeln!(out, "\n{}. {}", index + 1, review.title)?;
        writeln!(out, "   {}", review.summary())?;
    }
    Ok(())
}

/// Drives a loaded attempt from `input` until it is submitted and the user
/// declines a retry. Answering a question moves on to the next one.
pub fn run_attempt<R: BufRead, W: Write>(
    controller: &mut AttemptController,
    mut input: R,
    mut out: W,
) -> Result<()> {
    if controller.phase() != AttemptPhase::InProgress {
        bail!("no quiz loaded");
    }
    loop {
        while controller.phase() == AttemptPhase::InProgress {
            print_current(controller, &mut out)?;
            let Some(line) = read_line(&mut input)? else {
                bail!("input closed before the quiz was submitted");
            };
            let result = match parse_input(&line) {
                Some(Input::Answer(position)) => {
                    let Some(question_id) = controller.current_question().map(|q| q.id) else {
                        continue;
                    };
                    controller
                        .select_answer(question_id, position)
                        .and_then(|()| {
                            if controller.is_last_question() {
                                Ok(())
                            } else {
                                controller.next()
                            }
                        })
                }
                Some(Input::Prev) => controller.prev(),
                Some(Input::Next) => controller.next(),
                Some(Input::Submit) => controller.submit().map(|_| ()),
                Some(Input::Quit) => bail!("attempt abandoned"),
                None => {
                    writeln!(out, "unrecognized input: {}", line.trim())?;
                    continue;
                }
            };
            if let Err(err) = result {
                writeln!(out, "{err}")?;
            }
        }

        print_results(controller, &mut out)?;
        write!(out, "\nr = retry, anything else = exit > ")?;
        out.flush()?;
        match read_line(&mut input)? {
            Some(line) if line.trim().eq_ignore_ascii_case("r") => controller.retry()?,
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "tests/take_tests.rs"]
mod tests;
