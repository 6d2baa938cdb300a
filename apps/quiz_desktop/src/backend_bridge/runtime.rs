//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::QuizApi;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the worker thread. It owns a tokio runtime and runs each command
/// as its own task, so a slow fetch never holds up a submission.
pub fn launch<A>(api: A, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>)
where
    A: QuizApi + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api: Arc<dyn QuizApi> = Arc::new(api);
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
        tracing::info!("backend worker ready");

        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let event = handle_command(api.as_ref(), cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui event receiver dropped");
                }
            });
        }
        tracing::info!("backend worker stopping: command queue closed");
    });
}

pub async fn handle_command(api: &dyn QuizApi, cmd: BackendCommand) -> UiEvent {
    tracing::debug!(command = cmd.name(), "backend: handling command");
    match cmd {
        BackendCommand::FetchQuiz { quiz_id } => match api.fetch_quiz(&quiz_id).await {
            Ok(quiz) => UiEvent::QuizLoaded(quiz),
            Err(err) => UiEvent::QuizLoadFailed(err),
        },
        BackendCommand::CreateQuiz { request } => match api.create_quiz(&request).await {
            Ok(created) => UiEvent::QuizCreated {
                quiz_id: request.id,
                created,
            },
            Err(err) => UiEvent::QuizCreateFailed(err),
        },
        BackendCommand::GenerateQuizId => match api.generate_quiz_id().await {
            Ok(quiz_id) => UiEvent::QuizIdGenerated(quiz_id),
            Err(err) => {
                tracing::warn!(error = %err, "backend: generate quiz id failed");
                UiEvent::Error(UiError::from_request(UiErrorContext::GenerateQuizId, &err))
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
