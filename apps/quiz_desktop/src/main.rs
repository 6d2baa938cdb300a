use std::path::PathBuf;

use clap::Parser;
use client_core::{config, QuizApiClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::QuizDeskApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop client for writing and taking quizzes")]
struct Args {
    /// Quiz API base URL, e.g. http://localhost:8080/api
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file to use instead of ./quizdesk.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = config::resolve_settings(args.config.as_deref(), args.api_url)?;
    let client = QuizApiClient::from_settings(&settings)?;
    settings.api_base_url = client.base_url().to_string();
    tracing::info!(api_base_url = %settings.api_base_url, "starting quiz desktop");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(client, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Quiz Desk")
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([560.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Quiz Desk",
        options,
        Box::new(move |_cc| Ok(Box::new(QuizDeskApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop shell exited with error: {err}"))
}
