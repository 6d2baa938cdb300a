use std::{io, path::PathBuf, time::Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config, notice::NoticeKind, AttemptController, AuthoringController, QuizApi, QuizApiClient,
    QuizDraft,
};
use shared::{domain::QuizId, protocol::QuizDocument};
use tracing_subscriber::EnvFilter;

mod take;

#[derive(Parser, Debug)]
#[command(about = "Command-line client for the quiz API")]
struct Args {
    /// Quiz API base URL; overrides quizdesk.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file to use instead of ./quizdesk.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a quiz with its correct answers marked.
    Show {
        id: QuizId,
        /// Print the raw JSON document instead.
        #[arg(long)]
        json: bool,
    },
    /// Validate a draft quiz JSON file and create it.
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Ask the server for an unused quiz ID.
    GenerateId,
    /// Print whether a quiz with this ID exists.
    Exists { id: QuizId },
    /// Take a quiz interactively on stdin.
    Take { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let settings = config::resolve_settings(args.config.as_deref(), args.api_url)?;
    let client = QuizApiClient::from_settings(&settings)?;
    tracing::debug!(api_base_url = client.base_url(), "using quiz API");

    match args.command {
        Command::Show { id, json } => {
            let quiz = client.fetch_quiz(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&QuizDocument::from(&quiz))?);
            } else {
                print!("{}", take::render_quiz(&quiz));
            }
        }
        Command::Create { file } => create_from_file(&client, &file).await?,
        Command::GenerateId => println!("{}", client.generate_quiz_id().await?),
        Command::Exists { id } => println!("{}", client.quiz_exists(&id).await?),
        Command::Take { id } => {
            let mut controller = AttemptController::new();
            controller.edit_quiz_id(&id)?;
            let quiz_id = controller.begin_fetch()?;
            controller.complete_fetch(client.fetch_quiz(&quiz_id).await);
            if let Some(err) = controller.error() {
                bail!("{err}");
            }
            take::run_attempt(&mut controller, io::stdin().lock(), io::stdout())?;
        }
    }

    Ok(())
}

async fn create_from_file(client: &dyn QuizApi, path: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc: QuizDocument = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a quiz document", path.display()))?;
    let draft = QuizDraft::try_from(doc)?;

    let mut controller = AuthoringController::new().with_draft(draft);
    if let Some(err) = controller.id_error() {
        bail!("{err}");
    }
    let request = controller
        .begin_submit()
        .context("every field of the quiz and of each question must be filled in")?;
    let quiz_id = request.id.clone();
    let outcome = client.create_quiz(&request).await;
    controller.complete_submit(outcome, Instant::now());

    match controller.notice() {
        Some(notice) if notice.kind == NoticeKind::Success => {
            println!("{} ({quiz_id})", notice.text);
            Ok(())
        }
        Some(notice) => bail!("{}", notice.text),
        None => bail!("quiz creation finished without a result"),
    }
}
