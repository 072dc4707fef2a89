use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    AutoConfirm, CommentController, DeleteConfirmation, DeleteOutcome, ViewStatus,
};
use serde::Serialize;
use shared::{
    domain::{AuthorContext, CommentId, ParentId, ParentType, ThreadKey},
    protocol::{Notification, ThreadCount},
};
use storage::{load_seed_file, CommentStore};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod session;

use config::{load_settings, Settings, DEFAULT_CONFIG_PATH};
use session::{parse_line, retry_feedback, SessionCommand, HELP};

#[derive(Parser, Debug)]
#[command(name = "comments", about = "Manage comment threads on questions and answers")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Seed file with existing comments; overrides the configured path.
    #[arg(long)]
    seed: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    parent_id: i64,
    #[arg(long, default_value = "question", value_parser = parse_parent_type)]
    parent_type: ParentType,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Count,
    Get {
        id: i64,
    },
    Add {
        body: String,
    },
    Edit {
        id: i64,
        body: String,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Read line commands from stdin against one long-lived store.
    Session,
}

fn parse_parent_type(raw: &str) -> Result<ParentType, String> {
    ParentType::parse(raw).ok_or_else(|| format!("unknown parent type '{raw}'"))
}

/// Asks on the terminal before a delete goes through.
struct StdinConfirmation;

#[async_trait]
impl DeleteConfirmation for StdinConfirmation {
    async fn confirm_delete(&self, comment_id: CommentId) -> bool {
        let answer = tokio::task::spawn_blocking(move || {
            eprint!("Are you sure you want to delete comment {comment_id}? [y/N] ");
            let _ = io::stderr().flush();
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(seed) = cli.seed.clone() {
        settings.seed_path = seed;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let store = build_store(&settings)?;
    let thread = ThreadKey::new(ParentId(cli.parent_id), cli.parent_type);
    let author = settings.author();

    match cli.command {
        Command::List => {
            let controller = CommentController::new(Arc::new(store), thread);
            let mut notes = controller.subscribe_notifications();
            let loaded = controller.load().await;
            print_notifications(&mut notes);
            loaded?;
            print_json(&controller.comments().await)?;
        }
        Command::Count => {
            let count = store.count_by_parent(thread.parent_id, thread.parent_type).await;
            print_json(&ThreadCount {
                parent_id: thread.parent_id,
                parent_type: thread.parent_type,
                count,
            })?;
        }
        Command::Get { id } => {
            let comment = store.get_by_id(CommentId(id)).await?;
            print_json(&comment)?;
        }
        Command::Add { body } => {
            let controller = CommentController::new(Arc::new(store), thread);
            let mut notes = controller.subscribe_notifications();
            let created = controller.add_comment(&author, &body).await;
            print_notifications(&mut notes);
            print_json(&created?)?;
        }
        Command::Edit { id, body } => {
            let controller = CommentController::new(Arc::new(store), thread);
            let mut notes = controller.subscribe_notifications();
            let updated = controller.edit_comment(CommentId(id), &body).await;
            print_notifications(&mut notes);
            print_json(&updated?)?;
        }
        Command::Delete { id, yes } => {
            let confirmation: Arc<dyn DeleteConfirmation> = if yes {
                Arc::new(AutoConfirm)
            } else {
                Arc::new(StdinConfirmation)
            };
            let controller =
                CommentController::new_with_confirmation(Arc::new(store), thread, confirmation);
            let mut notes = controller.subscribe_notifications();
            let outcome = controller.delete_comment(CommentId(id)).await;
            print_notifications(&mut notes);
            match outcome {
                DeleteOutcome::Deleted(removed) => print_json(&removed)?,
                DeleteOutcome::Declined => eprintln!("delete cancelled"),
                DeleteOutcome::Failed(report) => {
                    return Err(anyhow!("{}", report.message));
                }
            }
        }
        Command::Session => run_session(store, thread, author).await?,
    }

    Ok(())
}

fn build_store(settings: &Settings) -> Result<CommentStore> {
    let seed = if settings.seed_path.exists() {
        load_seed_file(&settings.seed_path)?
    } else {
        warn!(
            seed_path = %settings.seed_path.display(),
            "comments: seed file not found, starting empty"
        );
        Vec::new()
    };
    let store = CommentStore::from_seed(seed)
        .with_context(|| format!("invalid seed data in '{}'", settings.seed_path.display()))?;
    Ok(store.with_latency(settings.latency()))
}

async fn run_session(store: CommentStore, thread: ThreadKey, author: AuthorContext) -> Result<()> {
    let controller = CommentController::new(Arc::new(store), thread);
    let mut notes = controller.subscribe_notifications();
    info!(thread = %thread, "comments: session started");

    if controller.load().await.is_err() {
        eprintln!("initial load failed; type 'retry' to try again");
    }
    print_notifications(&mut notes);
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::List => {
                if controller.status().await == ViewStatus::LoadFailed {
                    eprintln!("comments unavailable; type 'retry'");
                } else {
                    print_json(&controller.comments().await)?;
                }
            }
            SessionCommand::Count => {
                print_json(&ThreadCount {
                    parent_id: thread.parent_id,
                    parent_type: thread.parent_type,
                    count: controller.comment_count().await,
                })?;
            }
            SessionCommand::Retry => {
                if let Some(feedback) = retry_feedback(&controller.retry().await) {
                    eprintln!("{feedback}");
                }
            }
            SessionCommand::Add { body } => {
                if let Ok(created) = controller.add_comment(&author, &body).await {
                    print_json(&created)?;
                }
            }
            SessionCommand::Edit { id, body } => {
                if let Ok(updated) = controller.edit_comment(id, &body).await {
                    print_json(&updated)?;
                }
            }
            SessionCommand::Delete { id } => {
                if let DeleteOutcome::Deleted(removed) = controller.delete_comment(id).await {
                    print_json(&removed)?;
                }
            }
        }
        print_notifications(&mut notes);
    }

    info!(thread = %thread, "comments: session ended");
    Ok(())
}

fn print_notifications(notes: &mut broadcast::Receiver<Notification>) {
    while let Ok(note) = notes.try_recv() {
        let marker = if note.is_success() { "ok" } else { "error" };
        eprintln!("[{marker}] {}", note.message);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
