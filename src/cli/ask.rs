//! Non-interactive "ask" command

use std::error::Error;
use std::path::PathBuf;

use chrono::Local;
use tokio::sync::mpsc;

use crate::core::notice::Notice;
use crate::core::orchestrator::Orchestrator;
use crate::core::subject::Subject;
use crate::ui::render::{format_notice, format_turn};
use crate::utils::logging::LoggingState;

pub async fn run_ask(
    orchestrator: Orchestrator,
    mut notices: mpsc::UnboundedReceiver<Notice>,
    subject: Subject,
    question: Vec<String>,
    output: Option<PathBuf>,
    transcript_log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let question = question.join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: tutorlens ask <question>");
        std::process::exit(1);
    }

    if let Err(err) = orchestrator.begin_session(subject).await {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
    // The session notice is noise for a one-shot answer.
    while notices.try_recv().is_ok() {}

    orchestrator.ask(question).await?;
    orchestrator.shutdown();

    let transcript = orchestrator.transcript().snapshot();
    let logging = LoggingState::new(transcript_log);
    for turn in transcript.iter() {
        logging.log_turn(turn)?;
    }
    if let Some(answer) = transcript.iter().rev().find(|turn| turn.is_assistant()) {
        print!("{}", format_turn(answer));
    }

    while let Ok(notice) = notices.try_recv() {
        eprintln!("{}", format_notice(&notice));
    }

    if let Some(asset) = orchestrator.video().get() {
        let destination = output.unwrap_or_else(|| {
            PathBuf::from(format!(
                "tutorlens-{}.mp4",
                Local::now().format("%Y%m%d-%H%M%S")
            ))
        });
        let saved = asset.save_copy(&destination)?;
        eprintln!("💾 Saved animation to {}", saved.display());
    }

    Ok(())
}
