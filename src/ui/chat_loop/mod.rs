//! Interactive line-based chat.
//!
//! The loop multiplexes four sources with `tokio::select!`: stdin lines,
//! side-channel notices, transcript appends and video slot changes. Questions
//! are submitted without waiting for their cycle; results show up through the
//! watch channels as each branch settles. When input ends, the loop waits
//! for the running cycle and prints what it produced before shutting down.

use std::error::Error;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::commands::{process_input, Command, CommandResult, HELP_TEXT};
use crate::core::message::Turn;
use crate::core::notice::Notice;
use crate::core::orchestrator::{OrchestrationState, Orchestrator};
use crate::core::subject::Subject;
use crate::core::video::VideoAsset;
use crate::ui::render::{format_notice, format_status, format_turn, format_video};
use crate::utils::logging::{dump_transcript, LoggingState};

pub struct ChatLoop {
    orchestrator: Orchestrator,
    notices: mpsc::UnboundedReceiver<Notice>,
    logging: LoggingState,
    printed_turns: usize,
    output: Box<dyn Write + Send>,
}

enum Flow {
    Continue,
    Quit,
}

impl ChatLoop {
    pub fn new(
        orchestrator: Orchestrator,
        notices: mpsc::UnboundedReceiver<Notice>,
        transcript_log: Option<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            notices,
            logging: LoggingState::new(transcript_log),
            printed_turns: 0,
            output: Box::new(io::stdout()),
        }
    }

    /// Send everything the loop prints to `output` instead of stdout.
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub async fn run(self, subject: Subject) -> Result<(), Box<dyn Error>> {
        self.run_with_input(subject, BufReader::new(tokio::io::stdin()))
            .await
    }

    /// Drive the loop from any line source. End of input lets the running
    /// cycle finish; `/quit` does not wait.
    pub async fn run_with_input<R>(mut self, subject: Subject, input: R) -> Result<(), Box<dyn Error>>
    where
        R: AsyncBufRead + Unpin,
    {
        self.say(format_args!(
            "📚 tutorlens - ask a {subject} question, or /help for commands"
        ));
        self.start_session(subject).await;

        let mut transcript_rx = self.orchestrator.transcript().subscribe();
        let mut video_rx = self.orchestrator.video().subscribe();
        let mut lines = input.lines();
        self.prompt();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("input closed; waiting for the current question");
                        self.finish_pending(&mut video_rx).await;
                        break;
                    };
                    if let Flow::Quit = self.handle_line(&line).await {
                        break;
                    }
                    self.prompt();
                }
                Some(notice) = self.notices.recv() => {
                    self.say(format_args!("\r{}", format_notice(&notice)));
                }
                changed = transcript_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let transcript = transcript_rx.borrow_and_update().clone();
                    self.show_new_turns(&transcript);
                }
                changed = video_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = video_rx.borrow_and_update().clone();
                    if let Some(asset) = current {
                        self.say(format_args!("\r{}", format_video(&asset)));
                        self.prompt();
                    }
                }
            }
        }

        self.orchestrator.shutdown();
        let _ = self.output.flush();
        Ok(())
    }

    /// Wait until no cycle is running, then print the turns, notices and
    /// video it left behind.
    async fn finish_pending(&mut self, video_rx: &mut watch::Receiver<Option<Arc<VideoAsset>>>) {
        let mut state = self.orchestrator.subscribe_state();
        let _ = state.wait_for(OrchestrationState::is_idle).await;

        let transcript = self.orchestrator.transcript().snapshot();
        self.show_new_turns(&transcript);
        while let Ok(notice) = self.notices.try_recv() {
            self.say(format_notice(&notice));
        }
        if video_rx.has_changed().unwrap_or(false) {
            let current = video_rx.borrow_and_update().clone();
            if let Some(asset) = current {
                self.say(format_video(&asset));
            }
        }
    }

    async fn start_session(&mut self, subject: Subject) {
        if let Err(err) = self.orchestrator.begin_session(subject).await {
            eprintln!("⚠️  {err}");
        }
        while let Ok(notice) = self.notices.try_recv() {
            self.say(format_notice(&notice));
        }
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        match process_input(line) {
            CommandResult::Run(Command::Quit) => return Flow::Quit,
            CommandResult::Run(command) => self.execute(command).await,
            CommandResult::Invalid(usage) => self.say(usage),
            CommandResult::ProcessAsMessage(text) => {
                if text.trim().is_empty() {
                    return Flow::Continue;
                }
                match self.orchestrator.submit(text) {
                    Ok(_cycle) => self.say("⏳ Thinking..."),
                    Err(err) => self.say(format_args!("⚠️  {err}")),
                }
            }
        }
        Flow::Continue
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Help => self.say(HELP_TEXT),
            Command::Quit => {}
            Command::Subject(subject) => self.start_session(subject).await,
            Command::Status => {
                let video = self.orchestrator.video().get();
                let status = format!(
                    "{}\nTranscript log: {}",
                    format_status(&self.orchestrator.state(), video.as_deref()),
                    self.logging.get_status_string()
                );
                self.say(status);
            }
            Command::Save(path) => match self.orchestrator.video().get() {
                Some(asset) => match asset.save_copy(&path) {
                    Ok(saved) => self.say(format_args!("💾 Saved video to {}", saved.display())),
                    Err(err) => self.say(format_args!("❌ Could not save video: {err}")),
                },
                None => self.say("No video to save yet."),
            },
            Command::Log(Some(path)) => match self.logging.set_log_file(path) {
                Ok(message) => self.say(message),
                Err(err) => self.say(format_args!("❌ Error setting log file: {err}")),
            },
            Command::Log(None) => match self.logging.toggle_logging() {
                Ok(message) => self.say(message),
                Err(err) => self.say(format_args!("❌ {err}")),
            },
            Command::Dump(path) => {
                let transcript = self.orchestrator.transcript().snapshot();
                match dump_transcript(&path, &transcript) {
                    Ok(()) => self.say(format_args!(
                        "📝 Wrote {} turns to {}",
                        transcript.len(),
                        path.display()
                    )),
                    Err(err) => self.say(format_args!("❌ Could not write transcript: {err}")),
                }
            }
        }
    }

    /// Print assistant turns appended since the last call and log every new
    /// turn. User turns are not echoed; the user just typed them.
    fn show_new_turns(&mut self, transcript: &[Turn]) {
        for turn in transcript.iter().skip(self.printed_turns) {
            if let Err(err) = self.logging.log_turn(turn) {
                eprintln!("Failed to log message: {err}");
            }
            if turn.is_assistant() {
                let _ = write!(self.output, "\r{}", format_turn(turn));
                self.prompt();
            }
        }
        self.printed_turns = transcript.len();
    }

    // Terminal write failures are not actionable mid-conversation.
    fn say(&mut self, text: impl Display) {
        let _ = writeln!(self.output, "{text}");
    }

    fn prompt(&mut self) {
        let _ = write!(self.output, "> ");
        let _ = self.output.flush();
    }
}

#[cfg(test)]
mod tests;
