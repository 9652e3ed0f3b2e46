//! Slash commands understood by the interactive chat loop.

use std::path::PathBuf;

use crate::core::subject::Subject;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Start a fresh backend session for another subject.
    Subject(Subject),
    /// Show the current video and cycle status.
    Status,
    /// Copy the current video somewhere permanent.
    Save(PathBuf),
    /// `/log` toggles, `/log <file>` starts logging to a file.
    Log(Option<PathBuf>),
    /// Write the whole transcript to a file.
    Dump(PathBuf),
}

pub enum CommandResult {
    Run(Command),
    /// Looked like a command but could not be parsed; the string is the usage hint.
    Invalid(String),
    ProcessAsMessage(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /subject <physics|mathematics>  Start a new session for a subject
  /status                         Show the current video and progress
  /save <file>                    Copy the current video to a file
  /log [file]                     Log the conversation to a file, or toggle logging
  /dump <file>                    Write the conversation so far to a file
  /help                           Show this help
  /quit                           Exit";

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let (name, argument) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let path_argument = |usage: &str| {
        if argument.is_empty() {
            CommandResult::Invalid(usage.to_string())
        } else {
            CommandResult::Run(match name {
                "save" => Command::Save(PathBuf::from(argument)),
                _ => Command::Dump(PathBuf::from(argument)),
            })
        }
    };

    match name {
        "help" | "?" => CommandResult::Run(Command::Help),
        "quit" | "exit" => CommandResult::Run(Command::Quit),
        "status" => CommandResult::Run(Command::Status),
        "subject" => match argument.parse::<Subject>() {
            Ok(subject) => CommandResult::Run(Command::Subject(subject)),
            Err(_) => CommandResult::Invalid("Usage: /subject <physics|mathematics>".to_string()),
        },
        "save" => path_argument("Usage: /save <file>"),
        "dump" => path_argument("Usage: /dump <file>"),
        "log" => CommandResult::Run(Command::Log(
            (!argument.is_empty()).then(|| PathBuf::from(argument)),
        )),
        // Unknown slash text is sent as a question; "/" can start a formula.
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}
