use crate::core::message::Turn;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Plain-text transcript log. Each turn is written as it appears on screen,
/// prefixed by a timestamp and the speaker.
pub struct LoggingState {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl LoggingState {
    /// A log file given on the command line is active from the start.
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: PathBuf) -> Result<String, Box<dyn std::error::Error>> {
        // Fail now rather than on the first turn.
        OpenOptions::new().create(true).append(true).open(&path)?;

        let message = format!("Logging enabled to: {}", path.display());
        self.file_path = Some(path);
        self.is_active = true;
        Ok(message)
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {}", path.display()))
                } else {
                    Ok(format!("Logging paused (file: {})", path.display()))
                }
            }
            None => Err("No log file specified. Use /log <filename> to enable logging first.".into()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active && self.file_path.is_some()
    }

    pub fn log_turn(&self, turn: &Turn) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);
        write_turn(&mut writer, turn, Some(Local::now()))?;
        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        let name = |path: &Path| {
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", name(path)),
            (Some(path), false) => format!("paused ({})", name(path)),
        }
    }
}

/// Write a whole transcript to `path`, replacing any existing file atomically.
pub fn dump_transcript(path: &Path, turns: &[Turn]) -> Result<(), Box<dyn std::error::Error>> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp_file = NamedTempFile::new_in(parent)?;

    for turn in turns {
        write_turn(&mut temp_file, turn, None)?;
    }

    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

fn write_turn<W: Write>(
    writer: &mut W,
    turn: &Turn,
    timestamp: Option<DateTime<Local>>,
) -> std::io::Result<()> {
    let label = turn.role.display_label();
    match timestamp {
        Some(ts) => writeln!(writer, "[{}] {label}:", ts.format("%Y-%m-%d %H:%M:%S"))?,
        None => writeln!(writer, "{label}:")?,
    }
    for line in turn.text.lines() {
        writeln!(writer, "{line}")?;
    }
    // Blank line between turns, matching the screen.
    writeln!(writer)
}
