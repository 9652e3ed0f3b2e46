use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::subject::Subject;

/// Settings persisted in `config.toml`. Every field is optional; missing
/// values fall back to environment variables and then built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the explanation server (classification, explanations,
    /// subject selection).
    pub explain_url: Option<String>,
    /// Base URL of the animation server.
    pub video_url: Option<String>,
    /// Subject selected at startup when `--subject` is not given.
    pub default_subject: Option<Subject>,
    /// Directory that holds downloaded animations while they are on display.
    pub video_dir: Option<PathBuf>,
}

/// Keys accepted by `tutorlens set` / `tutorlens unset`.
pub const CONFIG_KEYS: [&str; 4] = ["explain-url", "video-url", "default-subject", "video-dir"];

impl Config {
    /// Apply `tutorlens set <key> <value>`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for '{key}'"));
        }

        match key {
            "explain-url" => self.explain_url = Some(validate_url(value)?),
            "video-url" => self.video_url = Some(validate_url(value)?),
            "default-subject" => self.default_subject = Some(value.parse()?),
            "video-dir" => self.video_dir = Some(PathBuf::from(value)),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Apply `tutorlens unset <key>`.
    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "explain-url" => self.explain_url = None,
            "video-url" => self.video_url = None,
            "default-subject" => self.default_subject = None,
            "video-dir" => self.video_dir = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of: {})",
        CONFIG_KEYS.join(", ")
    )
}

fn validate_url(value: &str) -> Result<String, String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(format!("'{value}' is not an http(s) URL"))
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
