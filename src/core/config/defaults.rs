use std::path::PathBuf;

use crate::core::backend::BackendEndpoints;
use crate::core::config::data::Config;
use crate::core::subject::Subject;

pub const DEFAULT_EXPLAIN_URL: &str = "http://localhost:8000";
pub const DEFAULT_VIDEO_URL: &str = "http://localhost:8080";

pub const ENV_EXPLAIN_URL: &str = "TUTORLENS_EXPLAIN_URL";
pub const ENV_VIDEO_URL: &str = "TUTORLENS_VIDEO_URL";

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoints: BackendEndpoints,
    pub subject: Subject,
    pub video_dir: PathBuf,
}

impl Config {
    /// Resolve settings with precedence: explicit override, environment,
    /// config file, built-in default.
    pub fn resolve(&self, subject_override: Option<Subject>) -> Settings {
        self.resolve_with_env(subject_override, |key| std::env::var(key).ok())
    }

    pub(crate) fn resolve_with_env<F>(&self, subject_override: Option<Subject>, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |env_key: &str, configured: &Option<String>, fallback: &str| {
            env(env_key)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| configured.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        Settings {
            endpoints: BackendEndpoints {
                explain_url: pick(ENV_EXPLAIN_URL, &self.explain_url, DEFAULT_EXPLAIN_URL),
                video_url: pick(ENV_VIDEO_URL, &self.video_url, DEFAULT_VIDEO_URL),
            },
            subject: subject_override
                .or(self.default_subject)
                .unwrap_or_default(),
            video_dir: self.video_dir.clone().unwrap_or_else(default_video_dir),
        }
    }
}

/// Cache directory when one can be determined, else the system temp dir.
pub fn default_video_dir() -> PathBuf {
    Config::project_dirs()
        .map(|dirs| dirs.cache_dir().join("videos"))
        .unwrap_or_else(|| std::env::temp_dir().join("tutorlens"))
}
