use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tutoring subject; selects the explanation model on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    Physics,
    Mathematics,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::Physics, Subject::Mathematics];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Mathematics => "mathematics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "physics" => Ok(Subject::Physics),
            "mathematics" | "math" | "maths" => Ok(Subject::Mathematics),
            other => Err(format!(
                "unknown subject '{other}' (expected 'physics' or 'mathematics')"
            )),
        }
    }
}
