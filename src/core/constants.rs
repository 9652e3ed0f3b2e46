//! User-facing text shared by the orchestrator and the front-ends.
//!
//! Failures never show backend detail to the learner; they map onto one of
//! these fixed strings and the detail goes to the log.

/// Assistant turn appended when classification or explanation fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

pub const NOTICE_CHAT_FAILED: &str = "Something went wrong. Please try again.";
pub const NOTICE_VIDEO_STARTED: &str = "Generating explanation and visualization...";
pub const NOTICE_VIDEO_READY: &str = "Visualization ready!";
pub const NOTICE_VIDEO_FAILED: &str = "Failed to generate visualization";
pub const NOTICE_SESSION_FAILED: &str = "Failed to start session. Please try again.";
