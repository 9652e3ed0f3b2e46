//! Terminal front-end for interactive tutoring sessions.
//!
//! Everything here is a consumer of [`crate::core::orchestrator`]: it submits
//! questions and renders whatever the transcript, video slot and notice
//! channels publish. No tutoring logic lives in this layer.
//!
//! - [`chat_loop`]: the line-oriented interaction loop and slash commands.
//! - [`render`]: text formatting for turns, notices and status lines.

pub mod chat_loop;
pub mod render;
