//! tutorlens is a terminal client for an AI science tutor.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation transcript, the current video, the
//!   orchestration of classify/explain/animate cycles, and configuration.
//! - [`api`] defines the JSON payloads exchanged with the tutor servers.
//! - [`ui`] renders turns and notices and runs the interactive chat loop.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings, builds the HTTP
//! backend, and dispatches into [`ui::chat_loop`] or the one-shot `ask`
//! command.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
