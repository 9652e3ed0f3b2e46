pub mod backend;
pub mod classification;
pub mod config;
pub mod constants;
pub mod message;
pub mod notice;
pub mod orchestrator;
pub mod subject;
pub mod transcript;
pub mod transport;
pub mod video;
