//! Command-line interface parsing and handling
//!
//! This module parses arguments, installs the tracing subscriber and wires the
//! HTTP backend into an orchestrator before handing off to a subcommand.

pub mod ask;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::cli::ask::run_ask;
use crate::core::backend::HttpBackend;
use crate::core::config::{Config, Settings};
use crate::core::notice::{Notice, NoticeSender};
use crate::core::orchestrator::Orchestrator;
use crate::core::subject::Subject;
use crate::ui::chat_loop::ChatLoop;

const HTTP_CONNECT_TIMEOUT_SECONDS: u64 = 10;
const USER_AGENT: &str = concat!("tutorlens/", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(name = "tutorlens")]
#[command(about = "A terminal tutor that answers physics and mathematics questions")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", rustc ",
    env!("VERGEN_RUSTC_SEMVER"),
    ", built ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    ")"
))]
#[command(
    long_about = "tutorlens sends your questions to an explanation server and, when a \
picture helps, to an animation server. Explanations print as soon as they arrive; \
animations are downloaded next to them and can be saved with /save.\n\n\
Environment Variables:\n\
  TUTORLENS_EXPLAIN_URL   Base URL of the explanation server\n\
  TUTORLENS_VIDEO_URL     Base URL of the animation server\n\
  RUST_LOG                Diagnostic log filter (default: warn)\n\n\
Commands in chat:\n\
  /subject <name>   Start a new session for another subject\n\
  /status           Show progress and the current video\n\
  /save <file>      Copy the current video to a file\n\
  /log [file]       Log the conversation, or toggle logging\n\
  /dump <file>      Write the conversation so far to a file\n\
  /help             Show all commands"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Subject for the session (physics or mathematics)
    #[arg(short = 's', long, global = true, value_name = "SUBJECT")]
    pub subject: Option<Subject>,

    /// Write diagnostic logs to a file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Append every conversation turn to a file
    #[arg(short = 't', long, global = true, value_name = "FILE")]
    pub transcript: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive tutor (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(required = true)]
        question: Vec<String>,
        /// Where to save the animation, if one is generated
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: String,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if let Err(message) = config.set_value(&key, &value) {
                eprintln!("❌ {message}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {}", value.trim());
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(message) = config.unset_value(&key) {
                eprintln!("❌ {message}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            Config::load()?.print_all();
            Ok(())
        }
        Commands::Ask { question, output } => {
            let settings = Config::load()?.resolve(args.subject);
            let (orchestrator, notices) = connect(&settings)?;
            run_ask(
                orchestrator,
                notices,
                settings.subject,
                question,
                output,
                args.transcript,
            )
            .await
        }
        Commands::Chat => {
            let settings = Config::load()?.resolve(args.subject);
            let (orchestrator, notices) = connect(&settings)?;
            ChatLoop::new(orchestrator, notices, args.transcript)
                .run(settings.subject)
                .await
        }
    }
}

/// Build the HTTP backend for the resolved endpoints and wrap it in an
/// orchestrator.
fn connect(
    settings: &Settings,
) -> Result<(Orchestrator, mpsc::UnboundedReceiver<Notice>), Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECONDS))
        .build()?;
    let backend = HttpBackend::new(
        client,
        settings.endpoints.clone(),
        settings.video_dir.clone(),
    );
    tracing::info!(
        explain_url = %settings.endpoints.explain_url,
        video_url = %settings.endpoints.video_url,
        subject = %settings.subject,
        "connecting to tutor backend"
    );

    let (notice_tx, notices) = NoticeSender::channel();
    Ok((Orchestrator::new(Arc::new(backend), notice_tx), notices))
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // A subscriber may already be installed when embedded in tests.
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    Ok(())
}
