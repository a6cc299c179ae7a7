pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod repl;
pub mod session;
pub mod transcript;
pub mod transport;

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;

use client::ResearchClient;
use config::Config;
use repl::{handle_query, run_repl};
use session::Session;
use transcript::FileTranscript;
use transport::Transport;

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let config_path = config::config_path();
    let cfg = Config::load(&config_path)?;
    let transport = Transport::new(&cfg).context("Failed to initialize HTTP client")?;
    info!(
        config_path = %config_path.display(),
        api_url = %transport.api_url(),
        chat_model = %cfg.chat_model,
        embedding_model = %cfg.embedding_model,
        optimization_mode = %cfg.optimization_mode,
        focus_mode = %cfg.focus_mode,
        timeout_ms = cfg.timeout.as_millis() as u64,
        history_limit = cfg.history_limit,
        "loaded runtime configuration"
    );

    let transcript = FileTranscript::new(transcript::transcript_path());
    let mut client = ResearchClient::new(Session::new(cfg, transcript), transport);

    let args: Vec<String> = env::args().skip(1).collect();
    let mut stdout = io::stdout();
    if args.is_empty() {
        run_repl(&mut client, io::stdin().lock(), &mut stdout).await?;
        stdout.flush().context("Failed to flush stdout")?;
        Ok(ExitCode::SUCCESS)
    } else {
        let query = args.join(" ");
        let answered = handle_query(&mut client, &query, &mut stdout).await?;
        stdout.flush().context("Failed to flush stdout")?;
        Ok(if answered {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}
