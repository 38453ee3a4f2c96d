//! Advisor application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialize tracing (stderr, so it never interleaves with the chat);
//!    `--write-config` saves the effective configuration and exits here
//! 3. Build the HTTP transport and the chat widget over a terminal renderer
//! 4. Run the read-submit loop until EOF or `/quit`
//! 5. Optionally export the transcript as an HTML page

mod cli;
mod terminal;

use std::io::Stdout;
use std::path::Path;

use advisor_chat::{
    ChatTransport, ChatWidget, ContextSummary, HttpTransport, Renderer, TurnOutcome,
};
use advisor_core::config::AdvisorConfig;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::CliArgs;
use crate::terminal::TerminalRenderer;

type Widget<T> = ChatWidget<T, TerminalRenderer<Stdout>>;

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Reset,
    Context,
    Help,
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Command::Quit,
            "/reset" => Command::Reset,
            "/context" => Command::Context,
            "/help" => Command::Help,
            _ => Command::Say(line),
        }
    }
}

const HELP: &str = "Commands: /reset starts over, /context shows what I know about you, /quit exits.";

fn format_context(summary: &ContextSummary) -> String {
    let profile = &summary.profile;
    fn or_none(v: &[String]) -> String {
        if v.is_empty() {
            "none".to_string()
        } else {
            v.join(", ")
        }
    }
    format!(
        "session:  {}\nmessages: {}\nname:     {}\nskin:     {}\nconcerns: {}\nproducts: {}\nstarted:  {}",
        summary.session_id,
        summary.message_count,
        profile.name.as_deref().unwrap_or("unknown"),
        profile
            .skin_type
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        or_none(&profile.concerns),
        or_none(&profile.previous_products),
        profile.session_start.format("%Y-%m-%d %H:%M:%S"),
    )
}

async fn run<T: ChatTransport>(widget: &mut Widget<T>) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        // Turns that reach the transport refocus the input themselves.
        let ran_turn = match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                false
            }
            Command::Reset => {
                widget.reset()?;
                false
            }
            Command::Context => {
                println!("{}", format_context(&widget.context_summary()));
                false
            }
            Command::Say(text) => match widget.submit(text).await? {
                TurnOutcome::Ignored => false,
                TurnOutcome::Answered { truncated, .. } => {
                    tracing::debug!(truncated, "Turn answered");
                    true
                }
                TurnOutcome::Failed { kind, .. } => {
                    tracing::debug!(kind = ?kind, "Turn failed");
                    true
                }
            },
        };
        if !ran_turn {
            widget.renderer_mut().focus_input();
        }
    }
    Ok(())
}

fn export_transcript(renderer: &TerminalRenderer<Stdout>, path: &Path) {
    let Some(html) = renderer.transcript() else {
        return;
    };
    match std::fs::write(path, html.to_page("L'Oréal Smart Product Advisor")) {
        Ok(()) => tracing::info!(path = %path.display(), "Transcript written"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to write transcript"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config = AdvisorConfig::load_or_default(&config_file);
    config.endpoint.url = args.resolve_endpoint(&config.endpoint.url);
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    let log_level = config.general.log_level.clone();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    if args.write_config {
        config.save(&config_file)?;
        println!("Wrote {}", config_file.display());
        return Ok(());
    }

    tracing::info!(
        config = %config_file.display(),
        endpoint = %config.endpoint.url,
        max_history = config.chat.max_history,
        "Advisor starting"
    );

    let transport = HttpTransport::from_config(&config.endpoint)?;
    let mut renderer = TerminalRenderer::new(std::io::stdout());
    if args.transcript.is_some() {
        renderer = renderer.with_transcript();
    }

    let mut widget = ChatWidget::new(transport, renderer, config.chat.clone());
    println!("{}", HELP);
    widget.renderer_mut().focus_input();

    let result = run(&mut widget).await;

    if let Some(path) = args.transcript.as_deref() {
        export_transcript(widget.renderer(), path);
    }

    tracing::info!("Advisor shut down");
    result
}
