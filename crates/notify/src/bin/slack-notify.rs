//! slack-notify — render a task or worker event and post it to a Slack webhook.
//!
//! Reads the event as JSON from `--event` (or stdin) and sends one message.
//! `--dry-run` prints the webhook payload instead of sending it.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use taskwatch_core::config::load_dotenv;
use taskwatch_core::{Config, Event};
use taskwatch_notify::{Destination, SlackNotifier};

// ── CLI ─────────────────────────────────────────────────────────────

/// Send a task-queue monitoring event to Slack.
#[derive(Parser, Debug)]
#[command(name = "slack-notify", version, about)]
struct Cli {
    /// Path to the event JSON file. Reads stdin when omitted or "-".
    #[arg(long)]
    event: Option<PathBuf>,

    /// Application name shown in the message and used in the task link.
    #[arg(long, env = "TASKWATCH_APP_NAME")]
    app: String,

    /// Incoming webhook URL. Falls back to the configured webhook.
    #[arg(long)]
    webhook: Option<String>,

    /// Free-text note appended to the message.
    #[arg(long)]
    note: Option<String>,

    /// Print the payload instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

fn read_event(path: Option<&PathBuf>) -> anyhow::Result<Event> {
    let raw = match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read event file {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        }
    };
    Ok(Event::from_json(&raw)?)
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.log_summary();

    let event = read_event(cli.event.as_ref())?;
    let notifier = SlackNotifier::from_config(&config)?;

    let webhook_url = cli
        .webhook
        .or_else(|| config.slack.webhook_url.clone())
        .unwrap_or_default();
    let mut destination = Destination::new(webhook_url);
    if let Some(note) = cli.note {
        destination = destination.with_note(note);
    }

    if cli.dry_run {
        let message = notifier.render(&cli.app, &event, &destination);
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    anyhow::ensure!(
        !destination.webhook_url.is_empty(),
        "no webhook URL: pass --webhook or set TASKWATCH_SLACK_WEBHOOK"
    );

    notifier.try_notify(&cli.app, &event, &destination).await?;
    info!(task = %event.name, state = %event.state, "slack notification sent");

    Ok(())
}
