//! Highlight AI - select text anywhere, press a hotkey, ask a local LLM

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use highlight_ai::clipboard::SystemClipboard;
use highlight_ai::config::{ConfigStore, PartialConfig};
use highlight_ai::core::{Action, CompletionClient};
use highlight_ai::hotkey::{self, Hotkey, DEFAULT_HOTKEY};
use highlight_ai::input::{self, CopyBackend};
use highlight_ai::notify::{Notifier, NotifyPresenter};
use highlight_ai::pipeline::{Pipeline, TriggerOutcome};
use highlight_ai::platform::Platform;
use highlight_ai::selection::SelectionCapture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to send the synthetic copy keystroke
    #[arg(long, value_enum, default_value_t = CopyBackend::Auto, global = true)]
    copy_backend: CopyBackend,

    /// Milliseconds to wait for the clipboard after the copy keystroke
    #[arg(long, default_value_t = 250, global = true)]
    settle_ms: u64,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Listen for the global hotkey (default)
    Run {
        /// Key chord, e.g. ctrl+shift+a
        #[arg(long, default_value = DEFAULT_HOTKEY)]
        hotkey: Hotkey,

        /// Action applied to each selection (explain, summarize, improve,
        /// fix-grammar, translate, simplify, custom:<instruction>)
        #[arg(long, default_value = "explain")]
        action: Action,
    },
    /// Print the current selection
    Capture,
    /// Capture the selection and print the model's answer
    Ask {
        #[arg(long, default_value = "explain")]
        action: Action,
    },
    /// Show or change the endpoint configuration
    Config {
        #[command(subcommand)]
        command: ConfigCmd,
    },
    /// Check that the inference server answers
    Check,
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    Show,
    Path,
    Set {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging (stderr, so answers on stdout stay clean)
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = args
        .config
        .clone()
        .map(ConfigStore::at)
        .unwrap_or_default();

    match &args.command {
        None => {
            let hotkey = DEFAULT_HOTKEY.parse().map_err(anyhow::Error::msg)?;
            run(&args, store, hotkey, Action::Explain).await
        }
        Some(Cmd::Run { hotkey, action }) => {
            run(&args, store, hotkey.clone(), action.clone()).await
        }
        Some(Cmd::Capture) => {
            let capture = build_capture(&args)?;
            let text = capture.capture().await;
            capture.wait_for_restore().await;
            println!("{}", text);
            Ok(())
        }
        Some(Cmd::Ask { action }) => ask(&args, store, action.clone()).await,
        Some(Cmd::Config { command }) => config_command(&store, command),
        Some(Cmd::Check) => check(&store).await,
    }
}

fn build_capture(args: &Args) -> Result<SelectionCapture> {
    let platform = Platform::detect();
    debug!("Detected platform: {}", platform);
    let clipboard = Arc::new(SystemClipboard::new(platform));
    let trigger = input::create_trigger(args.copy_backend, platform)?;
    Ok(SelectionCapture::new(clipboard, trigger)
        .with_settle_delay(Duration::from_millis(args.settle_ms)))
}

async fn run(args: &Args, store: ConfigStore, hotkey: Hotkey, action: Action) -> Result<()> {
    info!("✨ Highlight AI v{} starting...", env!("CARGO_PKG_VERSION"));

    let pipeline = Arc::new(Pipeline::new(store, build_capture(args)?));
    let presenter = Arc::new(NotifyPresenter::new(Notifier::connect().await, action));
    let mut triggers = hotkey::listen(hotkey).context("Failed to start hotkey listener")?;

    info!("✅ Ready - select text and press the hotkey");

    loop {
        tokio::select! {
            fired = triggers.recv() => {
                if fired.is_none() {
                    warn!("⚠️ Hotkey listener exited");
                    break;
                }
                let pipeline = pipeline.clone();
                let presenter = presenter.clone();
                tokio::spawn(async move {
                    let outcome = pipeline.trigger(presenter.as_ref()).await;
                    if outcome == TriggerOutcome::Busy {
                        info!("⏳ Still working on the previous selection");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("👋 Shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn ask(args: &Args, store: ConfigStore, action: Action) -> Result<()> {
    let pipeline = Pipeline::new(store, build_capture(args)?);
    let selection = pipeline.capture_selection().await;
    if selection.is_empty() {
        anyhow::bail!("No text selected");
    }

    let answer = pipeline.send_chat(&action.build_prompt(&selection)).await;
    pipeline.wait_for_restore().await;
    println!("{}", answer?);
    Ok(())
}

fn config_command(store: &ConfigStore, command: &ConfigCmd) -> Result<()> {
    match command {
        ConfigCmd::Show => {
            println!("{}", serde_json::to_string_pretty(&store.load())?);
        }
        ConfigCmd::Path => {
            println!("{}", store.path().display());
        }
        ConfigCmd::Set { base_url, model } => {
            let current = PartialConfig::from(store.load());
            let candidate = PartialConfig {
                base_url: base_url.clone().or(current.base_url),
                model_name: model.clone().or(current.model_name),
            };
            let saved = store.save(&candidate)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
    }
    Ok(())
}

async fn check(store: &ConfigStore) -> Result<()> {
    let config = store.load();
    println!("🔍 Checking Highlight AI setup...");
    println!("   Endpoint: {}", config.base_url);
    println!("   Model:    {}", config.model_name);

    let client = CompletionClient::new(&config);
    match client.send_chat("Hello").await {
        Ok(reply) => {
            let preview: String = reply.chars().take(50).collect();
            println!("   ✅ Model is working! Got response: {}...", preview);
            Ok(())
        }
        Err(e) => {
            println!("   ❌ {} ({})", e, e.kind());
            anyhow::bail!("Setup check failed")
        }
    }
}
