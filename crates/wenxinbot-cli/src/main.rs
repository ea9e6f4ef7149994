//! Wenxinbot CLI — entry point.
//!
//! # Commands
//!
//! - `wenxinbot ask [-m MESSAGE] [--stream]` — single-shot ask or interactive REPL
//! - `wenxinbot token` — exchange the configured credentials for an access token
//! - `wenxinbot status` — show configuration status

mod helpers;
mod repl;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use wenxinbot_core::config::{load_config, Config};
use wenxinbot_providers::{BaiduBot, Bot, STREAM_TARGET};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Wenxinbot — chat with Baidu Wenxin (ERNIE) from the terminal
#[derive(Parser)]
#[command(name = "wenxinbot", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.wenxinbot/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question (single-shot or interactive REPL)
    Ask {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Request a streamed reply; lines are printed as they arrive
        #[arg(long, default_value_t = false)]
        stream: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Fetch an access token to check the configured credentials
    Token {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Ask {
            message,
            stream,
            logs,
        } => {
            init_logging(logs);
            let config = load_config(config_path.as_deref());
            run_ask(&config, message, stream).await
        }
        Commands::Token { logs } => {
            init_logging(logs);
            let config = load_config(config_path.as_deref());
            run_token(&config).await
        }
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(config: &Config, message: Option<String>, stream: bool) -> Result<()> {
    let mut bot = build_bot(config)?;

    match message {
        Some(msg) => {
            info!(model = bot.model(), stream, "processing single message");
            if stream {
                if bot.ask_stream(&msg).await.is_none() {
                    anyhow::bail!("streaming request failed (run with --logs for details)");
                }
            } else {
                let reply = bot.ask(&msg).await;
                helpers::print_response(bot.name(), &reply);
            }
        }
        None => repl::run(&mut bot, stream).await?,
    }

    Ok(())
}

async fn run_token(config: &Config) -> Result<()> {
    let bot = build_bot(config)?;
    let token = bot
        .access_token()
        .await
        .context("failed to obtain a Baidu access token")?;
    println!("{token}");
    Ok(())
}

/// Build a `BaiduBot` from the loaded configuration.
fn build_bot(config: &Config) -> Result<BaiduBot> {
    BaiduBot::from_config(&config.baidu).context(
        "cannot create Baidu bot; set baidu.apiKey / baidu.secretKey in the config file \
         or WENXINBOT_BAIDU__API_KEY / WENXINBOT_BAIDU__SECRET_KEY",
    )
}

/// Initialize tracing/logging.
///
/// Diagnostics use the compact format. Streamed reply lines
/// (`wenxinbot::stream`) are always shown and printed bare.
fn init_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let diagnostics = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::new(log_directives(verbose)));

    tracing_subscriber::registry()
        .with(diagnostics)
        .with(stream_line_layer(std::io::stdout))
        .init();
}

/// Env filter directives for diagnostics; stream lines have their own layer.
fn log_directives(verbose: bool) -> String {
    let base = if verbose {
        "wenxinbot=debug,wenxinbot_providers=debug,wenxinbot_core=debug,info"
    } else {
        "warn"
    };
    format!("{base},{STREAM_TARGET}=off")
}

/// Layer that prints only `wenxinbot::stream` events, without time, level or target.
fn stream_line_layer<S, W>(writer: W) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::filter::filter_fn;
    use tracing_subscriber::Layer;

    tracing_subscriber::fmt::layer()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter_fn(|meta| meta.target() == STREAM_TARGET))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::sync::{Arc, Mutex};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_single_shot_ask() {
        let cli = Cli::try_parse_from(["wenxinbot", "ask", "-m", "你好", "--stream"]).unwrap();
        match cli.command {
            Commands::Ask {
                message, stream, ..
            } => {
                assert_eq!(message.as_deref(), Some("你好"));
                assert!(stream);
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn stream_lines_print_bare() {
        use tracing_subscriber::prelude::*;

        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber =
            tracing_subscriber::registry().with(stream_line_layer(move || sink.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: STREAM_TARGET, "{}", "data: {\"result\": \"你好\"}");
            tracing::warn!("unrelated diagnostic");
        });

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out.trim(), "data: {\"result\": \"你好\"}");
        assert!(!out.contains("INFO"));
        assert!(!out.contains("unrelated"));
    }

    #[test]
    fn diagnostics_exclude_stream_lines() {
        for verbose in [false, true] {
            let directives = log_directives(verbose);
            assert!(directives.ends_with("wenxinbot::stream=off"));
            assert!(tracing_subscriber::EnvFilter::try_new(&directives).is_ok());
        }
    }

    #[test]
    fn build_bot_requires_credentials() {
        let err = build_bot(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("cannot create Baidu bot"));
    }
}
