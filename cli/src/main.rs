//! # sdr CLI
//!
//! Command-line interface for the SDR agent - a multi-agent pipeline for
//! generating and sending cold sales emails.
//!
//! ## Usage
//!
//! - `sdr send "instruction"` - Draft, select, format and send a sales email
//! - `sdr send "instruction" --no-handoff` - Same, without the Email Manager handoff
//! - `sdr drafts --message "instruction"` - Generate drafts without sending
//! - `sdr test-email` - Verify the email configuration with a test send

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{drafts_command, send_command, test_email_command};
use config::CliConfigLoader;

/// sdr - a multi-agent system for cold sales outreach emails
#[derive(Parser)]
#[command(name = "sdr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-agent SDR system for generating and sending cold sales emails")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OpenAI API key override
    #[arg(long)]
    api_key: Option<String>,

    /// OpenAI base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Record the run to a JSON file
    #[arg(long)]
    trace_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and send a sales email
    Send {
        /// Message/instruction for the sales email
        message: String,

        /// Use sending tools directly instead of the Email Manager handoff
        #[arg(long)]
        no_handoff: bool,

        /// Name for the recorded run
        #[arg(long)]
        trace_name: Option<String>,
    },

    /// Generate email drafts without sending
    Drafts {
        /// Message/instruction for the sales email
        #[arg(long, default_value = "Write a cold sales email")]
        message: String,

        /// Also write a subject and HTML body for the best draft
        #[arg(long)]
        format: bool,
    },

    /// Test email configuration by sending a test email
    TestEmail,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Some(Commands::Send {
            message,
            no_handoff,
            trace_name,
        }) => {
            send_command(
                config_loader,
                message,
                !no_handoff,
                trace_name,
                cli.trace_file,
            )
            .await
        }
        Some(Commands::Drafts { message, format }) => {
            drafts_command(config_loader, message, format).await
        }
        Some(Commands::TestEmail) => test_email_command(config_loader).await,
        None => {
            // Default action: send a sample sales email with handoff
            println!("No command specified. Sending a sample sales email...\n");
            send_command(
                config_loader,
                "Send a cold sales email addressed to Dear CEO".to_string(),
                true,
                None,
                cli.trace_file,
            )
            .await
        }
    }
}
