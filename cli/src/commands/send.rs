//! Send command: run the full draft-select-format-send pipeline

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use sdr_core::{RunRecorder, SdrManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Generate and send a sales email
pub async fn send_command(
    loader: CliConfigLoader,
    message: String,
    use_handoff: bool,
    trace_name: Option<String>,
    trace_file: Option<PathBuf>,
) -> Result<()> {
    let (llm_config, email_config, company) = loader
        .load()
        .await
        .context("Failed to load configuration")?;

    info!(model = %llm_config.model, use_handoff, "starting sales email run");

    println!("Generating and sending sales email...");
    println!("Message: {}", message);
    println!("Using handoff: {}\n", use_handoff);

    let mut manager = SdrManager::new(&llm_config, email_config, company)?;

    let recorder = trace_file.as_ref().map(|path| {
        let name = trace_name.unwrap_or_else(|| "Automated SDR".to_string());
        Arc::new(RunRecorder::with_file(name, path))
    });
    if let Some(recorder) = &recorder {
        manager = manager.with_recorder(recorder.clone());
    }

    let report = manager.send_sales_email(&message, use_handoff).await?;

    println!("\n✓ Email process completed in {} steps!", report.steps);
    let preview: String = report.final_output.chars().take(200).collect();
    println!("Final output: {}...", preview);
    println!("\nCheck your email inbox (and spam folder) for the sent email.");

    if let Some(path) = &trace_file {
        println!("Run record written to: {}", path.display());
    }

    Ok(())
}
