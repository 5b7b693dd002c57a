//! Drafts command: generate and compare drafts without sending

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use sdr_core::SdrManager;

/// Generate drafts from every persona, then pick the best one
pub async fn drafts_command(loader: CliConfigLoader, message: String, format: bool) -> Result<()> {
    let (llm_config, email_config, company) = loader
        .load()
        .await
        .context("Failed to load configuration")?;

    println!("Generating email drafts...");
    println!("Message: {}\n", message);

    let manager = SdrManager::new(&llm_config, email_config, company)?;

    let drafts = manager.generate_emails(&message).await?;

    println!("Generated {} email drafts:\n", drafts.len());
    for (i, draft) in drafts.iter().enumerate() {
        println!("--- Draft {} ({}) ---", i + 1, draft.persona);
        println!("{}\n", draft.body);
    }

    println!("Picking the best email...");
    let mut best = manager.pick_best_email(&drafts).await?;

    if format {
        manager.format_email(&mut best).await?;
    }

    println!("\n--- Best Email ---");
    if let Some(subject) = &best.subject {
        println!("Subject: {}\n", subject);
    }
    println!("{}", best.body);
    if let Some(html) = &best.html_body {
        println!("\n--- HTML Body ---");
        println!("{}", html);
    }

    Ok(())
}
