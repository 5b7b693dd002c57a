//! Example: generate drafts and pick the best one programmatically.
//!
//! Requires OPENAI_API_KEY and the SENDGRID_* variables in the environment.
//!
//! Run with: cargo run --example generate_drafts

use sdr_core::{CompanyProfile, EmailConfig, ResolvedLlmConfig, SdrManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sdr_core::init_tracing();

    let llm_config = ResolvedLlmConfig::new(
        "https://api.openai.com/v1".to_string(),
        std::env::var("OPENAI_API_KEY")?,
        "gpt-4o-mini".to_string(),
    );
    let email_config = EmailConfig::new(
        std::env::var("SENDGRID_API_KEY")?,
        std::env::var("SENDGRID_FROM_EMAIL")?,
        std::env::var("SENDGRID_TO_EMAIL")?,
    );

    let manager = SdrManager::new(&llm_config, email_config, CompanyProfile::default())?;

    let drafts = manager.generate_emails("Write a cold sales email").await?;
    for draft in &drafts {
        println!("--- {} ---", draft.persona);
        println!("{}\n", draft.body);
    }

    let mut best = manager.pick_best_email(&drafts).await?;
    manager.format_email(&mut best).await?;

    println!("--- Best Email ---");
    if let Some(subject) = &best.subject {
        println!("Subject: {}", subject);
    }
    println!("{}", best.body);

    Ok(())
}
