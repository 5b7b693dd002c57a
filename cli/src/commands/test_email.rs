//! Test-email command: verify credentials and sender setup

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use sdr_core::EmailService;

/// Send a fixed test email through the configured provider
pub async fn test_email_command(loader: CliConfigLoader) -> Result<()> {
    println!("Testing email configuration...");

    let email_config = loader
        .load_email()
        .await
        .context("Failed to load email configuration")?;

    let service = EmailService::new(email_config);
    println!("Sending test email to {}...", service.to_email());

    match service.send_test_email().await {
        Ok(delivery) => {
            println!(
                "✓ Test email sent successfully! Status code: {}",
                delivery.status_code
            );
            println!("Please check your inbox (and spam folder) for the test email.");
            Ok(())
        }
        Err(e) => {
            println!("✗ Failed to send test email: {}", e);
            println!("\nTroubleshooting:");
            println!("1. Check your SENDGRID_API_KEY environment variable");
            println!("2. Verify your sender email in the SendGrid dashboard");
            println!("3. Check the spam folder");
            Err(e.into())
        }
    }
}
