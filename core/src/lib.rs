//! # SDR Agent Core
//!
//! Core library for the SDR agent - a multi-agent pipeline that drafts,
//! selects, formats and sends cold sales emails.
//!
//! Persona agents draft candidate emails against a shared LLM backend, a
//! judge call picks the winner, and either a downstream email-manager agent
//! or the coordinating agent's own tools format and deliver it through
//! SendGrid.

// Core modules
pub mod agent;
pub mod config;
pub mod email;
pub mod error;
pub mod llm;
pub mod manager;
pub mod tools;
pub mod trace;

// Re-export commonly used types
pub use config::{CompanyProfile, EmailConfig, ModelParams, ResolvedLlmConfig};
pub use email::EmailService;
pub use manager::{Draft, SdrManager, SelectedEmail};
pub use trace::RunRecorder;

/// Current version of the sdr-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
