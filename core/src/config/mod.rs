//! Minimal configuration module for the SDR agent core
//!
//! Only exports pure data types. All loading logic is in the CLI layer.

pub mod types;

pub use types::{CompanyProfile, EmailConfig, ModelParams, ResolvedLlmConfig};
