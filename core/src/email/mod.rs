//! Email delivery via the SendGrid v3 mail API

pub mod service;

pub use service::{Delivery, EmailService};
