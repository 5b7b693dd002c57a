//! CLI command implementations

pub mod drafts;
pub mod send;
pub mod test_email;

pub use drafts::drafts_command;
pub use send::send_command;
pub use test_email::test_email_command;
