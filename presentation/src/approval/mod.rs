//! Human approval providers for the terminal.

mod interactive;

pub use interactive::{InteractiveApproval, parse_decision};
