//! Output formatting for phase results

pub mod console;
