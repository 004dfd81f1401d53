//! Utility modules for the binary's process-level concerns

pub mod console;
pub mod signal;

pub use console::TerminalConsole;
pub use signal::shutdown_signal;

// vim: ts=4
