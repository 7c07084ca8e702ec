// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Logging for the reactor and its host daemon.
//!
//! Everything is built on [`tracing`]. [`TracingConfig`] picks the destination (stderr,
//! the system log, a file, or stderr plus a file) and the level, and
//! [`try_initialize_logging_global()`] installs it. The reactor itself only ever calls
//! the `tracing` macros and [`diag_sink::report()`], so it never needs to know where the
//! output goes.

// Attach sources.
pub mod daemon_event_formatter;
pub mod diag_sink;
pub mod rolling_file_appender_impl;
pub mod syslog_writer;
pub mod tracing_config;
pub mod tracing_init;

#[cfg(test)]
pub mod log_capture;

// Re-export.
pub use daemon_event_formatter::*;
pub use syslog_writer::*;
pub use tracing_config::*;
pub use tracing_init::*;
