// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words openlog syslogd

//! [`MakeWriter`] that sends each formatted event to `syslog(3)`.
//!
//! The `fmt` layer asks for a fresh writer per event via
//! [`MakeWriter::make_writer_for()`], writes the whole line into it, and drops it. The
//! [`SyslogLine`] buffers what it's given and hands it to `syslog(3)` on drop, with a
//! priority derived from the event's level.

use std::{ffi::{CString, c_int},
          io::{Result, Write},
          sync::OnceLock};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// `openlog(3)` keeps the ident pointer, so it has to live for the rest of the process.
static SYSLOG_IDENT: OnceLock<CString> = OnceLock::new();

#[derive(Debug, Clone, Copy)]
pub struct SyslogMakeWriter {
    facility: c_int,
}

impl SyslogMakeWriter {
    /// Opens the connection to the system logger with `LOG_DAEMON` facility. Only the
    /// first `ident` passed in a process is used.
    #[must_use]
    pub fn open(ident: &str) -> Self {
        let facility = libc::LOG_DAEMON;
        let ident = SYSLOG_IDENT.get_or_init(|| to_c_string(ident));
        // SAFETY: `ident` is a NUL terminated string in a static that is never dropped.
        unsafe { libc::openlog(ident.as_ptr(), libc::LOG_PID | libc::LOG_CONS, facility) };
        Self { facility }
    }
}

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogLine;

    fn make_writer(&'a self) -> Self::Writer {
        SyslogLine::new(self.facility | libc::LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SyslogLine::new(self.facility | priority_for(*meta.level()))
    }
}

#[must_use]
pub fn priority_for(level: Level) -> c_int {
    match level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        Level::DEBUG | Level::TRACE => libc::LOG_DEBUG,
    }
}

/// One event's worth of formatted output, flushed to `syslog(3)` when dropped.
#[derive(Debug)]
pub struct SyslogLine {
    priority: c_int,
    buffer: Vec<u8>,
}

impl SyslogLine {
    #[must_use]
    pub fn new(priority: c_int) -> Self {
        Self {
            priority,
            buffer: Vec::new(),
        }
    }

    /// Trailing newlines are stripped since `syslogd` adds its own framing. `None` if
    /// there's nothing left to send.
    fn rendered_line(&self) -> Option<CString> {
        let text = String::from_utf8_lossy(&self.buffer);
        let text = text.trim_end_matches('\n');
        if text.is_empty() {
            return None;
        }
        Some(to_c_string(text))
    }
}

impl Write for SyslogLine {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

impl Drop for SyslogLine {
    fn drop(&mut self) {
        if let Some(line) = self.rendered_line() {
            // SAFETY: both pointers are valid NUL terminated strings, and the "%s" format
            // consumes exactly one string argument.
            unsafe { libc::syslog(self.priority, c"%s".as_ptr(), line.as_ptr()) };
        }
    }
}

/// Interior NULs can't cross the C boundary; replace them.
fn to_c_string(text: &str) -> CString {
    let sanitized = text.replace('\0', " ");
    CString::new(sanitized).unwrap_or_default()
}
