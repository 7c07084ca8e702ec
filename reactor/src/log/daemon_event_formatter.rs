// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # One line event formatter for daemon output
//!
//! [`DaemonEventFormatter`] renders every [`tracing`] event as a single line, which is
//! what both a terminal tailing stderr and `syslogd` expect:
//!
//! ```text
//! [<timestamp> ]<cmd_name>: <LEVEL> <message>[ key=value]*
//! ```
//!
//! The pieces in brackets depend on the destination:
//!
//! | Destination | Timestamp | Command name | Level |
//! | :---------- | :-------- | :----------- | :---- |
//! | stderr      | no        | yes          | yes   |
//! | file        | yes       | yes          | yes   |
//! | syslog      | no        | no           | no    |
//!
//! The system log adds its own timestamp, ident and priority, so the syslog flavor
//! writes just the message and fields.
//!
//! ## Special field handling
//!
//! The `message` field (implicitly added by `info!("...")` or explicitly by
//! `info!(message = "...")`) becomes the text after the level. Every other field is
//! appended as `key=value` in the order it was recorded. String values use
//! [`std::fmt::Display`] so they aren't wrapped in quotes.

use std::fmt;
use tracing::{Event, Subscriber,
              field::{Field, Visit}};
use tracing_subscriber::{fmt::{FmtContext, FormatEvent, FormatFields,
                               format::Writer,
                               time::{FormatTime, SystemTime}},
                         registry::LookupSpan};

/// Registered with a `tracing_subscriber::fmt` layer via `.event_format(..)`. See
/// [`try_create_layers()`] for how each destination is configured.
///
/// [`try_create_layers()`]: crate::log::try_create_layers
#[derive(Debug, Clone, Default)]
pub struct DaemonEventFormatter {
    cmd_name: Option<String>,
    show_level: bool,
    show_timestamp: bool,
}

impl DaemonEventFormatter {
    #[must_use]
    pub fn for_stderr(cmd_name: &str) -> Self {
        Self {
            cmd_name: Some(cmd_name.to_string()),
            show_level: true,
            show_timestamp: false,
        }
    }

    #[must_use]
    pub fn for_file(cmd_name: &str) -> Self {
        Self {
            cmd_name: Some(cmd_name.to_string()),
            show_level: true,
            show_timestamp: true,
        }
    }

    #[must_use]
    pub fn for_syslog() -> Self { Self::default() }
}

impl<S, N> FormatEvent<S, N> for DaemonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut f: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if self.show_timestamp {
            SystemTime.format_time(&mut f)?;
            f.write_char(' ')?;
        }

        if let Some(cmd_name) = &self.cmd_name {
            write!(f, "{cmd_name}: ")?;
        }

        if self.show_level {
            write!(f, "{} ", event.metadata().level())?;
        }

        let mut fields = VisitEventAndCollectFields::default();
        event.record(&mut fields);

        f.write_str(&fields.message)?;
        for (name, value) in &fields.others {
            write!(f, " {name}={value}")?;
        }

        writeln!(f)
    }
}

/// Splits the `message` field from the rest, keeping the rest in recording order.
#[derive(Debug, Default)]
pub struct VisitEventAndCollectFields {
    pub message: String,
    pub others: Vec<(&'static str, String)>,
}

impl VisitEventAndCollectFields {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.others.push((field.name(), value));
        }
    }
}

impl Visit for VisitEventAndCollectFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    /// Use [`std::fmt::Display`] for string fields so they aren't quoted or escaped.
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }
}
