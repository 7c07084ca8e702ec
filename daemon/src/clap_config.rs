// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use clap::Parser;
use eedd_reactor::{DEFAULT_MAX_DESCRIPTORS, DEFAULT_MAX_TIMERS, ExhaustionPolicy,
                   ReactorConfig,
                   log::{TracingConfig, WriterConfig}};
use tracing_core::LevelFilter;

pub const DEFAULT_HEARTBEAT_MS: u32 = 10_000;

#[derive(Debug, Parser)]
#[command(bin_name = "eedd")]
#[command(about = "Empty peripheral daemon: hosts plugins on a single-threaded reactor")]
#[command(version)]
#[command(next_line_help = true)]
/// More info:
/// - <https://docs.rs/clap/latest/clap/_derive/#overview>
pub struct CLIArg {
    #[arg(long, short = 'e', help = "Log to stderr instead of the system log")]
    pub stderr: bool,

    #[arg(
        long,
        short = 'l',
        value_name = "PATH",
        help = "Log to this file; combined with `--stderr` both get every line"
    )]
    pub log_file: Option<String>,

    #[arg(long, short = 'v', help = "Log at debug level")]
    pub verbose: bool,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DESCRIPTORS,
        help = "Capacity of the descriptor table"
    )]
    pub max_fds: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_TIMERS,
        help = "Capacity of the timer table"
    )]
    pub max_timers: usize,

    #[arg(
        long,
        help = "Decline registrations when a table is full instead of exiting. Exiting is \
                the default to match the daemon's historical behavior, where a full table \
                means a misconfigured deployment"
    )]
    pub recoverable: bool,

    #[arg(
        long,
        default_value_t = DEFAULT_HEARTBEAT_MS,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Period of the heartbeat plugin in milliseconds"
    )]
    pub heartbeat_ms: u32,
}

impl CLIArg {
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            writer_config: WriterConfig::from_flags(self.stderr, self.log_file.clone()),
            level_filter: if self.verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            },
            ..Default::default()
        }
    }

    /// The daemon exits on table exhaustion unless `--recoverable` is given. Plugins
    /// register their descriptors and timers at startup, so a full table there points at
    /// a capacity that is too small for the deployment, and the historical daemon exits.
    #[must_use]
    pub fn reactor_config(&self) -> ReactorConfig {
        ReactorConfig::default()
            .with_max_descriptors(self.max_fds)
            .with_max_timers(self.max_timers)
            .with_exhaustion_policy(if self.recoverable {
                ExhaustionPolicy::Recoverable
            } else {
                ExhaustionPolicy::FailFast
            })
    }
}
