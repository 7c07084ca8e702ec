// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::log::try_create_layers;
use tracing::dispatcher::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_CMD_NAME: &str = "eedd";

/// Configure the tracing logging to suit your needs. You can send the logs to:
/// 1. stderr (each line prefixed with the command name),
/// 2. the system log,
/// 3. a file,
/// 4. stderr and a file.
///
/// This configuration also sets the log level. Use [`try_initialize_logging_global()`]
/// to install it for the whole process, or [`TracingConfig::install_thread_local()`] in
/// tests.
///
/// [`try_initialize_logging_global()`]: crate::log::try_initialize_logging_global
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
    /// Prefix for stderr and file output, and the ident for the system log.
    pub cmd_name: String,
}

/// Where log output goes. The path in [`File`] and [`StderrAndFile`] is the full file
/// path, eg: `/tmp/eedd.log` or `eedd.log`.
///
/// [`File`]: WriterConfig::File
/// [`StderrAndFile`]: WriterConfig::StderrAndFile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WriterConfig {
    None,
    Stderr,
    #[default]
    Syslog,
    File(String),
    StderrAndFile(String),
}

impl WriterConfig {
    /// Maps the daemon's command line choices onto a destination. Without `--stderr`
    /// the daemon logs to the system log, unless a log file replaces it.
    #[must_use]
    pub fn from_flags(use_stderr: bool, log_file: Option<String>) -> Self {
        match (use_stderr, log_file) {
            (true, Some(path)) => Self::StderrAndFile(path),
            (true, None) => Self::Stderr,
            (false, Some(path)) => Self::File(path),
            (false, None) => Self::Syslog,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            writer_config: WriterConfig::default(),
            level_filter: LevelFilter::INFO,
            cmd_name: DEFAULT_CMD_NAME.to_string(),
        }
    }
}

impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self {
        Self {
            level_filter,
            ..Default::default()
        }
    }
}

impl From<WriterConfig> for TracingConfig {
    fn from(writer_config: WriterConfig) -> Self {
        Self {
            writer_config,
            ..Default::default()
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    /// Global default subscriber, which once set, can't be unset or changed. This is
    /// what the daemon binary uses.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer can't be created (eg: the log file can't be opened)
    /// or a global subscriber is already installed.
    pub fn install_global(&self) -> miette::Result<()> {
        let layers = try_create_layers(self)?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|err| miette::miette!("Can't install global subscriber: {err}"))
    }

    /// Thread local subscriber, active until the returned guard is dropped. This is
    /// what tests use, since they run concurrently in one process.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer can't be created.
    pub fn install_thread_local(&self) -> miette::Result<DefaultGuard> {
        let layers = try_create_layers(self)?;
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}
