// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::log::{DaemonEventFormatter, SyslogMakeWriter, TracingConfig, WriterConfig,
                 rolling_file_appender_impl};
use tracing::dispatcher::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, registry::LookupSpan};

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Returns the layers. This does not initialize the tracing system. Don't forget to do
/// this manually, or use [`TracingConfig::install_global()`] /
/// [`TracingConfig::install_thread_local()`] which do it for you.
///
/// The first layer is always the level filter. [`WriterConfig::None`] produces only
/// that, which turns logging off.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<tracing_subscriber::Registry>>>> {
    let level_filter = tracing_config.get_level_filter();
    let cmd_name = tracing_config.cmd_name.as_str();

    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Set the level filter for the whole subscriber, not just per layer.
    return_it.push(Box::new(level_filter));

    match tracing_config.get_writer_config() {
        WriterConfig::None => {}
        WriterConfig::Stderr => {
            return_it.push(create_stderr_layer(level_filter, cmd_name));
        }
        WriterConfig::Syslog => {
            return_it.push(create_syslog_layer(level_filter, cmd_name));
        }
        WriterConfig::File(path) => {
            return_it.push(try_create_file_layer(level_filter, cmd_name, &path)?);
        }
        WriterConfig::StderrAndFile(path) => {
            return_it.push(create_stderr_layer(level_filter, cmd_name));
            return_it.push(try_create_file_layer(level_filter, cmd_name, &path)?);
        }
    }

    Ok(return_it)
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// This is useful for composition of layers. There's more info in the docs
/// [here](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/index.html#runtime-configuration-with-layers).
pub fn create_stderr_layer<S>(level_filter: LevelFilter, cmd_name: &str) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    Box::new(
        tracing_subscriber::fmt::layer()
            .event_format(DaemonEventFormatter::for_stderr(cmd_name))
            .with_writer(std::io::stderr)
            .with_filter(level_filter),
    )
}

pub fn create_syslog_layer<S>(level_filter: LevelFilter, cmd_name: &str) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    Box::new(
        tracing_subscriber::fmt::layer()
            .event_format(DaemonEventFormatter::for_syslog())
            .with_writer(SyslogMakeWriter::open(cmd_name))
            .with_filter(level_filter),
    )
}

/// # Errors
///
/// Returns an error if the file at `path` can't be created.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    cmd_name: &str,
    path: &str,
) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let file = rolling_file_appender_impl::try_create(path)?;
    Ok(Box::new(
        tracing_subscriber::fmt::layer()
            .event_format(DaemonEventFormatter::for_file(cmd_name))
            .with_writer(file)
            .with_filter(level_filter),
    ))
}

/// Global default subscriber, which once set, can't be unset or changed. This is great
/// for apps.
///
/// Logging is **DISABLED** if the level filter is [`LevelFilter::OFF`]; nothing is
/// installed in that case and `tracing` macros become no-ops.
///
/// # Errors
///
/// See [`TracingConfig::install_global()`].
pub fn try_initialize_logging_global(options: impl Into<TracingConfig>) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), LevelFilter::OFF) {
        return Ok(());
    }

    it.install_global()
}

/// Thread local subscriber, which is great for tests. Returns `None` when the level
/// filter is [`LevelFilter::OFF`].
///
/// # Errors
///
/// See [`TracingConfig::install_thread_local()`].
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<DefaultGuard>> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), LevelFilter::OFF) {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    fn temp_log_path(tag: &str) -> String {
        std::env::temp_dir()
            .join(format!("eedd_{tag}_{}.log", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_stderr_config_has_two_layers() {
        let config = TracingConfig::from(WriterConfig::Stderr);
        let layers = try_create_layers(&config).unwrap();
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn test_none_config_only_has_level_filter() {
        let config = TracingConfig::from(WriterConfig::None);
        let layers = try_create_layers(&config).unwrap();
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_stderr_and_file_config() {
        let file_path = temp_log_path("layers");
        let config = TracingConfig::from(WriterConfig::StderrAndFile(file_path.clone()));
        let layers = try_create_layers(&config).unwrap();
        assert_eq!(layers.len(), 3);
        assert!(std::path::Path::new(&file_path).exists());
        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_bad_file_path_is_an_error() {
        let config =
            TracingConfig::from(WriterConfig::File("/no/such/dir/eedd.log".to_string()));
        assert!(try_create_layers(&config).is_err());
    }

    #[test]
    fn test_thread_local_off_installs_nothing() {
        let guard = try_initialize_logging_thread_local(LevelFilter::OFF).unwrap();
        assert!(guard.is_none());
    }

    #[test]
    fn test_thread_local_file_logging_writes_lines() {
        let file_path = temp_log_path("thread_local");
        let config = TracingConfig {
            writer_config: WriterConfig::File(file_path.clone()),
            level_filter: LevelFilter::DEBUG,
            cmd_name: "eedd_test".to_string(),
        };
        {
            let _guard = try_initialize_logging_thread_local(config).unwrap();
            tracing::debug!(fd = 7, "Descriptor registered");
            tracing::trace!("filtered out");
        }
        let contents = std::fs::read_to_string(&file_path).unwrap();
        assert!(contents.contains("eedd_test: DEBUG Descriptor registered fd=7"));
        assert!(!contents.contains("filtered out"));
        std::fs::remove_file(&file_path).ok();
    }

    /// The global subscriber can only be set once per process.
    #[test]
    #[serial]
    fn test_global_install_is_one_shot() {
        let file_path = temp_log_path("global");
        let config = TracingConfig {
            writer_config: WriterConfig::File(file_path.clone()),
            level_filter: LevelFilter::WARN,
            cmd_name: "eedd_test".to_string(),
        };
        // Off is a no-op, so it always succeeds.
        assert!(try_initialize_logging_global(LevelFilter::OFF).is_ok());

        let _first = try_initialize_logging_global(config.clone());
        let second = try_initialize_logging_global(config);
        assert!(second.is_err());
    }
}
