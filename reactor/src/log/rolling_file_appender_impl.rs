// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

/// Creates a non rotating file appender for `path_str`, creating the file if needed.
///
/// This stays a blocking writer. The reactor is single threaded and a log line is
/// written before the handler that produced it returns, which keeps log order equal to
/// dispatch order.
///
/// # Errors
///
/// Returns an error if:
/// - The path has no file name
/// - The parent directory doesn't exist or isn't writable
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = PathBuf::from(path_str);

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Log file path {} has no file name.", path.display())
    })?;

    // A bare file name has an empty parent, which means the current directory.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !parent.is_dir() {
        return Err(miette::miette!(
            "Can't access log folder {}. It might not exist, or don't have required permissions.",
            parent.display()
        ));
    }

    tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(&parent)
        .map_err(|err| {
            miette::miette!("Can't create log file {}: {err}", path.display())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_create_makes_the_file() {
        let file_path = std::env::temp_dir()
            .join(format!("eedd_appender_test_{}.log", std::process::id()));
        let file_path_str = file_path.to_str().unwrap();

        let _appender = try_create(file_path_str).unwrap();
        assert!(file_path.exists());
        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_try_create_missing_folder() {
        let result = try_create("/definitely/not/a/real/folder/eedd.log");
        assert!(result.is_err());
    }

    #[test]
    fn test_try_create_no_file_name() {
        assert!(try_create("/").is_err());
    }
}
