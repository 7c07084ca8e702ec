// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fatal paths end the process, so each scenario runs in a child copy of this test
//! binary.
//!
//! # Process Isolation Pattern
//!
//! The coordinator test spawns the current executable with `ISOLATED_FATAL_EXIT_TEST`
//! set, filtered down to itself with `--test-threads 1`. In the child the same test sees
//! the variable, logs to stderr and runs the scenario, which must never return. The
//! coordinator then checks the exit status and the child's stderr.

use crate::{Activity, ExhaustionPolicy, FATAL_EXIT_CODE, Interest, Reactor,
            ReactorConfig, TimerHandle, TimerKind,
            log::{WriterConfig, try_initialize_logging_thread_local}};
use pretty_assertions::assert_eq;
use std::{io::Read,
          os::fd::RawFd,
          process::{Command, Stdio},
          time::Duration};
use wait_timeout::ChildExt;

const ISOLATED_ENV_VAR: &str = "ISOLATED_FATAL_EXIT_TEST";

/// Runs `test_name` in a child process and returns its exit code and stderr.
fn run_isolated(test_name: &str) -> (Option<i32>, String) {
    let current_exe = std::env::current_exe().unwrap();
    let mut child = Command::new(&current_exe)
        .env(ISOLATED_ENV_VAR, "1")
        .env("RUST_BACKTRACE", "1") // Get better error info.
        .args(["--test-threads", "1", "--exact", test_name])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let Some(status) = child.wait_timeout(Duration::from_secs(30)).unwrap() else {
        child.kill().ok();
        panic!("isolated test {test_name} didn't exit in time");
    };

    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr).unwrap();
    }
    (status.code(), stderr)
}

fn is_isolated_child() -> bool { std::env::var(ISOLATED_ENV_VAR).is_ok() }

/// Fatal paths log exactly one line, and it names the error.
fn assert_single_fatal_line(stderr: &str, error_text: &str) {
    let fatal_lines: Vec<&str> = stderr
        .lines()
        .filter(|line| line.contains("Fatal reactor error"))
        .collect();
    assert_eq!(fatal_lines.len(), 1, "{stderr}");
    assert!(fatal_lines[0].contains(error_text), "{stderr}");
}

/// In the child: log to stderr for the coordinator to inspect.
fn child_logging() -> Option<tracing::subscriber::DefaultGuard> {
    try_initialize_logging_thread_local(WriterConfig::Stderr).unwrap()
}

#[test]
fn test_fail_fast_descriptor_exhaustion_exits() {
    const TEST_NAME: &str =
        "event_loop::integration_tests::fatal_exit::test_fail_fast_descriptor_exhaustion_exits";

    if is_isolated_child() {
        let _guard = child_logging();
        let mut reactor = Reactor::new(
            ReactorConfig::default()
                .with_max_descriptors(1)
                .with_exhaustion_policy(ExhaustionPolicy::FailFast),
        );
        let handler = |_: &mut Reactor, _: RawFd, _: Activity| {};
        reactor.add_fd(3, Interest::READABLE, handler).unwrap();
        let _unreachable = reactor.add_fd(4, Interest::READABLE, handler);
        unreachable!("FailFast must terminate the process");
    }

    let (code, stderr) = run_isolated(TEST_NAME);
    assert_eq!(code, Some(FATAL_EXIT_CODE), "stderr: {stderr}");
    assert_single_fatal_line(&stderr, "No free descriptor slots (capacity 1)");
    assert!(!stderr.contains("No more file descriptors available"), "{stderr}");
}

#[test]
fn test_fail_fast_timer_exhaustion_exits() {
    const TEST_NAME: &str =
        "event_loop::integration_tests::fatal_exit::test_fail_fast_timer_exhaustion_exits";

    if is_isolated_child() {
        let _guard = child_logging();
        let mut reactor = Reactor::new(
            ReactorConfig::default()
                .with_max_timers(1)
                .with_exhaustion_policy(ExhaustionPolicy::FailFast),
        );
        let handler = |_: &mut Reactor, _: TimerHandle| {};
        reactor.add_timer(TimerKind::Periodic, 10, handler).unwrap();
        let _unreachable = reactor.add_timer(TimerKind::Oneshot, 10, handler);
        unreachable!("FailFast must terminate the process");
    }

    let (code, stderr) = run_isolated(TEST_NAME);
    assert_eq!(code, Some(FATAL_EXIT_CODE), "stderr: {stderr}");
    assert_single_fatal_line(&stderr, "No free timers (capacity 1)");
    assert_eq!(stderr.matches("No free timers").count(), 1, "{stderr}");
}

#[test]
fn test_run_or_exit_on_stale_descriptor() {
    const TEST_NAME: &str =
        "event_loop::integration_tests::fatal_exit::test_run_or_exit_on_stale_descriptor";

    if is_isolated_child() {
        let _guard = child_logging();
        let mut reactor = Reactor::new(ReactorConfig::default());
        reactor
            .add_fd(10_000, Interest::READABLE, |_: &mut Reactor, _: RawFd, _: Activity| {})
            .unwrap();
        reactor.run_or_exit();
        unreachable!("a stale descriptor must terminate the process");
    }

    let (code, stderr) = run_isolated(TEST_NAME);
    assert_eq!(code, Some(FATAL_EXIT_CODE), "stderr: {stderr}");
    assert_single_fatal_line(&stderr, "Descriptor 10000 is registered but no longer open");
}
