// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR EBADF NVAL

//! For more information on error types, see:
//!
//! 1. [Article](https://developerlife.com/2024/06/10/rust-miette-error-handling/)
//! 2. [Video](https://youtu.be/TmLF7vI8lKk)

use miette::Diagnostic;
use std::os::fd::RawFd;

/// Type alias to make it easy to work with [`miette::Result`] and [`miette::Report`].
///
/// Every [`ReactorError`] implements [`Diagnostic`], so `?` converts it into a
/// [`miette::Report`] when a function returns a [`CommonResult`].
pub type CommonResult<T> = miette::Result<T>;

/// Process exit status used by every fatal path in the reactor.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Everything that can go wrong at the registration boundary or in the readiness wait.
///
/// | Variant                    | Class                       | Default outcome             |
/// | :------------------------- | :-------------------------- | :-------------------------- |
/// | [`InvalidDescriptor`]      | invalid argument            | declined, nothing changes   |
/// | [`ZeroPeriod`]             | invalid argument            | declined, nothing changes   |
/// | [`DescriptorTableFull`]    | resource exhaustion         | [`ExhaustionPolicy`]        |
/// | [`TimerTableFull`]         | resource exhaustion         | [`ExhaustionPolicy`]        |
/// | [`ReadinessWait`]          | non-transient wait failure  | fatal                       |
/// | [`StaleDescriptor`]        | non-transient wait failure  | fatal                       |
///
/// A transient `EINTR` from the wait never becomes a [`ReactorError`]; the loop just
/// goes around again. Stale or malformed timer handles are not errors either; removal
/// silently ignores them.
///
/// [`DescriptorTableFull`]: Self::DescriptorTableFull
/// [`ExhaustionPolicy`]: crate::ExhaustionPolicy
/// [`InvalidDescriptor`]: Self::InvalidDescriptor
/// [`ReadinessWait`]: Self::ReadinessWait
/// [`StaleDescriptor`]: Self::StaleDescriptor
/// [`TimerTableFull`]: Self::TimerTableFull
/// [`ZeroPeriod`]: Self::ZeroPeriod
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ReactorError {
    #[error("Descriptor {fd} can't be registered")]
    #[diagnostic(
        code(eedd_reactor::descriptor::invalid),
        help("Only positive descriptors are accepted; 0 (stdin) and negatives are declined")
    )]
    InvalidDescriptor { fd: RawFd },

    #[error("No free descriptor slots (capacity {capacity})")]
    #[diagnostic(
        code(eedd_reactor::descriptor::table_full),
        help("Raise `ReactorConfig::max_descriptors` or remove unused descriptors")
    )]
    DescriptorTableFull { capacity: usize },

    #[error("Periodic timer with period = 0")]
    #[diagnostic(
        code(eedd_reactor::timer::zero_period),
        help("Use a oneshot timer for an immediate callback")
    )]
    ZeroPeriod,

    #[error("No free timers (capacity {capacity})")]
    #[diagnostic(
        code(eedd_reactor::timer::table_full),
        help("Raise `ReactorConfig::max_timers` or remove timers that are no longer needed")
    )]
    TimerTableFull { capacity: usize },

    #[error("Readiness wait failed")]
    #[diagnostic(
        code(eedd_reactor::event_loop::wait_failed),
        help("The multiplexing primitive can't be trusted after a definitive error")
    )]
    ReadinessWait(#[source] std::io::Error),

    #[error("Descriptor {fd} is registered but no longer open")]
    #[diagnostic(
        code(eedd_reactor::event_loop::stale_descriptor),
        help("Call `remove_fd()` before closing a registered descriptor")
    )]
    StaleDescriptor { fd: RawFd },
}

impl ReactorError {
    /// `true` for the two table-full variants, which are governed by
    /// [`ExhaustionPolicy`].
    ///
    /// [`ExhaustionPolicy`]: crate::ExhaustionPolicy
    #[must_use]
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::DescriptorTableFull { .. } | Self::TimerTableFull { .. }
        )
    }
}

/// Logs `error` as a single fatal line and terminates the process with
/// [`FATAL_EXIT_CODE`].
///
/// There is no degraded mode after a fatal condition: the process stops immediately and
/// no destructors run.
pub fn terminate_process(error: &ReactorError) -> ! {
    // % is Display, ? is Debug.
    tracing::error!(
        message = "Fatal reactor error",
        error = %error,
        exit_code = FATAL_EXIT_CODE
    );
    std::process::exit(FATAL_EXIT_CODE)
}
