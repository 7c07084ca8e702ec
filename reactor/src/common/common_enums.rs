// Copyright (c) 2023-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Control flow signal for the reactor loop.
///
/// Returned by [`Reactor::run_once()`] so that callers driving the loop by hand (tests,
/// embedders) know whether a handler asked the reactor to wind down.
///
/// [`Reactor::run_once()`]: crate::Reactor::run_once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Continue to the next iteration.
    #[default]
    Continue,

    /// A handler called [`Reactor::request_stop()`]. Exit the loop.
    ///
    /// [`Reactor::request_stop()`]: crate::Reactor::request_stop
    Stop,
}
