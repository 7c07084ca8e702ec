// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end tests that drive a [`Reactor`] with real pipes and the wall clock, plus
//! the fatal paths that need their own process.
//!
//! [`Reactor`]: crate::Reactor

mod fatal_exit;
mod pipe_and_timers;
