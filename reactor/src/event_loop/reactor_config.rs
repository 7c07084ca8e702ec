// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DEFAULT_MAX_DESCRIPTORS, DEFAULT_MAX_TIMERS};

/// What happens when a table has no free slot left.
///
/// One setting covers both the descriptor table and the timer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::Display)]
pub enum ExhaustionPolicy {
    /// The add returns a [`ReactorError`] and nothing changes.
    ///
    /// [`ReactorError`]: crate::ReactorError
    #[default]
    #[strum(serialize = "recoverable")]
    Recoverable,
    /// The add logs and terminates the process with [`FATAL_EXIT_CODE`].
    ///
    /// [`FATAL_EXIT_CODE`]: crate::FATAL_EXIT_CODE
    #[strum(serialize = "fail-fast")]
    FailFast,
}

/// Sizes and policy of a [`Reactor`]. Capacities are fixed for the reactor's lifetime.
///
/// [`Reactor`]: crate::Reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorConfig {
    pub max_descriptors: usize,
    pub max_timers: usize,
    pub exhaustion_policy: ExhaustionPolicy,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            max_descriptors: DEFAULT_MAX_DESCRIPTORS,
            max_timers: DEFAULT_MAX_TIMERS,
            exhaustion_policy: ExhaustionPolicy::default(),
        }
    }
}

impl ReactorConfig {
    #[must_use]
    pub fn with_max_descriptors(mut self, max_descriptors: usize) -> Self {
        self.max_descriptors = max_descriptors;
        self
    }

    #[must_use]
    pub fn with_max_timers(mut self, max_timers: usize) -> Self {
        self.max_timers = max_timers;
        self
    }

    #[must_use]
    pub fn with_exhaustion_policy(mut self, exhaustion_policy: ExhaustionPolicy) -> Self {
        self.exhaustion_policy = exhaustion_policy;
        self
    }
}
