// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Injectable monotonic time source for the timer scheduler.
//!
//! Deadlines are expressed in [`Micros`] since a clock specific epoch. The only thing the
//! scheduler relies on is that successive calls to [`Clock::now_micros()`] never go
//! backwards.

use std::{cell::Cell, fmt::Debug, rc::Rc, time::Instant};

/// Microseconds since the clock's epoch.
pub type Micros = u64;

pub const MICROS_PER_MILLI: Micros = 1_000;

/// Source of monotonic time for a [`Reactor`].
///
/// [`Reactor`]: crate::Reactor
pub trait Clock: Debug {
    fn now_micros(&self) -> Micros;
}

/// Wall clock backed by [`Instant`]. The epoch is the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self { Self::new() }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> Micros {
        // u64 micros overflows after ~584k years.
        self.epoch
            .elapsed()
            .as_micros()
            .try_into()
            .unwrap_or(Micros::MAX)
    }
}

/// Hand driven clock for deterministic tests.
///
/// Clones share the same underlying time, so a test can keep one clone and hand the
/// other to the reactor, then move time forward from inside or outside a handler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Micros>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Micros) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: Micros) { self.now.set(now); }

    pub fn advance_ms(&self, ms: u64) {
        self.now
            .set(self.now.get().saturating_add(ms.saturating_mul(MICROS_PER_MILLI)));
    }

    pub fn advance_micros(&self, micros: Micros) {
        self.now.set(self.now.get().saturating_add(micros));
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> Micros { self.now.get() }
}
