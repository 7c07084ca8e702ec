// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

/// Opaque reference to a registered timer.
///
/// A handle names a slot and the generation that slot had when the timer was added.
/// Every time a slot is released its generation moves on, so a handle kept around after
/// its timer expired or was removed no longer matches anything and is ignored by
/// [`Reactor::remove_timer()`]. A handle can be copied freely; it owns nothing.
///
/// [`Reactor::remove_timer()`]: crate::Reactor::remove_timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl TimerHandle {
    /// Build a handle from raw parts. Only useful for tests that need a handle which was
    /// never issued.
    #[must_use]
    pub fn from_raw_parts(slot: u32, generation: u32) -> Self { Self { slot, generation } }

    #[must_use]
    pub fn slot(&self) -> u32 { self.slot }

    #[must_use]
    pub fn generation(&self) -> u32 { self.generation }
}

impl Display for TimerHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}.{}", self.slot, self.generation)
    }
}
