// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixed capacity table of oneshot and periodic timers.
//!
//! Slots are allocated once. An entry with no [`TimerKind`] is unused and never counts as
//! active; [`TimerTable::active_count()`] is maintained on every add and release and
//! always equals the number of entries in use.
//!
//! Timers are referred to by [`TimerHandle`]s. A handle is only honored while its slot
//! is in use and the slot's generation matches the one baked into the handle. Slots bump
//! their generation when released (removal or oneshot expiry), which is what makes old
//! handles harmless.
//!
//! The expire-and-reschedule pass itself lives in [`super::scheduler`]; this module gives
//! it the primitives it needs without handing out borrows that would outlive a handler
//! call.

use crate::{MICROS_PER_MILLI, Micros, ReactorError, TimerHandle, TimerHandler};
use std::fmt::{Debug, Formatter};

pub const DEFAULT_MAX_TIMERS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    /// Fires once, then its slot is released.
    #[strum(serialize = "oneshot")]
    Oneshot,
    /// Fires every period until removed.
    #[strum(serialize = "periodic")]
    Periodic,
}

pub struct TimerEntry {
    /// `None` means the slot is unused.
    kind: Option<TimerKind>,
    /// Absolute, in microseconds on the reactor's clock.
    deadline: Micros,
    period: Micros,
    /// `None` while the handler is being run by the scheduler.
    handler: Option<Box<dyn TimerHandler>>,
    generation: u32,
    /// Added by a handler during the current pass. Not eligible to fire until the next
    /// one.
    armed_mid_pass: bool,
}

impl TimerEntry {
    fn unused() -> Self {
        Self {
            kind: None,
            deadline: 0,
            period: 0,
            handler: None,
            generation: 0,
            armed_mid_pass: false,
        }
    }

    #[must_use]
    pub fn is_unused(&self) -> bool { self.kind.is_none() }
}

impl Debug for TimerEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEntry")
            .field("kind", &self.kind)
            .field("deadline", &self.deadline)
            .field("period", &self.period)
            .field("has_handler", &self.handler.is_some())
            .field("generation", &self.generation)
            .field("armed_mid_pass", &self.armed_mid_pass)
            .finish()
    }
}

/// What the scheduler finds when it looks at one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unused,
    /// In use, but added during this pass.
    ArmedMidPass,
    NotDue,
    Due { handle: TimerHandle, kind: TimerKind },
}

#[derive(Debug)]
pub struct TimerTable {
    slots: Vec<TimerEntry>,
    active_count: usize,
    missed_deadlines: u64,
    in_pass: bool,
}

impl TimerTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| TimerEntry::unused()).collect(),
            active_count: 0,
            missed_deadlines: 0,
            in_pass: false,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.slots.len() }

    #[must_use]
    pub fn active_count(&self) -> usize { self.active_count }

    /// How many periodic deadlines were dropped because a handler overran its period.
    #[must_use]
    pub fn missed_deadline_count(&self) -> u64 { self.missed_deadlines }

    /// Registers a timer that first fires `delay_ms` after `now`. For a periodic timer
    /// `delay_ms` is also the period.
    ///
    /// # Errors
    ///
    /// - [`ReactorError::ZeroPeriod`] for a periodic timer with `delay_ms == 0`.
    /// - [`ReactorError::TimerTableFull`] if every slot is in use.
    pub fn add(
        &mut self,
        kind: TimerKind,
        delay_ms: u32,
        now: Micros,
        handler: Box<dyn TimerHandler>,
    ) -> Result<TimerHandle, ReactorError> {
        if kind == TimerKind::Periodic && delay_ms == 0 {
            return Err(ReactorError::ZeroPeriod);
        }

        let slot = self
            .slots
            .iter()
            .position(TimerEntry::is_unused)
            .ok_or(ReactorError::TimerTableFull {
                capacity: self.capacity(),
            })?;

        let delay = Micros::from(delay_ms) * MICROS_PER_MILLI;
        let in_pass = self.in_pass;
        let entry = &mut self.slots[slot];
        entry.kind = Some(kind);
        entry.deadline = now.saturating_add(delay);
        entry.period = delay;
        entry.handler = Some(handler);
        entry.armed_mid_pass = in_pass;
        self.active_count += 1;

        Ok(handle_for(slot, entry.generation))
    }

    /// Releases the timer behind `handle`. Out of range, stale and already released
    /// handles are ignored. Returns whether a timer was released.
    pub fn remove(&mut self, handle: TimerHandle) -> bool {
        match self.resolve(handle) {
            Some(slot) => {
                self.release(slot);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_active(&self, handle: TimerHandle) -> bool { self.resolve(handle).is_some() }

    #[must_use]
    pub fn kind_of(&self, handle: TimerHandle) -> Option<TimerKind> {
        self.resolve(handle).and_then(|slot| self.slots[slot].kind)
    }

    /// Absolute deadline in microseconds on the reactor's clock.
    #[must_use]
    pub fn deadline_of(&self, handle: TimerHandle) -> Option<Micros> {
        self.resolve(handle).map(|slot| self.slots[slot].deadline)
    }

    /// The slot index `handle` refers to, if it's still live.
    fn resolve(&self, handle: TimerHandle) -> Option<usize> {
        let slot = usize::try_from(handle.slot).ok()?;
        let entry = self.slots.get(slot)?;
        (!entry.is_unused() && entry.generation == handle.generation).then_some(slot)
    }

    fn release(&mut self, slot: usize) -> Option<Box<dyn TimerHandler>> {
        let entry = &mut self.slots[slot];
        entry.kind = None;
        entry.armed_mid_pass = false;
        entry.generation = entry.generation.wrapping_add(1);
        self.active_count -= 1;
        entry.handler.take()
    }

    pub(crate) fn begin_pass(&mut self) { self.in_pass = true; }

    /// Timers added during the pass become eligible again.
    pub(crate) fn end_pass(&mut self) {
        self.in_pass = false;
        for entry in &mut self.slots {
            entry.armed_mid_pass = false;
        }
    }

    pub(crate) fn slot_state(&self, slot: usize, now: Micros) -> SlotState {
        let Some(entry) = self.slots.get(slot) else {
            return SlotState::Unused;
        };
        match entry.kind {
            None => SlotState::Unused,
            Some(_) if entry.armed_mid_pass => SlotState::ArmedMidPass,
            Some(_) if entry.deadline > now => SlotState::NotDue,
            Some(kind) => SlotState::Due {
                handle: handle_for(slot, entry.generation),
                kind,
            },
        }
    }

    /// Releases a due oneshot and hands back its handler. The slot is free (and
    /// `active_count` already lower) before the handler ever runs, so the handler can
    /// reuse it right away.
    pub(crate) fn release_oneshot(
        &mut self,
        handle: TimerHandle,
    ) -> Option<Box<dyn TimerHandler>> {
        let slot = self.resolve(handle)?;
        self.release(slot)
    }

    pub(crate) fn take_handler(&mut self, handle: TimerHandle) -> Option<Box<dyn TimerHandler>> {
        let slot = self.resolve(handle)?;
        self.slots[slot].handler.take()
    }

    /// Puts a periodic handler back, unless the handler removed its own timer while it
    /// ran; then it's dropped.
    pub(crate) fn restore_handler(
        &mut self,
        handle: TimerHandle,
        handler: Box<dyn TimerHandler>,
    ) {
        if let Some(slot) = self.resolve(handle)
            && self.slots[slot].handler.is_none()
        {
            self.slots[slot].handler = Some(handler);
        }
    }

    /// Moves a periodic deadline one period forward. If that is still behind `now` the
    /// missed ticks are dropped, not queued: the deadline is clamped to `now` and
    /// [`Self::missed_deadline_count()`] goes up. Returns `true` if ticks were dropped.
    ///
    /// The comparison is strict: a deadline that lands exactly on `now` is due on the
    /// next pass and no tick is lost, so it is not counted as a miss. The resulting
    /// deadline is `now` in both cases.
    pub(crate) fn advance_periodic(&mut self, handle: TimerHandle, now: Micros) -> bool {
        let Some(slot) = self.resolve(handle) else {
            return false;
        };
        let entry = &mut self.slots[slot];
        entry.deadline = entry.deadline.saturating_add(entry.period);
        if entry.deadline < now {
            entry.deadline = now;
            self.missed_deadlines += 1;
            return true;
        }
        false
    }

    /// The earliest deadline among the timers in use, examining no more entries than
    /// `active_count`. `None` when no timer is in use.
    #[must_use]
    pub fn earliest_deadline(&self) -> Option<Micros> {
        self.slots
            .iter()
            .filter(|entry| !entry.is_unused())
            .take(self.active_count)
            .map(|entry| entry.deadline)
            .min()
    }

    #[cfg(test)]
    pub(crate) fn count_in_use(&self) -> usize {
        self.slots.iter().filter(|entry| !entry.is_unused()).count()
    }
}

fn handle_for(slot: usize, generation: u32) -> TimerHandle {
    // Table capacities are nowhere near `u32::MAX`.
    TimerHandle {
        slot: u32::try_from(slot).unwrap_or(u32::MAX),
        generation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reactor;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn noop() -> Box<dyn TimerHandler> { Box::new(|_: &mut Reactor, _: TimerHandle| {}) }

    #[test]
    fn test_fill_fail_remove_retry() {
        let mut table = TimerTable::new(3);
        let handles: Vec<_> = (0..3)
            .map(|i| table.add(TimerKind::Oneshot, 10 * i, 0, noop()).unwrap())
            .collect();
        assert_eq!(table.active_count(), 3);

        let result = table.add(TimerKind::Periodic, 5, 0, noop());
        assert!(matches!(
            result,
            Err(ReactorError::TimerTableFull { capacity: 3 })
        ));
        assert_eq!(table.active_count(), 3);

        assert!(table.remove(handles[1]));
        assert_eq!(table.active_count(), 2);

        let retried = table.add(TimerKind::Periodic, 5, 0, noop()).unwrap();
        assert_eq!(retried.slot(), 1);
        assert_ne!(retried, handles[1]);
        assert_eq!(table.active_count(), 3);
    }

    #[test]
    fn test_zero_period_periodic_is_rejected() {
        let mut table = TimerTable::new(2);
        assert!(matches!(
            table.add(TimerKind::Periodic, 0, 0, noop()),
            Err(ReactorError::ZeroPeriod)
        ));
        assert_eq!(table.active_count(), 0);

        // A zero delay oneshot is fine, it's due right away.
        let handle = table.add(TimerKind::Oneshot, 0, 7, noop()).unwrap();
        assert_eq!(table.deadline_of(handle), Some(7));
    }

    #[test]
    fn test_deadline_in_micros() {
        let mut table = TimerTable::new(1);
        let handle = table.add(TimerKind::Periodic, 50, 1_000, noop()).unwrap();
        assert_eq!(table.deadline_of(handle), Some(51_000));
        assert_eq!(table.kind_of(handle), Some(TimerKind::Periodic));
    }

    #[test]
    fn test_max_delay_does_not_overflow() {
        let mut table = TimerTable::new(1);
        let handle = table
            .add(TimerKind::Oneshot, u32::MAX, Micros::MAX - 10, noop())
            .unwrap();
        assert_eq!(table.deadline_of(handle), Some(Micros::MAX));
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut table = TimerTable::new(1);
        let first = table.add(TimerKind::Oneshot, 10, 0, noop()).unwrap();
        assert!(table.remove(first));
        let second = table.add(TimerKind::Oneshot, 10, 0, noop()).unwrap();
        assert_eq!(first.slot(), second.slot());

        // Removing twice, or through the old handle, leaves the new timer alone.
        assert!(!table.remove(first));
        assert!(table.is_active(second));
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn test_out_of_range_handle_is_ignored() {
        let mut table = TimerTable::new(2);
        table.add(TimerKind::Oneshot, 10, 0, noop()).unwrap();
        assert!(!table.remove(TimerHandle::from_raw_parts(2, 0)));
        assert!(!table.remove(TimerHandle::from_raw_parts(u32::MAX, 0)));
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn test_advance_periodic_clamps_missed_ticks() {
        let mut table = TimerTable::new(1);
        let handle = table.add(TimerKind::Periodic, 10, 0, noop()).unwrap();

        // On time: 10ms -> 20ms.
        assert!(!table.advance_periodic(handle, 10_000));
        assert_eq!(table.deadline_of(handle), Some(20_000));

        // Overran to 55ms: 20ms + 10ms is still behind, clamp to now.
        assert!(table.advance_periodic(handle, 55_000));
        assert_eq!(table.deadline_of(handle), Some(55_000));
        assert_eq!(table.missed_deadline_count(), 1);

        // Exactly on the new deadline is not a miss.
        assert!(!table.advance_periodic(handle, 65_000));
        assert_eq!(table.deadline_of(handle), Some(65_000));
    }

    #[test]
    fn test_advance_periodic_landing_on_now_is_not_a_miss() {
        let mut table = TimerTable::new(1);
        let handle = table.add(TimerKind::Periodic, 10, 0, noop()).unwrap();

        // Fired at 10ms but the handler took a full period: 10ms + 10ms == now.
        assert!(!table.advance_periodic(handle, 20_000));
        assert_eq!(table.deadline_of(handle), Some(20_000));
        assert_eq!(table.missed_deadline_count(), 0);

        // One microsecond later it is a miss.
        assert!(table.advance_periodic(handle, 30_001));
        assert_eq!(table.deadline_of(handle), Some(30_001));
        assert_eq!(table.missed_deadline_count(), 1);
    }

    #[test]
    fn test_slot_state_and_mid_pass_arming() {
        let mut table = TimerTable::new(3);
        let due = table.add(TimerKind::Oneshot, 0, 0, noop()).unwrap();
        table.add(TimerKind::Oneshot, 100, 0, noop()).unwrap();

        table.begin_pass();
        table.add(TimerKind::Oneshot, 0, 0, noop()).unwrap();

        assert_eq!(
            table.slot_state(0, 0),
            SlotState::Due {
                handle: due,
                kind: TimerKind::Oneshot
            }
        );
        assert_eq!(table.slot_state(1, 0), SlotState::NotDue);
        assert_eq!(table.slot_state(2, 0), SlotState::ArmedMidPass);
        assert_eq!(table.slot_state(3, 0), SlotState::Unused);

        table.end_pass();
        assert!(matches!(table.slot_state(2, 0), SlotState::Due { .. }));
    }

    #[test]
    fn test_release_oneshot_frees_slot_before_handler_runs() {
        let mut table = TimerTable::new(1);
        let handle = table.add(TimerKind::Oneshot, 0, 0, noop()).unwrap();
        let handler = table.release_oneshot(handle);
        assert!(handler.is_some());
        assert_eq!(table.active_count(), 0);
        assert!(!table.is_active(handle));
        assert!(table.add(TimerKind::Oneshot, 5, 0, noop()).is_ok());
    }

    #[test]
    fn test_restore_after_self_removal_drops_handler() {
        let mut table = TimerTable::new(1);
        let handle = table.add(TimerKind::Periodic, 5, 0, noop()).unwrap();
        let handler = table.take_handler(handle).unwrap();
        table.remove(handle);
        table.restore_handler(handle, handler);
        assert_eq!(table.active_count(), 0);
        assert!(table.take_handler(handle).is_none());
    }

    #[test]
    fn test_earliest_deadline() {
        let mut table = TimerTable::new(4);
        assert_eq!(table.earliest_deadline(), None);
        let a = table.add(TimerKind::Oneshot, 30, 0, noop()).unwrap();
        table.add(TimerKind::Periodic, 20, 0, noop()).unwrap();
        table.add(TimerKind::Oneshot, 40, 0, noop()).unwrap();
        assert_eq!(table.earliest_deadline(), Some(20_000));
        table.remove(a);
        assert_eq!(table.earliest_deadline(), Some(20_000));
    }

    proptest! {
        /// Removing through arbitrary handles (stale, out of range, forged) only ever
        /// releases the timer a handle actually names, and `active_count` keeps matching
        /// the entries in use.
        #[test]
        fn prop_fuzzed_handles_never_touch_other_timers(
            slots in prop::collection::vec(0u32..12, 0..64),
            generations in prop::collection::vec(0u32..4, 0..64),
        ) {
            const CAPACITY: usize = 8;
            let mut table = TimerTable::new(CAPACITY);
            let mut live: Vec<TimerHandle> = (0..CAPACITY as u32)
                .map(|i| table.add(TimerKind::Periodic, 10 + i, 0, noop()).unwrap())
                .collect();

            for (slot, generation) in slots.into_iter().zip(generations) {
                let forged = TimerHandle::from_raw_parts(slot, generation);
                let expected = live.contains(&forged);
                prop_assert_eq!(table.remove(forged), expected);
                live.retain(|it| *it != forged);

                for handle in &live {
                    prop_assert!(table.is_active(*handle));
                }
                prop_assert_eq!(table.active_count(), live.len());
                prop_assert_eq!(table.count_in_use(), live.len());

                // Refill half the time, so generations move on.
                if generation % 2 == 0 && live.len() < CAPACITY {
                    live.push(table.add(TimerKind::Oneshot, 1, 0, noop()).unwrap());
                }
            }
        }
    }
}
