// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::Plugin;
use eedd_reactor::{CommonResult, Reactor, TimerHandle, TimerKind};
use std::{cell::Cell, rc::Rc};

/// Logs a beat counter every period. Proof of life for whoever reads the log.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    period_ms: u32,
    beats: Rc<Cell<u64>>,
}

impl Heartbeat {
    #[must_use]
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            beats: Rc::default(),
        }
    }

    /// Beats so far. Clones share the counter.
    #[must_use]
    pub fn beats(&self) -> u64 { self.beats.get() }
}

impl Plugin for Heartbeat {
    fn name(&self) -> &'static str { "heartbeat" }

    fn description(&self) -> &'static str { "Logs a beat counter periodically" }

    fn initialize(&mut self, reactor: &mut Reactor, slot_id: usize) -> CommonResult<()> {
        let beats = self.beats.clone();
        reactor.add_timer(
            TimerKind::Periodic,
            self.period_ms,
            move |reactor: &mut Reactor, _: TimerHandle| {
                let beat = beats.get() + 1;
                beats.set(beat);
                let plugin = reactor
                    .slot_by_id(slot_id)
                    .and_then(|slot| slot.name.as_deref())
                    .unwrap_or("?");
                tracing::info!(message = "Heartbeat", plugin, beat);
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eedd_reactor::{MICROS_PER_MILLI, ManualClock, ReactorConfig, expire_and_reschedule};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_beats_once_per_period() {
        let clock = ManualClock::new(0);
        let mut reactor = Reactor::with_clock(ReactorConfig::default(), clock.clone());
        let mut heartbeat = Heartbeat::new(100);
        let observer = heartbeat.clone();
        heartbeat.initialize(&mut reactor, 0).unwrap();

        for _ in 0..5 {
            clock.advance_micros(100 * MICROS_PER_MILLI);
            expire_and_reschedule(&mut reactor);
        }
        assert_eq!(observer.beats(), 5);
    }
}
