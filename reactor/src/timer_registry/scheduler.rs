// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The expire-and-reschedule pass that opens every loop iteration.
//!
//! # Pass rules
//!
//! - The clock is read once when the pass begins, and every slot is checked against
//!   that reading. Time spent in handlers never makes a later timer due in the same
//!   pass.
//! - The scan examines at most as many in-use slots as were active when the pass began.
//!   It stops early once that many have been looked at.
//! - A due oneshot is released *before* its handler runs, so the handler may reuse the
//!   slot. Timers added while the pass is running never fire in the same pass.
//! - A due periodic timer's deadline moves forward by one period after its handler
//!   returns. That step compares against a fresh clock read taken after the handler,
//!   not the pass reading: when the new deadline is still in the past (the handler, or
//!   the process, overran) it is clamped to the current time and a missed timeout is
//!   reported.
//! - The returned wait bound is measured from the latest clock read, so time spent in
//!   handlers is not waited for twice.

use crate::{Reactor, SlotState, TimerKind, log::diag_sink};
use std::time::Duration;

/// Fires every due timer, then returns how long the readiness wait may block before the
/// next deadline. `None` means no timer is active and the wait is unbounded.
pub fn expire_and_reschedule(reactor: &mut Reactor) -> Option<Duration> {
    let remaining = reactor.timers.active_count();
    if remaining == 0 {
        return None;
    }

    let pass_now = reactor.clock.now_micros();
    reactor.timers.begin_pass();

    let mut examined = 0;
    for slot in 0..reactor.timers.capacity() {
        if examined >= remaining {
            break;
        }

        match reactor.timers.slot_state(slot, pass_now) {
            SlotState::Unused | SlotState::ArmedMidPass => {}
            SlotState::NotDue => examined += 1,
            SlotState::Due {
                handle,
                kind: TimerKind::Oneshot,
            } => {
                examined += 1;
                if let Some(mut handler) = reactor.timers.release_oneshot(handle) {
                    tracing::trace!(message = "Oneshot timer expired", %handle);
                    handler.on_expiry(reactor, handle);
                }
            }
            SlotState::Due {
                handle,
                kind: TimerKind::Periodic,
            } => {
                examined += 1;
                let Some(mut handler) = reactor.timers.take_handler(handle) else {
                    continue;
                };
                tracing::trace!(message = "Periodic timer expired", %handle);
                handler.on_expiry(reactor, handle);
                reactor.timers.restore_handler(handle, handler);

                let after_handler = reactor.clock.now_micros();
                if reactor.timers.advance_periodic(handle, after_handler) {
                    diag_sink::report("Missed timeout on timer %s", &[&slot.to_string()]);
                }
            }
        }
    }

    reactor.timers.end_pass();
    next_wait(reactor)
}

fn next_wait(reactor: &Reactor) -> Option<Duration> {
    if reactor.timers.active_count() == 0 {
        return None;
    }
    let Some(deadline) = reactor.timers.earliest_deadline() else {
        diag_sink::report("eedd internal timer error", &[]);
        return None;
    };
    let now = reactor.clock.now_micros();
    Some(Duration::from_micros(deadline.saturating_sub(now)))
}
