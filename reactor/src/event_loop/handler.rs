// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Handler traits for descriptor activity and timer expiry.
//!
//! Both receive the [`Reactor`] mutably, so a handler can register or remove
//! descriptors and timers, look up plugin slots, or request a stop. State a handler
//! needs is captured by the closure (or held by the struct implementing the trait).
//!
//! Closures with the right shape implement the traits directly:
//!
//! ```no_run
//! use eedd_reactor::{Activity, Interest, Reactor, ReactorConfig, TimerHandle, TimerKind};
//! use std::os::fd::RawFd;
//!
//! let mut reactor = Reactor::new(ReactorConfig::default());
//! reactor
//!     .add_timer(TimerKind::Periodic, 1_000, |_: &mut Reactor, handle: TimerHandle| {
//!         tracing::info!(%handle, "tick");
//!     })
//!     .unwrap();
//! reactor
//!     .add_fd(5, Interest::READABLE, |reactor: &mut Reactor, fd: RawFd, _: Activity| {
//!         reactor.remove_fd(fd);
//!     })
//!     .unwrap();
//! ```

use crate::{Activity, Reactor, TimerHandle};
use std::os::fd::RawFd;

/// Called when the readiness wait reports activity on a registered descriptor.
pub trait IoHandler {
    /// `activity` is never empty and only contains kinds the descriptor registered
    /// interest in.
    fn on_activity(&mut self, reactor: &mut Reactor, fd: RawFd, activity: Activity);
}

impl<F> IoHandler for F
where
    F: FnMut(&mut Reactor, RawFd, Activity),
{
    fn on_activity(&mut self, reactor: &mut Reactor, fd: RawFd, activity: Activity) {
        self(reactor, fd, activity);
    }
}

/// Called when a timer's deadline has passed.
///
/// For a oneshot the timer is already released when this runs, so `handle` is stale and
/// the slot can be reused from inside the handler.
pub trait TimerHandler {
    fn on_expiry(&mut self, reactor: &mut Reactor, handle: TimerHandle);
}

impl<F> TimerHandler for F
where
    F: FnMut(&mut Reactor, TimerHandle),
{
    fn on_expiry(&mut self, reactor: &mut Reactor, handle: TimerHandle) {
        self(reactor, handle);
    }
}
