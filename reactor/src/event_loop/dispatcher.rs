// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Reactor, ReadinessSets};

/// Runs the handler of every registration with activity in `ready`, in ascending slot
/// order. Returns how many handlers ran.
///
/// The registrations are captured before the first handler runs. A registration that a
/// handler removes or replaces is skipped if it comes later in the scan, and one that a
/// handler adds waits for the next iteration.
pub fn dispatch_ready(reactor: &mut Reactor, ready: &ReadinessSets) -> usize {
    let mut dispatched = 0;

    for registration in reactor.descriptors.registrations() {
        let activity = ready
            .activity_of(registration.fd)
            .masked_by(registration.interest);
        if activity.is_empty() {
            continue;
        }

        // Breaks the borrow so the handler can use `&mut Reactor`.
        let Some(mut handler) = reactor.descriptors.take_handler(&registration) else {
            continue;
        };

        tracing::trace!(
            message = "Dispatching descriptor",
            fd = registration.fd,
            slot = registration.slot,
            activity = ?activity
        );
        handler.on_activity(reactor, registration.fd, activity);
        reactor.descriptors.restore_handler(&registration, handler);
        dispatched += 1;
    }

    dispatched
}
