// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR NVAL revents

//! The one place the reactor blocks.
//!
//! [`block_until_ready()`] turns the cached [`ReadinessSets`] into a `poll(2)` request,
//! waits up to the timer scheduler's bound, and turns the `revents` back into
//! [`ReadinessSets`]. Readiness is level triggered: a descriptor that still has unread
//! data is reported again on the next iteration.
//!
//! # EINTR handling
//!
//! A signal delivered while blocked makes `poll(2)` fail with `EINTR`. That is
//! [`WaitOutcome::Interrupted`], not an error; the loop simply goes around again, which
//! also re-runs the timer pass. Every other failure is a [`ReactorError`] and fatal.
//!
//! # `revents` mapping
//!
//! | `revents`      | Reported as                                          |
//! | :------------- | :--------------------------------------------------- |
//! | `POLLIN`       | [`Activity::READABLE`]                               |
//! | `POLLOUT`      | [`Activity::WRITABLE`]                               |
//! | `POLLPRI`      | [`Activity::EXCEPTIONAL`]                            |
//! | `POLLHUP/ERR`  | every kind the descriptor registered interest in     |
//! | `POLLNVAL`     | [`ReactorError::StaleDescriptor`]                    |

use crate::{Activity, Interest, ReactorError, ReadinessSets};
use rustix::{event::{PollFd, PollFlags, Timespec, poll},
             fd::BorrowedFd,
             io::Errno};
use smallvec::SmallVec;
use std::{os::fd::RawFd, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The wait finished, either with activity or because the bound elapsed (then the
    /// sets are empty).
    Ready(ReadinessSets),
    /// A signal interrupted the wait.
    Interrupted,
}

/// Blocks until a descriptor in `watch` is ready or `timeout` elapses. `None` blocks
/// indefinitely.
///
/// # Errors
///
/// - [`ReactorError::StaleDescriptor`] if a watched descriptor isn't open.
/// - [`ReactorError::ReadinessWait`] for any other failure except `EINTR`.
pub fn block_until_ready(
    watch: &ReadinessSets,
    timeout: Option<Duration>,
) -> Result<WaitOutcome, ReactorError> {
    let watch_list = watch.watch_list();

    let mut poll_fds: SmallVec<[PollFd<'_>; 16]> = watch_list
        .iter()
        .map(|&(fd, interest)| {
            // SAFETY: `poll(2)` only reads the descriptor number. A registered descriptor
            // that has been closed is reported back as `POLLNVAL`, never dereferenced.
            let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
            PollFd::from_borrowed_fd(borrowed, poll_flags_for(interest))
        })
        .collect();

    let timespec = timeout.map(to_timespec);

    match poll(&mut poll_fds, timespec.as_ref()) {
        Ok(_) => {}
        Err(errno) if errno == Errno::INTR => {
            tracing::trace!(message = "Readiness wait interrupted, retrying");
            return Ok(WaitOutcome::Interrupted);
        }
        Err(errno) => {
            return Err(ReactorError::ReadinessWait(std::io::Error::from(errno)));
        }
    }

    let mut ready = ReadinessSets::new();
    for (&(fd, interest), poll_fd) in watch_list.iter().zip(&poll_fds) {
        let activity = activity_from(fd, poll_fd.revents(), interest)?;
        ready.mark_ready(fd, activity);
    }

    Ok(WaitOutcome::Ready(ready))
}

#[must_use]
pub fn poll_flags_for(interest: Interest) -> PollFlags {
    let mut flags = PollFlags::empty();
    if interest.contains(Interest::READABLE) {
        flags |= PollFlags::IN;
    }
    if interest.contains(Interest::WRITABLE) {
        flags |= PollFlags::OUT;
    }
    if interest.contains(Interest::EXCEPTIONAL) {
        flags |= PollFlags::PRI;
    }
    flags
}

/// # Errors
///
/// [`ReactorError::StaleDescriptor`] if `revents` has `POLLNVAL`.
pub fn activity_from(
    fd: RawFd,
    revents: PollFlags,
    interest: Interest,
) -> Result<Activity, ReactorError> {
    if revents.contains(PollFlags::NVAL) {
        return Err(ReactorError::StaleDescriptor { fd });
    }

    let mut activity = Activity::empty();
    if revents.contains(PollFlags::IN) {
        activity |= Activity::READABLE;
    }
    if revents.contains(PollFlags::OUT) {
        activity |= Activity::WRITABLE;
    }
    if revents.contains(PollFlags::PRI) {
        activity |= Activity::EXCEPTIONAL;
    }
    if revents.intersects(PollFlags::HUP | PollFlags::ERR) {
        activity |= Activity::all_of(interest);
    }

    Ok(activity.masked_by(interest))
}

fn to_timespec(duration: Duration) -> Timespec {
    Timespec {
        tv_sec: duration.as_secs().try_into().unwrap_or(i64::MAX),
        tv_nsec: duration.subsec_nanos().into(),
    }
}
