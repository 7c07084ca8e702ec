// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Descriptor sets in the spirit of `fd_set`, without the `FD_SETSIZE` ceiling.
//!
//! The same type describes both sides of a readiness wait: the cached sets the
//! [`DescriptorTable`] derives from its entries (what to watch), and the sets the wait
//! hands back (what is ready).
//!
//! [`DescriptorTable`]: crate::DescriptorTable

use crate::{Activity, Interest};
use smallvec::SmallVec;
use std::os::fd::RawFd;

pub const FD_SET_INLINE_CAPACITY: usize = 16;

/// Sorted, duplicate free set of descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FdSet {
    fds: SmallVec<[RawFd; FD_SET_INLINE_CAPACITY]>,
}

impl FdSet {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, fd: RawFd) {
        if let Err(pos) = self.fds.binary_search(&fd) {
            self.fds.insert(pos, fd);
        }
    }

    #[must_use]
    pub fn contains(&self, fd: RawFd) -> bool { self.fds.binary_search(&fd).is_ok() }

    pub fn clear(&mut self) { self.fds.clear(); }

    #[must_use]
    pub fn len(&self) -> usize { self.fds.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.fds.is_empty() }

    /// Ascending descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = RawFd> + '_ { self.fds.iter().copied() }
}

impl FromIterator<RawFd> for FdSet {
    fn from_iter<T: IntoIterator<Item = RawFd>>(iter: T) -> Self {
        let mut it = Self::new();
        for fd in iter {
            it.insert(fd);
        }
        it
    }
}

/// The readable / writable / exceptional triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessSets {
    pub readable: FdSet,
    pub writable: FdSet,
    pub exceptional: FdSet,
}

impl ReadinessSets {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.readable.clear();
        self.writable.clear();
        self.exceptional.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty() && self.writable.is_empty() && self.exceptional.is_empty()
    }

    /// Adds `fd` to each set named in `interest`.
    pub fn watch(&mut self, fd: RawFd, interest: Interest) {
        if interest.contains(Interest::READABLE) {
            self.readable.insert(fd);
        }
        if interest.contains(Interest::WRITABLE) {
            self.writable.insert(fd);
        }
        if interest.contains(Interest::EXCEPTIONAL) {
            self.exceptional.insert(fd);
        }
    }

    /// Records observed `activity` on `fd`.
    pub fn mark_ready(&mut self, fd: RawFd, activity: Activity) {
        if activity.contains(Activity::READABLE) {
            self.readable.insert(fd);
        }
        if activity.contains(Activity::WRITABLE) {
            self.writable.insert(fd);
        }
        if activity.contains(Activity::EXCEPTIONAL) {
            self.exceptional.insert(fd);
        }
    }

    /// Which sets `fd` is in, as an [`Activity`] mask. Empty if none.
    #[must_use]
    pub fn activity_of(&self, fd: RawFd) -> Activity {
        let mut activity = Activity::empty();
        if self.readable.contains(fd) {
            activity |= Activity::READABLE;
        }
        if self.writable.contains(fd) {
            activity |= Activity::WRITABLE;
        }
        if self.exceptional.contains(fd) {
            activity |= Activity::EXCEPTIONAL;
        }
        activity
    }

    /// One `(fd, interest)` pair per descriptor in any set, ascending by descriptor.
    /// This is the shape `poll(2)` wants.
    #[must_use]
    pub fn watch_list(&self) -> SmallVec<[(RawFd, Interest); FD_SET_INLINE_CAPACITY]> {
        let all: FdSet = self
            .readable
            .iter()
            .chain(self.writable.iter())
            .chain(self.exceptional.iter())
            .collect();

        all.iter()
            .map(|fd| {
                let mut interest = Interest::empty();
                if self.readable.contains(fd) {
                    interest |= Interest::READABLE;
                }
                if self.writable.contains(fd) {
                    interest |= Interest::WRITABLE;
                }
                if self.exceptional.contains(fd) {
                    interest |= Interest::EXCEPTIONAL;
                }
                (fd, interest)
            })
            .collect()
    }
}
