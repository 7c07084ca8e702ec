// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixed capacity table of watched descriptors.
//!
//! The table owns a [`Vec`] of slots allocated once at construction. A slot whose
//! descriptor is [`FREE_SLOT`] is free; add fills the first free slot, remove marks the
//! slot free again. After every mutation [`DescriptorTable::rebuild()`] recomputes the
//! three cached values the event loop reads each iteration:
//!
//! | Cache          | Meaning                                            |
//! | :------------- | :------------------------------------------------- |
//! | `len`          | number of occupied slots                           |
//! | `max_fd`       | highest registered descriptor                      |
//! | `readiness`    | readable / writable / exceptional [`FdSet`]s       |
//!
//! Each slot also carries a generation that changes whenever its registration changes,
//! so the dispatcher can tell "the same registration" apart from "a new registration
//! that happens to reuse the slot" after a handler runs.
//!
//! [`FdSet`]: crate::FdSet

use crate::{IoHandler, Interest, ReactorError, ReadinessSets};
use smallvec::SmallVec;
use std::{fmt::{Debug, Formatter},
          os::fd::RawFd};

/// Descriptor value of an unoccupied slot.
pub const FREE_SLOT: RawFd = -1;

pub const DEFAULT_MAX_DESCRIPTORS: usize = 100;

pub struct DescriptorEntry {
    pub fd: RawFd,
    pub interest: Interest,
    /// `None` only while the handler is being run by the dispatcher.
    handler: Option<Box<dyn IoHandler>>,
    generation: u32,
}

impl DescriptorEntry {
    fn free() -> Self {
        Self {
            fd: FREE_SLOT,
            interest: Interest::empty(),
            handler: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn is_free(&self) -> bool { self.fd == FREE_SLOT }
}

impl Debug for DescriptorEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorEntry")
            .field("fd", &self.fd)
            .field("interest", &self.interest)
            .field("has_handler", &self.handler.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

/// A copy of one occupied slot's identity at a point in time. The dispatcher holds on to
/// these across handler calls instead of borrowing the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub slot: usize,
    pub fd: RawFd,
    pub interest: Interest,
    generation: u32,
}

#[derive(Debug)]
pub struct DescriptorTable {
    slots: Vec<DescriptorEntry>,
    len: usize,
    max_fd: RawFd,
    readiness: ReadinessSets,
}

impl DescriptorTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| DescriptorEntry::free()).collect(),
            len: 0,
            max_fd: FREE_SLOT,
            readiness: ReadinessSets::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Occupied slot count.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Highest registered descriptor, if any.
    #[must_use]
    pub fn max_fd(&self) -> Option<RawFd> { (self.max_fd != FREE_SLOT).then_some(self.max_fd) }

    /// The cached sets, as of the last mutation.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessSets { &self.readiness }

    #[must_use]
    pub fn contains(&self, fd: RawFd) -> bool { self.slot_of(fd).is_some() }

    #[must_use]
    pub fn slot_of(&self, fd: RawFd) -> Option<usize> {
        if fd == FREE_SLOT {
            return None;
        }
        self.slots.iter().position(|entry| entry.fd == fd)
    }

    /// Registers `fd`. Returns the slot it went into.
    ///
    /// A descriptor that is already registered keeps its slot and has its interest and
    /// handler replaced, so a descriptor never occupies two slots.
    ///
    /// # Errors
    ///
    /// - [`ReactorError::InvalidDescriptor`] if `fd` isn't positive.
    /// - [`ReactorError::DescriptorTableFull`] if every slot is occupied. The table is
    ///   unchanged in both cases.
    pub fn add(
        &mut self,
        fd: RawFd,
        interest: Interest,
        handler: Box<dyn IoHandler>,
    ) -> Result<usize, ReactorError> {
        if fd <= 0 {
            return Err(ReactorError::InvalidDescriptor { fd });
        }

        let slot = match self.slot_of(fd) {
            Some(slot) => slot,
            None => self
                .slots
                .iter()
                .position(DescriptorEntry::is_free)
                .ok_or(ReactorError::DescriptorTableFull {
                    capacity: self.capacity(),
                })?,
        };

        let entry = &mut self.slots[slot];
        entry.fd = fd;
        entry.interest = interest;
        entry.handler = Some(handler);
        entry.generation = entry.generation.wrapping_add(1);

        self.rebuild();
        Ok(slot)
    }

    /// Frees the slot holding `fd`. Returns `false` if `fd` wasn't registered. Rebuilds
    /// the caches either way.
    pub fn remove(&mut self, fd: RawFd) -> bool {
        let removed = match self.slot_of(fd) {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.fd = FREE_SLOT;
                entry.interest = Interest::empty();
                entry.handler = None;
                entry.generation = entry.generation.wrapping_add(1);
                true
            }
            None => false,
        };
        self.rebuild();
        removed
    }

    /// Recomputes occupied count, highest descriptor and the readiness sets with one
    /// pass over every slot.
    pub fn rebuild(&mut self) {
        self.len = 0;
        self.max_fd = FREE_SLOT;
        self.readiness.clear();

        for entry in self.slots.iter().filter(|entry| !entry.is_free()) {
            self.len += 1;
            self.max_fd = self.max_fd.max(entry.fd);
            self.readiness.watch(entry.fd, entry.interest);
        }
    }

    /// Every occupied slot, in slot order.
    #[must_use]
    pub fn registrations(&self) -> SmallVec<[Registration; 16]> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_free())
            .map(|(slot, entry)| Registration {
                slot,
                fd: entry.fd,
                interest: entry.interest,
                generation: entry.generation,
            })
            .collect()
    }

    /// Moves the handler out of the slot, but only if the slot still holds exactly
    /// `registration`.
    pub fn take_handler(&mut self, registration: &Registration) -> Option<Box<dyn IoHandler>> {
        let entry = self.slots.get_mut(registration.slot)?;
        if entry.fd != registration.fd || entry.generation != registration.generation {
            return None;
        }
        entry.handler.take()
    }

    /// Puts a handler taken with [`Self::take_handler()`] back. If the handler removed or
    /// replaced its own registration in the meantime, the slot belongs to someone else
    /// now and `handler` is dropped instead.
    pub fn restore_handler(&mut self, registration: &Registration, handler: Box<dyn IoHandler>) {
        if let Some(entry) = self.slots.get_mut(registration.slot)
            && entry.fd == registration.fd
            && entry.generation == registration.generation
            && entry.handler.is_none()
        {
            entry.handler = Some(handler);
        }
    }
}
