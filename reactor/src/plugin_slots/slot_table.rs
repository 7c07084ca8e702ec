// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The host daemon's table of plugin slots.
//!
//! The daemon owns and fills the table at startup, then shares it with the [`Reactor`]
//! behind an [`Rc`](std::rc::Rc). From then on plugins only read it, through
//! [`Reactor::slot_by_id()`], to find out which other plugins are loaded.
//!
//! [`Reactor`]: crate::Reactor
//! [`Reactor::slot_by_id()`]: crate::Reactor::slot_by_id

use std::fmt::{Display, Formatter};

pub const DEFAULT_MAX_PLUGINS: usize = 16;

/// One entry of the [`SlotTable`]. A slot with no name is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSlot {
    pub id: usize,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PluginSlot {
    #[must_use]
    pub fn is_occupied(&self) -> bool { self.name.is_some() }
}

impl Display for PluginSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.name, &self.description) {
            (Some(name), Some(description)) => {
                write!(f, "{}: {name} ({description})", self.id)
            }
            (Some(name), None) => write!(f, "{}: {name}", self.id),
            (None, _) => write!(f, "{}: <empty>", self.id),
        }
    }
}

/// Fixed capacity, index addressed plugin slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<PluginSlot>,
}

impl Default for SlotTable {
    fn default() -> Self { Self::new(DEFAULT_MAX_PLUGINS) }
}

impl SlotTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|id| PluginSlot {
                    id,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Bounds checked; `None` for any `id` at or past [`Self::capacity()`].
    #[must_use]
    pub fn lookup(&self, id: usize) -> Option<&PluginSlot> { self.slots.get(id) }

    pub fn slots_mut(&mut self) -> &mut [PluginSlot] { &mut self.slots }

    /// Puts a plugin into the first empty slot and returns its id, or `None` if every
    /// slot is taken.
    pub fn occupy(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Option<usize> {
        let slot = self.slots.iter_mut().find(|slot| !slot.is_occupied())?;
        slot.name = Some(name.into());
        slot.description = Some(description.into());
        Some(slot.id)
    }

    /// The first occupied slot with the given plugin name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&PluginSlot> {
        self.slots
            .iter()
            .find(|slot| slot.name.as_deref() == Some(name))
    }

    pub fn occupied(&self) -> impl Iterator<Item = &PluginSlot> {
        self.slots.iter().filter(|slot| slot.is_occupied())
    }
}
