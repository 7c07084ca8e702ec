// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Built-in plugins and the [`Plugin`] trait they share.

use crate::CLIArg;
use eedd_reactor::{CommonResult, Reactor};
use std::fmt::Debug;

// Attach sources.
pub mod heartbeat;
#[cfg(unix)]
pub mod signal_watch;

// Re-export.
pub use heartbeat::*;
#[cfg(unix)]
pub use signal_watch::*;

/// A unit of daemon functionality that lives in one plugin slot.
///
/// The host puts every plugin in the slot table first, then initializes them in slot
/// order, so [`Reactor::slot_by_id()`] already sees all of them during
/// [`Self::initialize()`].
pub trait Plugin: Debug {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Registers the plugin's descriptors and timers with `reactor`. `slot_id` is the
    /// plugin's own slot.
    ///
    /// # Errors
    ///
    /// If a registration is declined or a resource the plugin needs can't be set up.
    fn initialize(&mut self, reactor: &mut Reactor, slot_id: usize) -> CommonResult<()>;
}

/// The plugins every daemon starts with, in slot order.
#[must_use]
pub fn builtin_plugins(cli_arg: &CLIArg) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Heartbeat::new(cli_arg.heartbeat_ms))];
    #[cfg(unix)]
    plugins.push(Box::new(SignalWatch::default()));
    plugins
}
