// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CLIArg,
            plugins::{Plugin, builtin_plugins}};
use eedd_reactor::{CommonResult, DEFAULT_MAX_PLUGINS, Reactor, ReactorConfig, SlotTable,
                   log::try_initialize_logging_global};
use std::rc::Rc;

/// Entry point of the `eedd` binary. Installs logging, assembles the reactor with the
/// built-in plugins and runs it until a plugin requests a stop. A fatal reactor error
/// ends the process from inside [`Reactor::run_or_exit()`].
///
/// # Errors
///
/// If logging can't be installed or a plugin fails to initialize.
pub fn run_daemon(cli_arg: &CLIArg) -> CommonResult<()> {
    try_initialize_logging_global(cli_arg.tracing_config())?;

    // % is Display, ? is Debug.
    tracing::info!(message = "Starting eedd", cli_arg = ?cli_arg);

    let mut plugins = builtin_plugins(cli_arg);
    let mut reactor = assemble(cli_arg.reactor_config(), DEFAULT_MAX_PLUGINS, &mut plugins)?;
    reactor.run_or_exit();

    tracing::info!(message = "eedd stopped", iterations = reactor.iteration());
    Ok(())
}

/// Puts every plugin in a fresh [`SlotTable`] in order, shares the table with a new
/// [`Reactor`], then initializes the plugins.
///
/// # Errors
///
/// - If there are more plugins than `slot_capacity`.
/// - If a plugin fails to initialize.
pub fn assemble(
    config: ReactorConfig,
    slot_capacity: usize,
    plugins: &mut [Box<dyn Plugin>],
) -> CommonResult<Reactor> {
    let mut slot_table = SlotTable::new(slot_capacity);
    let mut slot_ids = Vec::with_capacity(plugins.len());
    for plugin in plugins.iter() {
        let Some(slot_id) = slot_table.occupy(plugin.name(), plugin.description()) else {
            miette::bail!(
                "No free plugin slot for {} (capacity {slot_capacity})",
                plugin.name()
            );
        };
        slot_ids.push(slot_id);
    }

    let mut reactor = Reactor::new(config).with_plugin_slots(Rc::new(slot_table));

    for (plugin, slot_id) in plugins.iter_mut().zip(slot_ids) {
        plugin.initialize(&mut reactor, slot_id)?;
        tracing::debug!(message = "Plugin initialized", plugin = plugin.name(), slot_id);
    }

    Ok(reactor)
}
