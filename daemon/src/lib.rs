// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words eedd SIGTERM SIGINT

//! # eedd
//!
//! The empty peripheral daemon. It owns a [`SlotTable`] of plugins, hands the
//! [`Reactor`] a read only view of it, initializes each built-in [`Plugin`] (which
//! registers its descriptors and timers) and then runs the reactor until a plugin asks
//! it to stop.
//!
//! | Plugin           | What it registers                                              |
//! | :--------------- | :------------------------------------------------------------- |
//! | `heartbeat`      | A periodic timer that logs a beat counter                      |
//! | `signal_watch`   | A self pipe that SIGTERM and SIGINT write to; stops the loop   |
//!
//! [`Plugin`]: crate::plugins::Plugin
//! [`Reactor`]: eedd_reactor::Reactor
//! [`SlotTable`]: eedd_reactor::SlotTable

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod bootstrap;
pub mod clap_config;
pub mod plugins;

// Re-export.
pub use bootstrap::*;
pub use clap_config::*;
