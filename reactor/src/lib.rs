// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words eedd epoll EINTR NVAL

//! # eedd reactor
//!
//! The single-threaded reactor at the heart of the `eedd` peripheral daemon. It
//! multiplexes readiness-based I/O across many file descriptors together with a
//! cooperative timer service, and dispatches registered handlers on one thread of
//! control.
//!
//! # Table of contents
//!
//! - [Architecture](#architecture)
//! - [One loop iteration](#one-loop-iteration)
//! - [Ordering guarantees](#ordering-guarantees)
//! - [Error policy](#error-policy)
//!
//! # Architecture
//!
//! | Component                 | Owns                                                          |
//! | :------------------------ | :------------------------------------------------------------ |
//! | [`DescriptorTable`]       | Fixed descriptor slots, cached count, max fd, readiness sets  |
//! | [`TimerTable`]            | Fixed timer slots, active count, generation-checked handles   |
//! | [`Reactor`]               | Both tables, the [`Clock`], the loop, the plugin slot view    |
//! | [`SlotTable`]             | Nothing. Owned by the daemon, read through [`slot_by_id()`]   |
//!
//! There is no global state. Every operation goes through an explicit [`Reactor`]
//! value, so several independent reactors can live in one process (tests do this all
//! the time).
//!
//! # One loop iteration
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ 1. expire_and_reschedule()   │ fire due timers, compute wait bound
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ 2. snapshot readiness sets   │ readable / writable / exceptional
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ 3. poll(2) until ready or    │ EINTR ──▶ next iteration
//! │    the wait bound elapses    │ other ──▶ fatal ReactorError
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ 4. dispatch in slot order    │ IoHandler::on_activity()
//! └──────────────────────────────┘
//! ```
//!
//! # Ordering guarantees
//!
//! - Within one iteration every due timer fires before any descriptor handler runs.
//! - Descriptor handlers fire in ascending slot order, not descriptor order.
//! - Handlers run to completion. Registrations they make are picked up by the next
//!   rebuild / expiry pass, never in the middle of the current one.
//!
//! # Error policy
//!
//! Table exhaustion follows one [`ExhaustionPolicy`] for both tables. See
//! [`ReactorError`] for the full taxonomy.
//!
//! [`slot_by_id()`]: Reactor::slot_by_id

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod common;
pub mod descriptor_registry;
pub mod event_loop;
pub mod log;
pub mod plugin_slots;
pub mod timer_registry;

// Re-export stable public API using glob imports for ergonomic, flat API surface.
pub use common::*;
pub use descriptor_registry::*;
pub use event_loop::*;
pub use plugin_slots::*;
pub use timer_registry::*;
