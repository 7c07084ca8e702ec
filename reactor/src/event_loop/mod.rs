// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod dispatcher;
pub mod handler;
pub mod reactor;
pub mod reactor_config;
pub mod readiness_wait;

#[cfg(test)]
mod integration_tests;

// Re-export.
pub use dispatcher::*;
pub use handler::*;
pub use reactor::*;
pub use reactor_config::*;
pub use readiness_wait::*;
