// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod scheduler;
pub mod timer_handle;
pub mod timer_table;

// Re-export.
pub use scheduler::*;
pub use timer_handle::*;
pub use timer_table::*;
