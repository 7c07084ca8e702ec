// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod slot_table;

// Re-export.
pub use slot_table::*;
