// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod descriptor_table;
pub mod fd_set;
pub mod interest;

// Re-export.
pub use descriptor_table::*;
pub use fd_set::*;
pub use interest::*;
