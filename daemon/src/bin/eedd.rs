// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use clap::Parser;
use eedd::{CLIArg, run_daemon};
use eedd_reactor::CommonResult;

/// `mimalloc` replaces the default global allocator.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> CommonResult<()> {
    let cli_arg = CLIArg::parse();
    run_daemon(&cli_arg)
}
