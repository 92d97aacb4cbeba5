// Copyright 2024-2026 coalesce-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for `coalesce-core-cli`.
//!
//! ## Usage
//!
//! ```bash
//! coalesce-core-cli config show [--file PATH]      # Effective configuration
//! coalesce-core-cli config defaults                # Built-in defaults
//! coalesce-core-cli config validate [--file PATH]  # Check for misconfiguration
//! coalesce-core-cli simulate --keys 500            # Drive an engine in-process
//! ```

pub mod config_cmd;
pub mod simulate;

pub use simulate::{run_simulation, SimulationOptions, SimulationReport};

/// Value following `flag` in `args`, if present.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}
