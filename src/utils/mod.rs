// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for utility functions shared across
// the harness.
//
// Tree Location:
// - src/utils/mod.rs (utils module entry point)
// - Submodules: format, process

pub mod format;
pub mod process;

pub use format::FormatUtils;
pub use process::{exit_code, find_in_path, is_privileged, run_command};

// Changelog:
// - v1.0.0 (2026-10-18): Utils module.
//   - Adds process helpers next to FormatUtils.
