// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the core types of the harness.

pub mod types;

pub use types::{Args, RunResult, Variant};

// Changelog:
// - v1.0.0 (2026-10-18): Core module reduced to the CLI and run result types.
