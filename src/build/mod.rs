// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/build/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file declares the build module, which checks out and compiles the
// third-party benchmark binary.

pub mod source;

pub use source::{BENCHMARK_BINARY, SourceBuilder, locate_binary};

// Changelog:
// - v1.0.0 (2026-10-18): Build module.
