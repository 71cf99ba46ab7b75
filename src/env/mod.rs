// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/env/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Host environment detection and build dependency provisioning.
//
// Tree Location:
// - src/env/mod.rs (env module entry point)
// - Submodules: detect, packages

pub mod detect;
pub mod packages;

pub use detect::{HostEnvironment, OsFamily};
pub use packages::{Dependency, PackageManager, ensure_dependencies, missing_dependencies};

// Changelog:
// - v1.0.0 (2026-10-18): Environment module.
//   - Host detection and dependency provisioning.
