// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file serves as the main library entry point for powbench, located at
// the root of the source tree. It exports all public modules and types that
// the binary and the integration tests use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: benchmark, build, core, env, telemetry, topology, tuning, utils

pub mod benchmark;
pub mod build;
pub mod core;
pub mod env;
pub mod telemetry;
pub mod topology;
pub mod tuning;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::benchmark::{BenchmarkRunner, ResultsFile, ResultsFileManager};
pub use crate::core::{Args, RunResult, Variant};
pub use crate::topology::{AffinityPlan, AffinityPlanner, CpuTopologyEntry, plan_affinity};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Changelog:
// - v1.0.0 (2026-10-18): Library root for the benchmark harness.
//   - Exports the pipeline modules (env, build, tuning, topology, telemetry,
//     benchmark) and the shared core/utils modules.
