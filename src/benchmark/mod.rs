// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/benchmark/mod.rs
// Version: 1.1.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file declares the benchmark module: the sequential run loop around the
// external benchmark binary, output parsing, aggregation, the console report
// and the JSON results file.
//
// Tree Location:
// - src/benchmark/mod.rs (benchmark module entry point)
// - Submodules: parse, runner, stats, report, results_file

pub mod parse;
pub mod report;
pub mod results_file;
pub mod runner;
pub mod stats;

// Re-export key benchmark types and functions
pub use parse::parse_hashrate;
pub use report::{print_report, render_report};
pub use results_file::{ConfigSnapshot, PlanRecord, ResultsFile, ResultsFileError, ResultsFileManager};
pub use runner::{BenchmarkConfig, BenchmarkRunner, SPAWN_FAILURE_EXIT_CODE};
pub use stats::{AggregateStats, Comparison, VariantSummary, percentage_change, summarize};

// Changelog:
// - v1.1.0 (2026-10-18): Benchmark module now drives an external binary.
//   - Replaced jobs/profiler with parse, stats, report and results_file.
//   - Runner executes v1/v2 repetitions sequentially and records RunResults.
// - v1.0.0 (2025-06-14): Initial benchmark module creation.
