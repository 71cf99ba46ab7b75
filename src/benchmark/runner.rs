// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/benchmark/runner.rs
// Version: 1.1.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the benchmark execution loop. It runs the external
// benchmark binary once per variant per repetition, strictly one process at
// a time, capturing its output to a log file, timing it, sampling package
// energy around it and parsing the reported hashrate.

use crate::benchmark::parse::parse_hashrate;
use crate::core::types::{RunResult, Variant};
use crate::telemetry::EnergyMeter;
use crate::topology::CpuMask;
use crate::utils::{FormatUtils, exit_code};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;

const LOG_TARGET: &str = "powbench::runner";

/// Recorded exit code when the binary could not be started
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Configuration for benchmark execution
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub binary: PathBuf,
    pub threads: usize,
    pub init_threads: usize,
    pub nonces: u64,
    pub repetitions: u32,
    /// None runs without an affinity flag
    pub affinity: Option<CpuMask>,
    pub v1_flags: Vec<String>,
    pub v2_flags: Vec<String>,
    pub log_dir: PathBuf,
}

impl BenchmarkConfig {
    /// Full argument list for one invocation of `variant`
    pub fn build_args(&self, variant: Variant) -> Vec<String> {
        let mut args = vec![
            "--mine".to_string(),
            "--jit".to_string(),
            "--largePages".to_string(),
            "--threads".to_string(),
            self.threads.to_string(),
            "--init".to_string(),
            self.init_threads.to_string(),
            "--nonces".to_string(),
            self.nonces.to_string(),
        ];
        if let Some(ref mask) = self.affinity {
            args.push("--affinity".to_string());
            args.push(mask.to_hex());
        }
        let extra = match variant {
            Variant::V1 => &self.v1_flags,
            Variant::V2 => &self.v2_flags,
        };
        args.extend(extra.iter().cloned());
        args
    }

    pub fn log_path(&self, variant: Variant, repetition: u32) -> PathBuf {
        self.log_dir.join(format!("{}-{}.log", variant, repetition))
    }
}

/// Main benchmark runner
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    meter: EnergyMeter,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig, meter: EnergyMeter) -> Self {
        Self { config, meter }
    }

    /// Run every repetition, v1 then v2 within each; crashes are recorded
    pub async fn run(&self) -> Result<Vec<RunResult>> {
        tokio::fs::create_dir_all(&self.config.log_dir)
            .await
            .with_context(|| format!("cannot create log dir {}", self.config.log_dir.display()))?;

        info!(target: LOG_TARGET,
            "🧪 Starting {} repetitions of {} with {} threads ({} nonces, energy: {})",
            self.config.repetitions,
            Variant::ALL.map(|v| v.as_str()).join("/"),
            self.config.threads,
            self.config.nonces,
            self.meter.name()
        );

        let total = self.config.repetitions as usize * Variant::ALL.len();
        let mut results = Vec::with_capacity(total);
        let mut succeeded = 0usize;
        let mut crashed = 0usize;

        for repetition in 1..=self.config.repetitions {
            for variant in Variant::ALL {
                let result = self.run_once(variant, repetition).await;
                if result.succeeded() {
                    succeeded += 1;
                } else {
                    crashed += 1;
                }
                results.push(result);
            }
        }

        info!(target: LOG_TARGET, "✅ Runs finished: {} succeeded, {} failed", succeeded, crashed);
        Ok(results)
    }

    /// One invocation; failures to start or log are recorded as a crashed run
    pub async fn run_once(&self, variant: Variant, repetition: u32) -> RunResult {
        let args = self.config.build_args(variant);
        info!(target: LOG_TARGET,
            "🚀 [{}/{}] {} run",
            repetition, self.config.repetitions, variant
        );
        debug!(target: LOG_TARGET, "{} {}", self.config.binary.display(), args.join(" "));

        let log_path = self.config.log_path(variant, repetition);
        let measurement = self.meter.start(&format!("{}-{}", variant, repetition)).await;
        let started = Instant::now();
        let spawned = Command::new(&self.config.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await;
        let wall_time_seconds = started.elapsed().as_secs_f64();
        let energy_microjoules = measurement.finish().await;

        let output = match spawned {
            Ok(output) => output,
            Err(e) => {
                error!(target: LOG_TARGET,
                    "❌ {} #{}: failed to start {}: {}",
                    variant,
                    repetition,
                    self.config.binary.display(),
                    e
                );
                self.write_log(&log_path, &format!("failed to start: {}\n", e)).await;
                return RunResult {
                    variant,
                    repetition,
                    exit_code: SPAWN_FAILURE_EXIT_CODE,
                    hashrate: None,
                    energy_microjoules: None,
                    wall_time_seconds,
                };
            }
        };

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        self.write_log(&log_path, &captured).await;

        let code = exit_code(output.status);
        let hashrate = if code == 0 { parse_hashrate(&captured) } else { None };

        let result = RunResult {
            variant,
            repetition,
            exit_code: code,
            hashrate,
            energy_microjoules,
            wall_time_seconds,
        };

        match result.hashrate {
            Some(h) if result.succeeded() => info!(target: LOG_TARGET,
                "📊 {} #{}: {} in {}{}",
                variant,
                repetition,
                FormatUtils::format_hashrate(h),
                FormatUtils::format_seconds(wall_time_seconds),
                result
                    .energy_joules()
                    .map(|j| format!(", {}", FormatUtils::format_energy(j)))
                    .unwrap_or_default()
            ),
            _ if code != 0 => warn!(target: LOG_TARGET,
                "💥 {} #{} exited with code {} (log: {})",
                variant,
                repetition,
                code,
                log_path.display()
            ),
            _ => warn!(target: LOG_TARGET,
                "⚠️ {} #{} printed no hashrate (log: {})",
                variant,
                repetition,
                log_path.display()
            ),
        }

        result
    }

    async fn write_log(&self, path: &Path, content: &str) {
        if let Err(e) = tokio::fs::write(path, content).await {
            warn!(target: LOG_TARGET, "⚠️ Cannot write run log {}: {}", path.display(), e);
        }
    }
}


// Changelog:
// - v1.0.0 (2026-10-18): Reworked from the miner benchmark loop into the v1/v2 run loop.
//   - Output captured to per-run logs; signal exits map to 128 + signal.
// - v1.1.0 (2026-10-18): Start and log write failures are recorded as crashed runs.
//   - The loop no longer aborts, so earlier results are kept.
