// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines core data structures for the harness, located in the
// core subdirectory. It includes the command-line arguments, the algorithm
// variants under comparison and the per-invocation run record.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Algorithm variants being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    V1,
    V2,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::V1, Variant::V2];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Variant::V1 => "v1",
            Variant::V2 => "v2",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line arguments for the benchmark harness
#[derive(Parser, Debug, Clone)]
#[command(
    name = "powbench",
    author = "PowBench Team",
    version = "1.0.0",
    about = "Topology-aware v1/v2 proof-of-work benchmark harness",
    long_about = "PowBench builds a third-party proof-of-work benchmark, tunes the host for\n\
                  best-case throughput and compares the v1 and v2 variants of the algorithm.\n\n\
                  PIPELINE: detect host -> install deps -> build -> MSR/huge pages -> plan affinity\n\
                            -> run N repetitions of each variant -> aggregate -> report\n\n\
                  Examples:\n\
                    Full run:        sudo powbench --repetitions 5\n\
                    Prebuilt binary: powbench --binary ./randomx-benchmark --skip-deps\n\
                    Fixed threads:   powbench --threads 16 --nonces 2000000\n\
                    Re-render:       powbench --report-only powbench-results.json"
)]
pub struct Args {
    /// Benchmark runs per variant
    #[arg(
        long,
        default_value = "3",
        value_name = "COUNT",
        help = "Number of runs per variant"
    )]
    pub repetitions: u32,

    /// Number of worker threads
    /// 0 = derive from physical cores and last-level cache size
    #[arg(
        short,
        long,
        default_value = "0",
        value_name = "COUNT",
        help = "Worker threads (0 = auto from topology)"
    )]
    pub threads: usize,

    /// Directory holding the source checkout, build tree and run logs
    #[arg(
        long,
        default_value = "powbench-work",
        value_name = "DIR",
        help = "Working directory for sources, build and logs"
    )]
    pub work_dir: PathBuf,

    /// Git repository of the benchmark sources
    #[arg(
        long,
        default_value = "https://github.com/tevador/RandomX.git",
        value_name = "URL",
        help = "Benchmark source repository"
    )]
    pub repo_url: String,

    /// Branch or tag to build
    #[arg(
        long,
        default_value = "master",
        value_name = "REF",
        help = "Branch or tag to build"
    )]
    pub git_ref: String,

    /// Use an already built benchmark binary (skips the build step)
    #[arg(long, value_name = "PATH", help = "Prebuilt benchmark binary")]
    pub binary: Option<PathBuf>,

    #[arg(long, default_value = "false", help = "Do not install missing packages")]
    pub skip_deps: bool,

    #[arg(long, default_value = "false", help = "Reuse the existing build in the work dir")]
    pub skip_build: bool,

    #[arg(long, default_value = "false", help = "Do not write CPU model-specific registers")]
    pub skip_msr: bool,

    #[arg(long, default_value = "false", help = "Do not reserve huge pages")]
    pub skip_hugepages: bool,

    #[arg(long, default_value = "false", help = "Do not pass a CPU affinity mask")]
    pub no_affinity: bool,

    /// Hashes computed per run
    #[arg(
        long,
        default_value = "1000000",
        value_name = "COUNT",
        help = "Nonces hashed per run"
    )]
    pub nonces: u64,

    /// Dataset initialization threads
    #[arg(
        long,
        default_value = "0",
        value_name = "COUNT",
        help = "Dataset init threads (0 = all logical CPUs)"
    )]
    pub init_threads: usize,

    /// Extra arguments for the v1 variant, whitespace separated
    #[arg(long, default_value = "", value_name = "ARGS", allow_hyphen_values = true)]
    pub v1_flags: String,

    /// Extra arguments for the v2 variant, whitespace separated
    #[arg(long, default_value = "--v2", value_name = "ARGS", allow_hyphen_values = true)]
    pub v2_flags: String,

    /// Results file written at the end of the run
    #[arg(
        short,
        long,
        default_value = "powbench-results.json",
        value_name = "PATH",
        help = "Results file (JSON)"
    )]
    pub output: PathBuf,

    /// Print the report of a saved results file and exit
    #[arg(long, value_name = "PATH", help = "Re-render a saved results file")]
    pub report_only: Option<PathBuf>,

    #[arg(short, long, default_value = "false", help = "Enable debug logging")]
    pub verbose: bool,
}

/// Outcome of one benchmark invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub variant: Variant,
    pub repetition: u32,
    pub exit_code: i32,
    /// Parsed hashrate (H/s); None when the run crashed or printed nothing usable
    pub hashrate: Option<f64>,
    pub energy_microjoules: Option<u64>,
    pub wall_time_seconds: f64,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && self.hashrate.is_some()
    }

    pub fn energy_joules(&self) -> Option<f64> {
        self.energy_microjoules.map(|uj| uj as f64 / 1_000_000.0)
    }

    /// Average package power over the run
    pub fn average_watts(&self) -> Option<f64> {
        match self.energy_joules() {
            Some(joules) if self.wall_time_seconds > 0.0 => Some(joules / self.wall_time_seconds),
            _ => None,
        }
    }
}

impl Args {
    /// Validate arguments and return helpful errors
    pub fn validate(&self) -> Result<(), String> {
        if self.report_only.is_some() {
            return Ok(());
        }

        if self.repetitions == 0 {
            return Err("Repetitions must be at least 1".to_string());
        }
        if self.repetitions > 100 {
            return Err("Repetitions cannot exceed 100".to_string());
        }
        if self.threads > 1024 {
            return Err("Thread count cannot exceed 1024".to_string());
        }
        if self.init_threads > 1024 {
            return Err("Init thread count cannot exceed 1024".to_string());
        }
        if self.nonces == 0 {
            return Err("Nonce count must be greater than 0".to_string());
        }
        if let Some(ref binary) = self.binary {
            if !binary.is_file() {
                return Err(format!("Benchmark binary {} does not exist", binary.display()));
            }
        }
        if self.binary.is_none() && !self.repo_url.contains("://") && !self.repo_url.contains('@') {
            return Err("Repository URL must be a git URL (https://... or git@...)".to_string());
        }
        if self.git_ref.trim().is_empty() {
            return Err("Git ref cannot be empty".to_string());
        }

        Ok(())
    }

    /// Extra benchmark arguments for a variant
    pub fn variant_flags(&self, variant: Variant) -> Vec<String> {
        let raw = match variant {
            Variant::V1 => &self.v1_flags,
            Variant::V2 => &self.v2_flags,
        };
        raw.split_whitespace().map(str::to_string).collect()
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Reworked from the miner's argument/pool types.
//   - Args now describes the benchmark pipeline (build, tuning, run loop, output).
//   - Added Variant and RunResult; pool job, share and target types removed.
