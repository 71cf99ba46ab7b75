use crate::benchmark::stats::{Comparison, VariantSummary, summarize};
use crate::core::types::{Args, RunResult, Variant};
use crate::env::HostEnvironment;
use crate::topology::AffinityPlan;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};

static LOG_TARGET: &str = "powbench::results_file";

pub const RESULTS_SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ResultsFileError {
    #[error("Path {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Cannot save a results file without runs")]
    EmptyRunList,

    #[error("Results file does not exist at {path:?}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to serialize results file")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize results file: {message}")]
    DeserializationError { message: String },

    #[error("IO operation failed on {path:?}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create temporary file for atomic write")]
    AtomicWriteError {
        #[source]
        source: std::io::Error,
    },
}

/// Benchmark settings as they were used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub binary: PathBuf,
    pub repetitions: u32,
    pub threads: usize,
    pub init_threads: usize,
    pub nonces: u64,
    pub v1_flags: Vec<String>,
    pub v2_flags: Vec<String>,
    pub msr_preset: Option<String>,
    pub huge_pages: Option<u64>,
    pub energy_source: String,
}

impl ConfigSnapshot {
    pub fn from_args(args: &Args, binary: PathBuf, threads: usize, init_threads: usize) -> Self {
        Self {
            binary,
            repetitions: args.repetitions,
            threads,
            init_threads,
            nonces: args.nonces,
            v1_flags: args.variant_flags(Variant::V1),
            v2_flags: args.variant_flags(Variant::V2),
            msr_preset: None,
            huge_pages: None,
            energy_source: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub selected_logical_ids: Vec<usize>,
    pub bitmask: String,
}

impl From<&AffinityPlan> for PlanRecord {
    fn from(plan: &AffinityPlan) -> Self {
        Self {
            selected_logical_ids: plan.selected_logical_ids.clone(),
            bitmask: plan.affinity_arg(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub schema_version: u32,
    /// Unix seconds at which the run loop finished
    pub timestamp: u64,
    pub host: HostEnvironment,
    pub config: ConfigSnapshot,
    pub plan: Option<PlanRecord>,
    pub runs: Vec<RunResult>,
    pub summaries: Vec<VariantSummary>,
    pub comparison: Option<Comparison>,
}

impl ResultsFile {
    /// Assemble a results file, deriving summaries from `runs`
    pub fn new(
        host: HostEnvironment,
        config: ConfigSnapshot,
        plan: Option<&AffinityPlan>,
        runs: Vec<RunResult>,
    ) -> Self {
        let summaries = summarize(&runs);
        let comparison = Comparison::from_summaries(&summaries);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            schema_version: RESULTS_SCHEMA_VERSION,
            timestamp,
            host,
            config,
            plan: plan.map(PlanRecord::from),
            runs,
            summaries,
            comparison,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultsFileManager {
    directory_path: PathBuf,
    file_path: PathBuf,
}

impl ResultsFileManager {
    /// Manager for `file_path`; its parent directory must already exist
    pub fn new(file_path: PathBuf) -> Result<Self, ResultsFileError> {
        let directory_path = match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !directory_path.is_dir() {
            return Err(ResultsFileError::NotADirectory {
                path: directory_path,
            });
        }

        Ok(Self {
            directory_path,
            file_path,
        })
    }

    async fn _write_file(&self, results: &ResultsFile) -> Result<(), ResultsFileError> {
        debug!(target: LOG_TARGET, "Writing results file to {:?}", self.file_path);

        let contents = serde_json::to_vec_pretty(results)?;

        let temp_path = self.file_path.with_extension("tmp");

        {
            let mut temp_file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .await
                .map_err(|e| ResultsFileError::AtomicWriteError { source: e })?;

            temp_file
                .write_all(&contents)
                .await
                .map_err(|e| ResultsFileError::AtomicWriteError { source: e })?;

            temp_file
                .flush()
                .await
                .map_err(|e| ResultsFileError::AtomicWriteError { source: e })?;
        }

        fs::rename(&temp_path, &self.file_path)
            .await
            .map_err(|e| ResultsFileError::AtomicWriteError { source: e })?;

        info!(target: LOG_TARGET, "💾 Saved results file to {:?}", self.file_path);
        Ok(())
    }

    pub async fn load(&self) -> Result<ResultsFile, ResultsFileError> {
        debug!(target: LOG_TARGET, "Loading results file from {:?}", self.file_path);

        if !self.file_path.exists() {
            return Err(ResultsFileError::FileNotFound {
                path: self.file_path.clone(),
            });
        }

        let contents =
            fs::read_to_string(&self.file_path)
                .await
                .map_err(|e| ResultsFileError::IoError {
                    path: self.file_path.clone(),
                    source: e,
                })?;

        let results: ResultsFile = serde_json::from_str(&contents).map_err(|e| {
            ResultsFileError::DeserializationError {
                message: e.to_string(),
            }
        })?;

        info!(target: LOG_TARGET, "Loaded results file with {} runs", results.runs.len());
        Ok(results)
    }

    pub async fn save(&self, results: &ResultsFile) -> Result<(), ResultsFileError> {
        if results.runs.is_empty() {
            return Err(ResultsFileError::EmptyRunList);
        }

        self._write_file(results).await
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }
}
