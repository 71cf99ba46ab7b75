// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/build/source.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Clones the benchmark sources and builds them with CMake. The same cmake
// invocation works for Makefile generators on Linux and Visual Studio
// generators on Windows (multi-config, hence --config Release).
//
// Tree Location:
// - src/build/source.rs (git checkout + cmake build)
// - Depends on: anyhow, tokio, utils::process

use crate::utils::run_command;
use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "powbench::build";

/// Name of the benchmark executable produced by the build
pub const BENCHMARK_BINARY: &str = "randomx-benchmark";

#[derive(Debug, Clone)]
pub struct SourceBuilder {
    repo_url: String,
    git_ref: String,
    work_dir: PathBuf,
    jobs: usize,
}

impl SourceBuilder {
    pub fn new(repo_url: String, git_ref: String, work_dir: PathBuf) -> Self {
        Self {
            repo_url,
            git_ref,
            work_dir,
            jobs: num_cpus::get(),
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.work_dir.join("src")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.work_dir.join("build")
    }

    /// Checkout, configure and compile; returns the benchmark binary path
    pub async fn build(&self) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("cannot create work dir {}", self.work_dir.display()))?;

        self.checkout().await?;
        self.configure().await?;
        self.compile().await?;

        let binary = locate_binary(&self.build_dir()).with_context(|| {
            format!(
                "build finished but {} was not found below {}",
                BENCHMARK_BINARY,
                self.build_dir().display()
            )
        })?;
        info!(target: LOG_TARGET, "🔨 Benchmark binary: {}", binary.display());
        Ok(binary)
    }

    /// Reuse a previous build without touching the sources
    pub fn existing_binary(&self) -> Result<PathBuf> {
        match locate_binary(&self.build_dir()) {
            Some(binary) => Ok(binary),
            None => bail!(
                "no existing build in {}; run without --skip-build first",
                self.build_dir().display()
            ),
        }
    }

    async fn checkout(&self) -> Result<()> {
        let src = self.source_dir();
        let src_string = src.to_string_lossy().to_string();
        let src_str = src_string.as_str();
        let git_ref = self.git_ref.as_str();

        if src.join(".git").is_dir() {
            info!(target: LOG_TARGET, "📥 Updating {} to {}", src.display(), self.git_ref);
            run_command("git", ["-C", src_str, "fetch", "--depth", "1", "origin", git_ref], None)
                .await?;
            run_command("git", ["-C", src_str, "checkout", "--force", "FETCH_HEAD"], None).await?;
        } else {
            info!(target: LOG_TARGET, "📥 Cloning {} ({})", self.repo_url, self.git_ref);
            run_command(
                "git",
                [
                    "clone",
                    "--depth",
                    "1",
                    "--branch",
                    git_ref,
                    self.repo_url.as_str(),
                    src_str,
                ],
                None,
            )
            .await?;
        }
        Ok(())
    }

    async fn configure(&self) -> Result<()> {
        let src = self.source_dir().to_string_lossy().to_string();
        let build = self.build_dir().to_string_lossy().to_string();
        run_command(
            "cmake",
            [
                "-S",
                src.as_str(),
                "-B",
                build.as_str(),
                "-DARCH=native",
                "-DCMAKE_BUILD_TYPE=Release",
            ],
            None,
        )
        .await
    }

    async fn compile(&self) -> Result<()> {
        let build = self.build_dir().to_string_lossy().to_string();
        let jobs = self.jobs.max(1).to_string();
        run_command(
            "cmake",
            ["--build", build.as_str(), "--config", "Release", "-j", jobs.as_str()],
            None,
        )
        .await
    }
}

/// Find the benchmark binary in single- or multi-config build layouts
pub fn locate_binary(build_dir: &Path) -> Option<PathBuf> {
    let names = [
        BENCHMARK_BINARY.to_string(),
        format!("{}.exe", BENCHMARK_BINARY),
    ];
    let dirs = [build_dir.to_path_buf(), build_dir.join("Release")];
    dirs.iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

// Changelog:
// - v1.0.0 (2026-10-18): Source checkout and CMake build of the benchmark binary.
//   - locate_binary covers single and multi-config layouts.
