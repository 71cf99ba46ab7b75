// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/tuning/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file declares the tuning module: MSR presets and huge page
// reservation. Tuning failures are reported to the caller, which logs them
// and carries on with an untuned host.
//
// Tree Location:
// - src/tuning/mod.rs (tuning module entry point)
// - Submodules: msr, hugepages

pub mod hugepages;
pub mod msr;

pub use hugepages::{required_huge_pages, reserve_host_huge_pages, reserve_huge_pages};
pub use msr::{CpuIdentity, CpuVendor, MsrItem, MsrPreset, MsrSession, apply_host_preset, apply_preset};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("{feature} tuning is not supported on this platform")]
    Unsupported { feature: String },

    #[error("IO operation failed on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected content in {path:?}: '{content}'")]
    Parse { path: PathBuf, content: String },

    #[error("Failed to load the msr kernel module: {message}")]
    ModuleLoad { message: String },
}

// Changelog:
// - v1.0.0 (2026-10-18): Tuning module.
//   - TuningError shared by MSR and huge page code.
