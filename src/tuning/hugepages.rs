// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/tuning/hugepages.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// 2 MiB huge page reservation for the dataset, cache and per-thread
// scratchpads.

use super::TuningError;
use log::{info, warn};
use std::fs;
use std::path::Path;

const LOG_TARGET: &str = "powbench::hugepages";

pub const NR_HUGEPAGES_PATH: &str = "/proc/sys/vm/nr_hugepages";

const DATASET_MIB: u64 = 2080;
const CACHE_MIB: u64 = 256;
const HUGE_PAGE_MIB: u64 = 2;

/// Pages needed for the full dataset plus one scratchpad page per thread
pub fn required_huge_pages(threads: usize) -> u64 {
    (DATASET_MIB + CACHE_MIB).div_ceil(HUGE_PAGE_MIB) + threads as u64
}

/// Raise the reservation at `path` to at least `required`; returns the
/// number of pages the kernel actually reserved
pub fn reserve_huge_pages(path: &Path, required: u64) -> Result<u64, TuningError> {
    let current = read_pages(path)?;
    if current >= required {
        info!(target: LOG_TARGET, "✅ {} huge pages already reserved (need {})", current, required);
        return Ok(current);
    }

    fs::write(path, required.to_string()).map_err(|e| TuningError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reserved = read_pages(path)?;
    if reserved < required {
        warn!(target: LOG_TARGET,
            "⚠️ Only {} of {} huge pages could be reserved (fragmented memory?)",
            reserved, required
        );
    } else {
        info!(target: LOG_TARGET, "🧱 Reserved {} huge pages", reserved);
    }
    Ok(reserved)
}

#[cfg(target_os = "linux")]
pub fn reserve_host_huge_pages(threads: usize) -> Result<u64, TuningError> {
    reserve_huge_pages(Path::new(NR_HUGEPAGES_PATH), required_huge_pages(threads))
}

#[cfg(not(target_os = "linux"))]
pub fn reserve_host_huge_pages(_threads: usize) -> Result<u64, TuningError> {
    warn!(target: LOG_TARGET,
        "⚠️ Large pages need the 'Lock pages in memory' privilege on Windows; grant it via secpol.msc"
    );
    Err(TuningError::Unsupported {
        feature: "hugepages".to_string(),
    })
}

fn read_pages(path: &Path) -> Result<u64, TuningError> {
    let content = fs::read_to_string(path).map_err(|e| TuningError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    content
        .trim()
        .parse()
        .map_err(|_| TuningError::Parse {
            path: path.to_path_buf(),
            content: content.trim().to_string(),
        })
}

// Changelog:
// - v1.0.0 (2026-10-18): Huge page reservation.
//   - Required pages derived from the dataset plus one scratchpad per thread.
//   - Reservation is only ever raised.
