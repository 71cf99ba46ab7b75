// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/topology/threads.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Thread count heuristic used when --threads is 0. Each worker keeps a 2 MiB
// scratchpad hot in the last-level cache, so a domain runs at most
// llc_bytes / 2 MiB workers and never more than its physical cores.

use super::SystemTopology;
use log::debug;
use std::collections::{BTreeMap, HashSet};

const LOG_TARGET: &str = "powbench::threads";

/// Last-level cache budget per worker thread
pub const CACHE_PER_THREAD_BYTES: u64 = 2 * 1024 * 1024;

pub fn recommended_threads(topology: &SystemTopology) -> usize {
    let mut cores_per_domain: BTreeMap<usize, HashSet<usize>> = BTreeMap::new();
    for entry in &topology.entries {
        cores_per_domain
            .entry(entry.llc_domain_id)
            .or_default()
            .insert(entry.core_id);
    }

    let mut total = 0usize;
    for (domain, cores) in &cores_per_domain {
        let size = topology.llc_size(*domain);
        // Unknown cache size: assume enough for every core
        let cap = size
            .map(|bytes| (bytes / CACHE_PER_THREAD_BYTES) as usize)
            .unwrap_or(cores.len());
        let threads = cores.len().min(cap);
        debug!(target: LOG_TARGET,
            "LLC domain {}: {} cores, cache {:?} bytes -> {} threads",
            domain, cores.len(), size, threads
        );
        total += threads;
    }

    total.max(1)
}

// Changelog:
// - v1.0.0 (2026-10-18): Cache-based thread heuristic, 2 MiB of LLC per thread.
