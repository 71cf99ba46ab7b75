// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/topology/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file declares the topology module: CPU discovery, the affinity
// planner and the cache-based thread count heuristic.
//
// Tree Location:
// - src/topology/mod.rs (topology module entry point)
// - Submodules: affinity, sysfs, threads

pub mod affinity;
pub mod sysfs;
pub mod threads;

pub use affinity::{
    AffinityError, AffinityPlan, AffinityPlanner, CpuMask, CpuTopologyEntry, plan_affinity,
};
pub use sysfs::{detect_topology, read_topology_from};
pub use threads::recommended_threads;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A last-level cache shared by a group of cores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlcDomain {
    pub id: usize,
    pub size_bytes: Option<u64>,
}

/// Topology snapshot taken once before planning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTopology {
    pub entries: Vec<CpuTopologyEntry>,
    pub llc_domains: Vec<LlcDomain>,
}

impl SystemTopology {
    pub fn logical_cpus(&self) -> usize {
        self.entries.len()
    }

    pub fn physical_cores(&self) -> usize {
        self.entries
            .iter()
            .map(|e| (e.llc_domain_id, e.core_id))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn domain_count(&self) -> usize {
        self.llc_domains.len().max(1)
    }

    pub fn llc_size(&self, domain: usize) -> Option<u64> {
        self.llc_domains
            .iter()
            .find(|d| d.id == domain)
            .and_then(|d| d.size_bytes)
    }

    pub fn planner(&self) -> Result<AffinityPlanner<'_>, AffinityError> {
        AffinityPlanner::new(&self.entries)
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Topology module.
//   - SystemTopology and LlcDomain snapshots.
