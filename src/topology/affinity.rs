// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/topology/affinity.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the topology-aware affinity planner. Given one entry
// per logical CPU (physical core id + last-level-cache domain id) and a
// thread count, it picks which logical CPUs the benchmark workers are bound
// to and renders the selection as a hex affinity mask.
//
// Tree Location:
// - src/topology/affinity.rs (affinity planner, CPU mask)
// - Depends on: serde, thiserror

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AffinityError {
    #[error("Invalid CPU topology: {reason}")]
    InvalidTopology { reason: String },

    #[error("Failed to parse CPU list '{input}'")]
    InvalidCpuList { input: String },
}

/// One logical CPU as seen by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTopologyEntry {
    pub logical_id: usize,
    pub core_id: usize,
    pub llc_domain_id: usize,
}

impl CpuTopologyEntry {
    pub fn new(logical_id: usize, core_id: usize, llc_domain_id: usize) -> Self {
        Self {
            logical_id,
            core_id,
            llc_domain_id,
        }
    }
}

/// Arbitrary-width CPU bitmask, one bit per logical CPU
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuMask {
    words: Vec<u64>,
}

impl CpuMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: &[usize]) -> Self {
        let mut mask = Self::new();
        for &id in ids {
            mask.set(id);
        }
        mask
    }

    pub fn set(&mut self, cpu: usize) {
        let word = cpu / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (cpu % 64);
    }

    pub fn is_set(&self, cpu: usize) -> bool {
        self.words
            .get(cpu / 64)
            .is_some_and(|word| word & (1u64 << (cpu % 64)) != 0)
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Mask as a single u64, if no CPU above 63 is set
    pub fn as_u64(&self) -> Option<u64> {
        if self.words.iter().skip(1).any(|&w| w != 0) {
            return None;
        }
        Some(self.words.first().copied().unwrap_or(0))
    }

    /// `0x`-prefixed lowercase hex, most significant word first
    pub fn to_hex(&self) -> String {
        let Some(top) = self.words.iter().rposition(|&w| w != 0) else {
            return "0x0".to_string();
        };
        let mut hex = format!("0x{:x}", self.words[top]);
        for word in self.words[..top].iter().rev() {
            hex.push_str(&format!("{:016x}", word));
        }
        hex
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Ordered CPU selection for one benchmark run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityPlan {
    pub selected_logical_ids: Vec<usize>,
    pub bitmask: CpuMask,
}

impl AffinityPlan {
    pub fn len(&self) -> usize {
        self.selected_logical_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_logical_ids.is_empty()
    }

    /// Value handed to the benchmark binary's affinity flag
    pub fn affinity_arg(&self) -> String {
        self.bitmask.to_hex()
    }
}

/// Spreads worker threads over physical cores first, round-robin across
/// last-level-cache domains, then over SMT siblings.
#[derive(Debug, Clone)]
pub struct AffinityPlanner<'a> {
    topology: &'a [CpuTopologyEntry],
}

impl<'a> AffinityPlanner<'a> {
    pub fn new(topology: &'a [CpuTopologyEntry]) -> Result<Self, AffinityError> {
        if topology.is_empty() {
            return Err(AffinityError::InvalidTopology {
                reason: "topology is empty".to_string(),
            });
        }

        let mut ids = HashSet::with_capacity(topology.len());
        for entry in topology {
            if !ids.insert(entry.logical_id) {
                return Err(AffinityError::InvalidTopology {
                    reason: format!("logical CPU {} listed more than once", entry.logical_id),
                });
            }
        }

        Ok(Self { topology })
    }

    /// Select `num_threads` logical CPUs. Zero is treated as one.
    pub fn plan(&self, num_threads: usize) -> AffinityPlan {
        let target = num_threads.max(1).min(self.topology.len());

        // First logical CPU seen for each (domain, core) is the primary
        let mut seen = HashSet::new();
        let mut primaries = Vec::new();
        let mut siblings = Vec::new();
        for entry in self.topology {
            if seen.insert((entry.llc_domain_id, entry.core_id)) {
                primaries.push(*entry);
            } else {
                siblings.push(entry.logical_id);
            }
        }
        primaries.sort_by_key(|e| (e.llc_domain_id, e.logical_id));

        let mut queues: BTreeMap<usize, VecDeque<usize>> = BTreeMap::new();
        for entry in &primaries {
            queues
                .entry(entry.llc_domain_id)
                .or_default()
                .push_back(entry.logical_id);
        }

        let mut selected = Vec::with_capacity(target);
        let mut taken = HashSet::with_capacity(target);

        while selected.len() < target {
            let mut progressed = false;
            for queue in queues.values_mut() {
                if selected.len() == target {
                    break;
                }
                if let Some(id) = queue.pop_front() {
                    selected.push(id);
                    taken.insert(id);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        siblings.sort_unstable();
        for id in siblings {
            if selected.len() == target {
                break;
            }
            if taken.insert(id) {
                selected.push(id);
            }
        }

        let bitmask = CpuMask::from_ids(&selected);
        AffinityPlan {
            selected_logical_ids: selected,
            bitmask,
        }
    }
}

/// Convenience wrapper around [`AffinityPlanner`]
pub fn plan_affinity(
    topology: &[CpuTopologyEntry],
    num_threads: usize,
) -> Result<AffinityPlan, AffinityError> {
    Ok(AffinityPlanner::new(topology)?.plan(num_threads))
}

// Changelog:
// - v1.0.0 (2026-10-18): Initial affinity planner.
//   - Primary-per-core selection with round-robin over LLC domains.
//   - SMT siblings fill the remainder in ascending logical id order.
//   - CpuMask supports more than 64 logical CPUs.
