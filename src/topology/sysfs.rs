// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/topology/sysfs.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Reads per-CPU core ids and last-level-cache sharing from the Linux sysfs
// CPU tree. Hosts without sysfs get a synthetic single-domain topology built
// from the logical/physical CPU counts.

use super::affinity::{AffinityError, CpuTopologyEntry};
use super::{LlcDomain, SystemTopology};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const LOG_TARGET: &str = "powbench::topology";

pub const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";

/// Detect the topology of the running host
pub fn detect_topology() -> Result<SystemTopology, AffinityError> {
    let root = Path::new(SYSFS_CPU_ROOT);
    if root.is_dir() {
        match read_topology_from(root) {
            Ok(topology) => return Ok(topology),
            Err(e) => warn!(target: LOG_TARGET, "⚠️ sysfs topology unusable ({}), using CPU counts", e),
        }
    }
    synthetic_topology(num_cpus::get(), num_cpus::get_physical())
}

/// Read the topology below a sysfs-style CPU directory
pub fn read_topology_from(root: &Path) -> Result<SystemTopology, AffinityError> {
    let mut cpus = Vec::new();
    let entries = fs::read_dir(root).map_err(|e| AffinityError::InvalidTopology {
        reason: format!("cannot list {}: {}", root.display(), e),
    })?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(id) = name
            .to_str()
            .and_then(|n| n.strip_prefix("cpu"))
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };
        let dir = entry.path();
        if read_trimmed(&dir.join("online")).as_deref() == Some("0") {
            debug!(target: LOG_TARGET, "cpu{} offline, skipped", id);
            continue;
        }
        cpus.push(id);
    }
    cpus.sort_unstable();

    if cpus.is_empty() {
        return Err(AffinityError::InvalidTopology {
            reason: format!("no cpuN entries below {}", root.display()),
        });
    }

    // Domain key is the lowest CPU sharing the LLC
    let mut domain_keys: BTreeMap<usize, Option<u64>> = BTreeMap::new();
    let mut raw = Vec::with_capacity(cpus.len());
    for &cpu in &cpus {
        let dir = root.join(format!("cpu{}", cpu));
        let core_id = read_usize(&dir.join("topology/core_id")).unwrap_or(cpu);
        let package_id = read_usize(&dir.join("topology/physical_package_id")).unwrap_or(0);
        let llc = read_llc(&dir)?;
        let key = llc.as_ref().map(|(key, _)| *key);
        if let Some((key, size)) = llc {
            let slot = domain_keys.entry(key).or_insert(None);
            if slot.is_none() {
                *slot = size;
            }
        }
        // core ids restart on every package
        raw.push((cpu, (package_id << 16) | core_id, key));
    }

    let dense: BTreeMap<usize, usize> = domain_keys
        .keys()
        .enumerate()
        .map(|(dense, key)| (*key, dense))
        .collect();

    let entries = raw
        .into_iter()
        .map(|(cpu, core, key)| {
            let domain = key.and_then(|k| dense.get(&k).copied()).unwrap_or(0);
            CpuTopologyEntry::new(cpu, core, domain)
        })
        .collect();

    let mut llc_domains: Vec<LlcDomain> = domain_keys
        .values()
        .enumerate()
        .map(|(id, size)| LlcDomain {
            id,
            size_bytes: *size,
        })
        .collect();
    if llc_domains.is_empty() {
        llc_domains.push(LlcDomain {
            id: 0,
            size_bytes: None,
        });
    }

    Ok(SystemTopology {
        entries,
        llc_domains,
    })
}

/// Single-domain topology with siblings numbered adjacently (Windows order)
pub fn synthetic_topology(logical: usize, physical: usize) -> Result<SystemTopology, AffinityError> {
    if logical == 0 {
        return Err(AffinityError::InvalidTopology {
            reason: "no logical CPUs reported".to_string(),
        });
    }
    let physical = physical.clamp(1, logical);
    let smt = logical.div_ceil(physical);
    let entries = (0..logical)
        .map(|cpu| CpuTopologyEntry::new(cpu, cpu / smt, 0))
        .collect();
    Ok(SystemTopology {
        entries,
        llc_domains: vec![LlcDomain {
            id: 0,
            size_bytes: None,
        }],
    })
}

/// Highest-level data/unified cache of a CPU: (lowest sharing CPU, size)
fn read_llc(cpu_dir: &Path) -> Result<Option<(usize, Option<u64>)>, AffinityError> {
    let Ok(indexes) = fs::read_dir(cpu_dir.join("cache")) else {
        return Ok(None);
    };

    let mut best: Option<(u32, usize, Option<u64>)> = None;
    for index in indexes.flatten() {
        let path = index.path();
        let is_index = index
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with("index"));
        if !is_index {
            continue;
        }
        if read_trimmed(&path.join("type")).as_deref() == Some("Instruction") {
            continue;
        }
        let Some(level) = read_trimmed(&path.join("level")).and_then(|l| l.parse::<u32>().ok())
        else {
            continue;
        };
        let Some(list) = read_trimmed(&path.join("shared_cpu_list")) else {
            continue;
        };
        let shared = parse_cpu_list(&list)?;
        let Some(&lowest) = shared.iter().min() else {
            continue;
        };
        let size = read_trimmed(&path.join("size")).and_then(|s| parse_cache_size(&s));
        if best.is_none_or(|(best_level, _, _)| level > best_level) {
            best = Some((level, lowest, size));
        }
    }

    Ok(best.map(|(_, key, size)| (key, size)))
}

/// Parse a kernel CPU list such as `0-3,8-11,16`
pub fn parse_cpu_list(input: &str) -> Result<Vec<usize>, AffinityError> {
    let err = || AffinityError::InvalidCpuList {
        input: input.to_string(),
    };
    let mut cpus = Vec::new();
    for part in input.trim().split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().map_err(|_| err())?;
                let end: usize = end.trim().parse().map_err(|_| err())?;
                if end < start {
                    return Err(err());
                }
                cpus.extend(start..=end);
            }
            None => cpus.push(part.trim().parse().map_err(|_| err())?),
        }
    }
    Ok(cpus)
}

/// Parse sysfs cache sizes (`32768K`, `32M`, `1024`) into bytes
pub fn parse_cache_size(input: &str) -> Option<u64> {
    let input = input.trim();
    let (digits, multiplier) = match input.chars().last()? {
        'K' | 'k' => (&input[..input.len() - 1], 1024),
        'M' | 'm' => (&input[..input.len() - 1], 1024 * 1024),
        'G' | 'g' => (&input[..input.len() - 1], 1024 * 1024 * 1024),
        _ => (input, 1),
    };
    digits.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn read_usize(path: &Path) -> Option<usize> {
    read_trimmed(path).and_then(|s| s.parse().ok())
}


// Changelog:
// - v1.0.0 (2026-10-18): sysfs topology discovery.
//   - Highest non-instruction cache defines the LLC domain; offline CPUs skipped.
//   - Synthetic single-domain fallback off Linux.
