// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/topology_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for sysfs topology discovery against a fake
// /sys/devices/system/cpu tree, and for the cache-based thread heuristic.

#[cfg(test)]
mod tests {
    use powbench::topology::sysfs::synthetic_topology;
    use powbench::topology::{
        CpuTopologyEntry, LlcDomain, SystemTopology, read_topology_from, recommended_threads,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().expect("path has a parent")).expect("create dirs");
        fs::write(path, content).expect("write sysfs file");
    }

    fn add_cache(cpu_dir: &Path, index: u32, level: u32, kind: &str, shared: &str, size: &str) {
        let dir = cpu_dir.join("cache").join(format!("index{}", index));
        write(&dir.join("level"), &format!("{}\n", level));
        write(&dir.join("type"), &format!("{}\n", kind));
        write(&dir.join("shared_cpu_list"), &format!("{}\n", shared));
        write(&dir.join("size"), &format!("{}\n", size));
    }

    // 4 cores x 2 SMT (siblings at +4); cores 0-1 share one L3, cores 2-3 another
    fn fake_two_ccx_sysfs(l3_size: &str) -> TempDir {
        let root = tempdir().expect("Failed to create temporary directory");
        for cpu in 0..8usize {
            let dir = root.path().join(format!("cpu{}", cpu));
            let core = cpu % 4;
            write(&dir.join("topology/core_id"), &format!("{}\n", core));
            write(&dir.join("topology/physical_package_id"), "0\n");
            let l1_shared = format!("{},{}", core, core + 4);
            add_cache(&dir, 0, 1, "Data", &l1_shared, "32K");
            add_cache(&dir, 1, 1, "Instruction", &l1_shared, "32K");
            add_cache(&dir, 2, 2, "Unified", &l1_shared, "512K");
            let l3_shared = if core < 2 { "0-1,4-5" } else { "2-3,6-7" };
            add_cache(&dir, 3, 3, "Unified", l3_shared, l3_size);
        }
        // Non-CPU entries present in the real tree
        fs::create_dir_all(root.path().join("cpufreq")).expect("create cpufreq");
        write(&root.path().join("online"), "0-7\n");
        root
    }

    #[test]
    fn test_read_topology_groups_llc_domains() {
        let root = fake_two_ccx_sysfs("4096K");
        let topology = read_topology_from(root.path()).expect("topology should parse");

        assert_eq!(topology.logical_cpus(), 8);
        assert_eq!(topology.physical_cores(), 4);
        assert_eq!(topology.domain_count(), 2);
        assert_eq!(topology.llc_size(0), Some(4 * 1024 * 1024));

        let cpu2 = topology.entries.iter().find(|e| e.logical_id == 2).expect("cpu2");
        assert_eq!(cpu2.llc_domain_id, 1);
        let cpu5 = topology.entries.iter().find(|e| e.logical_id == 5).expect("cpu5");
        assert_eq!(cpu5.llc_domain_id, 0);
        assert_eq!(cpu5.core_id, 1);
    }

    #[test]
    fn test_sysfs_topology_plans_across_ccx() {
        let root = fake_two_ccx_sysfs("4096K");
        let topology = read_topology_from(root.path()).expect("topology should parse");
        let plan = topology.planner().expect("valid topology").plan(4);
        assert_eq!(plan.selected_logical_ids, vec![0, 2, 1, 3]);
        assert_eq!(plan.affinity_arg(), "0xf");
    }

    #[test]
    fn test_offline_cpu_is_skipped() {
        let root = fake_two_ccx_sysfs("4096K");
        write(&root.path().join("cpu7/online"), "0\n");
        let topology = read_topology_from(root.path()).expect("topology should parse");
        assert_eq!(topology.logical_cpus(), 7);
        assert!(topology.entries.iter().all(|e| e.logical_id != 7));
    }

    #[test]
    fn test_missing_cache_data_defaults_to_domain_zero() {
        let root = tempdir().expect("Failed to create temporary directory");
        for cpu in 0..4usize {
            let dir = root.path().join(format!("cpu{}", cpu));
            write(&dir.join("topology/core_id"), &format!("{}\n", cpu / 2));
        }
        let topology = read_topology_from(root.path()).expect("topology should parse");
        assert_eq!(topology.logical_cpus(), 4);
        assert_eq!(topology.physical_cores(), 2);
        assert!(topology.entries.iter().all(|e| e.llc_domain_id == 0));
        assert_eq!(topology.llc_size(0), None);
    }

    #[test]
    fn test_packages_do_not_merge_core_ids() {
        let root = tempdir().expect("Failed to create temporary directory");
        for cpu in 0..4usize {
            let dir = root.path().join(format!("cpu{}", cpu));
            write(&dir.join("topology/core_id"), &format!("{}\n", cpu % 2));
            write(
                &dir.join("topology/physical_package_id"),
                &format!("{}\n", cpu / 2),
            );
        }
        let topology = read_topology_from(root.path()).expect("topology should parse");
        assert_eq!(topology.physical_cores(), 4);
    }

    #[test]
    fn test_empty_sysfs_is_invalid() {
        let root = tempdir().expect("Failed to create temporary directory");
        assert!(read_topology_from(root.path()).is_err());
    }

    #[test]
    fn test_recommended_threads_limited_by_cache() {
        // 2 MiB of L3 per CCX -> one thread per CCX
        let root = fake_two_ccx_sysfs("2048K");
        let topology = read_topology_from(root.path()).expect("topology should parse");
        assert_eq!(recommended_threads(&topology), 2);
    }

    #[test]
    fn test_recommended_threads_limited_by_cores() {
        // 32 MiB per CCX would allow 16 threads but each CCX has 2 cores
        let root = fake_two_ccx_sysfs("32M");
        let topology = read_topology_from(root.path()).expect("topology should parse");
        assert_eq!(recommended_threads(&topology), 4);
    }

    #[test]
    fn test_recommended_threads_without_cache_size() {
        let topology = synthetic_topology(16, 8).expect("synthetic topology");
        assert_eq!(recommended_threads(&topology), 8);
    }

    #[test]
    fn test_recommended_threads_never_zero() {
        let topology = SystemTopology {
            entries: vec![CpuTopologyEntry::new(0, 0, 0)],
            llc_domains: vec![LlcDomain {
                id: 0,
                size_bytes: Some(512 * 1024),
            }],
        };
        assert_eq!(recommended_threads(&topology), 1);
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Topology tests against a fake sysfs tree.
//   - LLC grouping, offline CPUs, packages and the thread heuristic.
