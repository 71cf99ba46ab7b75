// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/affinity_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for the affinity planner: physical cores before
// SMT siblings, round-robin over last-level-cache domains, bitmask rendering
// and topology validation.
//
// Tree Location:
// - tests/affinity_test.rs (affinity planner tests)
// - Depends on: powbench

#[cfg(test)]
mod tests {
    use powbench::topology::{
        AffinityError, AffinityPlanner, CpuMask, CpuTopologyEntry, plan_affinity,
    };
    use std::collections::HashSet;

    // 4 cores x 2 SMT; cores 0-1 on LLC 0, cores 2-3 on LLC 1; siblings adjacent
    fn two_domain_topology() -> Vec<CpuTopologyEntry> {
        (0..8)
            .map(|cpu| CpuTopologyEntry::new(cpu, cpu / 2, if cpu < 4 { 0 } else { 1 }))
            .collect()
    }

    // 4 cores x 2 SMT, single LLC, Linux numbering (siblings at +4)
    fn single_domain_topology() -> Vec<CpuTopologyEntry> {
        (0..8)
            .map(|cpu| CpuTopologyEntry::new(cpu, cpu % 4, 0))
            .collect()
    }

    #[test]
    fn test_round_robin_across_domains() {
        let plan = plan_affinity(&two_domain_topology(), 4).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![0, 4, 2, 6]);
        assert_eq!(plan.affinity_arg(), "0x55");
    }

    #[test]
    fn test_siblings_fill_after_primaries() {
        let plan = plan_affinity(&two_domain_topology(), 6).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![0, 4, 2, 6, 1, 3]);
        assert_eq!(plan.affinity_arg(), "0x5f");
    }

    #[test]
    fn test_single_thread_picks_lowest_primary_of_first_domain() {
        let plan = plan_affinity(&two_domain_topology(), 1).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![0]);
        assert_eq!(plan.affinity_arg(), "0x1");
    }

    #[test]
    fn test_zero_threads_clamped_to_one() {
        let plan = plan_affinity(&two_domain_topology(), 0).expect("valid topology");
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_single_domain_cores_then_siblings() {
        let plan = plan_affinity(&single_domain_topology(), 6).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_more_threads_than_cpus_selects_all() {
        let topology = two_domain_topology();
        let plan = plan_affinity(&topology, 32).expect("valid topology");
        assert_eq!(plan.len(), topology.len());
        assert_eq!(plan.affinity_arg(), "0xff");
    }

    #[test]
    fn test_plan_properties_hold_for_every_count() {
        let topology = two_domain_topology();
        let planner = AffinityPlanner::new(&topology).expect("valid topology");
        for n in 1..=10 {
            let plan = planner.plan(n);
            assert_eq!(plan.len(), n.min(topology.len()), "length for n={}", n);

            let unique: HashSet<_> = plan.selected_logical_ids.iter().collect();
            assert_eq!(unique.len(), plan.len(), "duplicates for n={}", n);

            assert_eq!(plan.bitmask.count_ones() as usize, plan.len());
            for id in &plan.selected_logical_ids {
                assert!(plan.bitmask.is_set(*id));
            }
        }
    }

    #[test]
    fn test_primaries_before_any_sibling() {
        let topology = two_domain_topology();
        let plan = plan_affinity(&topology, 4).expect("valid topology");
        let cores: HashSet<_> = plan
            .selected_logical_ids
            .iter()
            .map(|id| topology[*id].core_id)
            .collect();
        assert_eq!(cores.len(), 4, "each selected CPU should be on its own core");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let topology = two_domain_topology();
        let planner = AffinityPlanner::new(&topology).expect("valid topology");
        assert_eq!(planner.plan(5), planner.plan(5));
    }

    #[test]
    fn test_first_listed_sibling_is_primary() {
        let mut shuffled = two_domain_topology();
        shuffled.reverse();
        // With reversed input the highest sibling of each core becomes primary
        let plan = plan_affinity(&shuffled, 4).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![1, 5, 3, 7]);
    }

    #[test]
    fn test_uneven_domains() {
        // LLC 0 has three cores, LLC 1 a single core
        let topology = vec![
            CpuTopologyEntry::new(0, 0, 0),
            CpuTopologyEntry::new(1, 1, 0),
            CpuTopologyEntry::new(2, 2, 0),
            CpuTopologyEntry::new(3, 3, 1),
        ];
        let plan = plan_affinity(&topology, 4).expect("valid topology");
        assert_eq!(plan.selected_logical_ids, vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_empty_topology_is_invalid() {
        let err = plan_affinity(&[], 4).unwrap_err();
        assert!(matches!(err, AffinityError::InvalidTopology { .. }));
    }

    #[test]
    fn test_duplicate_logical_id_is_invalid() {
        let topology = vec![
            CpuTopologyEntry::new(0, 0, 0),
            CpuTopologyEntry::new(0, 1, 0),
        ];
        assert!(matches!(
            AffinityPlanner::new(&topology),
            Err(AffinityError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_mask_wider_than_64_cpus() {
        let topology: Vec<_> = (0..130).map(|cpu| CpuTopologyEntry::new(cpu, cpu, 0)).collect();
        let plan = plan_affinity(&topology, 65).expect("valid topology");
        assert_eq!(plan.affinity_arg(), "0x1ffffffffffffffff");
        assert_eq!(plan.bitmask.as_u64(), None);

        let full = plan_affinity(&topology, 130).expect("valid topology");
        assert_eq!(
            full.affinity_arg(),
            "0x3ffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn test_cpu_mask_basics() {
        let mask = CpuMask::from_ids(&[1, 3]);
        assert_eq!(mask.to_hex(), "0xa");
        assert_eq!(mask.as_u64(), Some(0xa));
        assert_eq!(mask.to_string(), "0xa");
        assert_eq!(CpuMask::new().to_hex(), "0x0");

        let high = CpuMask::from_ids(&[64]);
        assert_eq!(high.to_hex(), "0x10000000000000000");
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Affinity planner tests.
//   - Spread across LLC domains, SMT fill, clamping, masks over 64 CPUs.
