// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/tuning_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for host tuning: CPU identification, MSR preset
// selection, masked register writes with restore, and huge page reservation.
// Register writes go to fake /dev/cpu/N/msr files in a temporary directory.

#[cfg(test)]
mod tests {
    use powbench::tuning::msr::masked_value;
    use powbench::tuning::{
        CpuIdentity, CpuVendor, MsrPreset, TuningError, required_huge_pages, reserve_huge_pages,
    };
    use std::fs;
    use tempfile::tempdir;

    fn amd(family: u32, model: u32) -> CpuIdentity {
        CpuIdentity {
            vendor: CpuVendor::Amd,
            family,
            model,
        }
    }

    #[test]
    fn test_cpu_identity_from_cpuinfo() {
        let cpuinfo = "processor\t: 0\n\
                       vendor_id\t: AuthenticAMD\n\
                       cpu family\t: 25\n\
                       model\t\t: 33\n\
                       model name\t: AMD Ryzen 9 5950X 16-Core Processor\n\
                       \n\
                       processor\t: 1\n\
                       vendor_id\t: AuthenticAMD\n";
        let identity = CpuIdentity::from_cpuinfo(cpuinfo).expect("cpuinfo should parse");
        assert_eq!(identity, amd(0x19, 0x21));
    }

    #[test]
    fn test_cpu_identity_incomplete() {
        assert_eq!(CpuIdentity::from_cpuinfo("vendor_id : GenuineIntel\n"), None);
    }

    #[test]
    fn test_preset_selection() {
        let intel = CpuIdentity {
            vendor: CpuVendor::Intel,
            family: 6,
            model: 0x97,
        };
        assert_eq!(MsrPreset::for_cpu(&intel), Some(MsrPreset::Intel));
        assert_eq!(MsrPreset::for_cpu(&amd(0x17, 0x71)), Some(MsrPreset::Ryzen17h));
        assert_eq!(MsrPreset::for_cpu(&amd(0x19, 0x21)), Some(MsrPreset::Ryzen19h));
        assert_eq!(MsrPreset::for_cpu(&amd(0x19, 0x61)), Some(MsrPreset::Ryzen19hZen4));
        assert_eq!(MsrPreset::for_cpu(&amd(0x19, 0x11)), Some(MsrPreset::Ryzen19hZen4));
        assert_eq!(MsrPreset::for_cpu(&amd(0x1a, 0x44)), Some(MsrPreset::Ryzen1Ah));
        assert_eq!(MsrPreset::for_cpu(&amd(0x15, 0x02)), None);

        let other = CpuIdentity {
            vendor: CpuVendor::Other,
            family: 7,
            model: 1,
        };
        assert_eq!(MsrPreset::for_cpu(&other), None);
    }

    #[test]
    fn test_zen5_reuses_zen4_registers() {
        assert_eq!(MsrPreset::Ryzen1Ah.items(), MsrPreset::Ryzen19hZen4.items());
        assert_eq!(MsrPreset::Intel.items().len(), 1);
        assert_eq!(MsrPreset::Intel.items()[0].register, 0x1a4);
    }

    #[test]
    fn test_masked_value_keeps_bits_outside_mask() {
        assert_eq!(masked_value(0xffff, 0x40, !0x20), 0x60);
        assert_eq!(masked_value(0x0, 0xff, !0x20), 0xdf);
        assert_eq!(masked_value(0x20, 0x0, !0x20), 0x20);
    }

    #[test]
    fn test_masked_item_effective_value() {
        let item = MsrPreset::Ryzen17h
            .items()
            .iter()
            .find(|i| i.mask.is_some())
            .expect("17h preset has a masked register");
        assert_eq!(item.register, 0xc001_1021);
        // Bit 5 of the current value survives, the rest comes from the preset
        assert_eq!(item.effective_value(0x20), 0x60);
        assert_eq!(item.effective_value(0x0), 0x40);
    }

    #[test]
    fn test_required_huge_pages() {
        assert_eq!(required_huge_pages(0), 1168);
        assert_eq!(required_huge_pages(8), 1176);
    }

    #[test]
    fn test_reserve_huge_pages_raises_reservation() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("nr_hugepages");
        fs::write(&path, "128\n").expect("write");

        let reserved = reserve_huge_pages(&path, 1176).expect("reservation should succeed");
        assert_eq!(reserved, 1176);
        assert_eq!(fs::read_to_string(&path).expect("read").trim(), "1176");
    }

    #[test]
    fn test_reserve_huge_pages_never_lowers() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("nr_hugepages");
        fs::write(&path, "4096\n").expect("write");

        let reserved = reserve_huge_pages(&path, 1176).expect("reservation should succeed");
        assert_eq!(reserved, 4096);
        assert_eq!(fs::read_to_string(&path).expect("read").trim(), "4096");
    }

    #[test]
    fn test_reserve_huge_pages_errors() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let missing = dir.path().join("missing");
        assert!(matches!(
            reserve_huge_pages(&missing, 10),
            Err(TuningError::Io { .. })
        ));

        let garbage = dir.path().join("garbage");
        fs::write(&garbage, "lots\n").expect("write");
        assert!(matches!(
            reserve_huge_pages(&garbage, 10),
            Err(TuningError::Parse { .. })
        ));
    }

    #[cfg(unix)]
    mod msr_device {
        use powbench::tuning::{MsrPreset, TuningError, apply_preset};
        use std::fs;
        use std::os::unix::fs::FileExt;
        use std::path::Path;
        use tempfile::tempdir;

        const INTEL_REGISTER: u64 = 0x1a4;

        fn create_device(root: &Path, cpu: usize, initial: u64) {
            let dir = root.join(cpu.to_string());
            fs::create_dir_all(&dir).expect("create cpu dir");
            let file = fs::File::create(dir.join("msr")).expect("create msr file");
            file.set_len(4096).expect("size msr file");
            file.write_all_at(&initial.to_le_bytes(), INTEL_REGISTER)
                .expect("seed register");
        }

        fn read_register(root: &Path, cpu: usize) -> u64 {
            let file = fs::File::open(root.join(cpu.to_string()).join("msr")).expect("open msr");
            let mut buf = [0u8; 8];
            file.read_exact_at(&mut buf, INTEL_REGISTER).expect("read register");
            u64::from_le_bytes(buf)
        }

        #[test]
        fn test_apply_and_restore_intel_preset() {
            let root = tempdir().expect("Failed to create temporary directory");
            create_device(root.path(), 0, 0x0);
            create_device(root.path(), 1, 0x3);

            let session = apply_preset(root.path(), MsrPreset::Intel, &[0, 1])
                .expect("preset should apply");
            assert_eq!(session.saved_registers(), 2);
            assert_eq!(session.preset(), MsrPreset::Intel);
            assert_eq!(read_register(root.path(), 0), 0xf);
            assert_eq!(read_register(root.path(), 1), 0xf);

            session.restore().expect("restore should succeed");
            assert_eq!(read_register(root.path(), 0), 0x0);
            assert_eq!(read_register(root.path(), 1), 0x3);
        }

        #[test]
        fn test_failed_apply_rolls_back() {
            let root = tempdir().expect("Failed to create temporary directory");
            create_device(root.path(), 0, 0x7);
            // cpu1 has no device node

            let result = apply_preset(root.path(), MsrPreset::Intel, &[0, 1]);
            assert!(matches!(result, Err(TuningError::Io { .. })));
            assert_eq!(read_register(root.path(), 0), 0x7);
        }
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Tuning tests.
//   - Preset selection, masked writes and huge pages.
//   - Fake msr device apply, restore and rollback.
