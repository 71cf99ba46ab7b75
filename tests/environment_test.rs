// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/environment_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for package manager mappings, build output
// discovery and command-line validation.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use powbench::build::{BENCHMARK_BINARY, locate_binary};
    use powbench::core::{Args, Variant};
    use powbench::env::{Dependency, OsFamily, PackageManager};
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("powbench").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_package_names() {
        assert_eq!(
            PackageManager::Apt.packages_for(Dependency::Compiler),
            &["build-essential"]
        );
        assert_eq!(PackageManager::Dnf.packages_for(Dependency::Compiler), &["gcc-c++"]);
        assert_eq!(PackageManager::Pacman.packages_for(Dependency::Git), &["git"]);
        assert_eq!(
            PackageManager::Winget.packages_for(Dependency::Cmake),
            &["Kitware.CMake"]
        );
        assert!(PackageManager::Winget.packages_for(Dependency::Make).is_empty());
    }

    #[test]
    fn test_apt_install_commands() {
        let commands = PackageManager::Apt.install_commands(&["git", "cmake"]);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], ["apt-get", "update"]);
        assert_eq!(commands[1], ["apt-get", "install", "-y", "git", "cmake"]);
    }

    #[test]
    fn test_winget_installs_one_package_per_command() {
        let commands = PackageManager::Winget.install_commands(&["Git.Git", "Kitware.CMake"]);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1][3], "Kitware.CMake");
        assert!(commands.iter().all(|c| c[0] == "winget"));
    }

    #[test]
    fn test_windows_does_not_require_make() {
        assert!(!Dependency::required_for(OsFamily::Windows).contains(&Dependency::Make));
        assert!(Dependency::required_for(OsFamily::Linux).contains(&Dependency::Make));
    }

    #[test]
    fn test_locate_binary() {
        let build = tempdir().expect("Failed to create temporary directory");
        assert_eq!(locate_binary(build.path()), None);

        let binary = build.path().join(BENCHMARK_BINARY);
        fs::write(&binary, b"").expect("write binary");
        assert_eq!(locate_binary(build.path()), Some(binary));
    }

    #[test]
    fn test_default_args_are_valid() {
        let args = parse(&[]);
        assert_eq!(args.repetitions, 3);
        assert_eq!(args.threads, 0);
        assert!(args.validate().is_ok());
        assert!(args.variant_flags(Variant::V1).is_empty());
        assert_eq!(args.variant_flags(Variant::V2), vec!["--v2".to_string()]);
    }

    #[test]
    fn test_variant_flags_are_split() {
        let args = parse(&["--v1-flags", "--ssse3 --softAes", "--v2-flags", "--v2 --avx2"]);
        assert_eq!(args.variant_flags(Variant::V1), vec!["--ssse3", "--softAes"]);
        assert_eq!(args.variant_flags(Variant::V2), vec!["--v2", "--avx2"]);
    }

    #[test]
    fn test_invalid_args() {
        assert!(parse(&["--repetitions", "0"]).validate().is_err());
        assert!(parse(&["--repetitions", "101"]).validate().is_err());
        assert!(parse(&["--nonces", "0"]).validate().is_err());
        assert!(parse(&["--threads", "4096"]).validate().is_err());
        assert!(parse(&["--binary", "/definitely/not/here"]).validate().is_err());
        assert!(parse(&["--repo-url", "RandomX"]).validate().is_err());
    }

    #[test]
    fn test_report_only_skips_validation() {
        let args = parse(&["--report-only", "results.json", "--repetitions", "0"]);
        assert!(args.validate().is_ok());
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Environment and CLI tests.
//   - Package names, install commands, binary discovery and argument validation.
