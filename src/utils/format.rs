// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/format.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file provides utility functions for formatting benchmark figures,
// located in the utils subdirectory. It formats hashrate, durations, energy,
// byte sizes and relative changes for the console report and logs.
//
// Tree Location:
// - src/utils/format.rs (formatting utilities)
// - Depends on: std

/// Utility functions for formatting benchmark statistics
pub struct FormatUtils;

impl FormatUtils {
    /// Format hashrate in appropriate units (H/s, KH/s, MH/s, GH/s)
    pub fn format_hashrate(hashrate: f64) -> String {
        if hashrate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", hashrate / 1_000_000_000.0)
        } else if hashrate >= 1_000_000.0 {
            format!("{:.2} MH/s", hashrate / 1_000_000.0)
        } else if hashrate >= 1_000.0 {
            format!("{:.2} KH/s", hashrate / 1_000.0)
        } else {
            format!("{:.2} H/s", hashrate)
        }
    }

    /// Format a wall time in seconds (12.34s, 2m 05.0s, 1h 02m)
    pub fn format_seconds(seconds: f64) -> String {
        if seconds < 60.0 {
            format!("{:.2}s", seconds)
        } else if seconds < 3600.0 {
            let minutes = (seconds / 60.0).floor();
            format!("{}m {:04.1}s", minutes as u64, seconds - minutes * 60.0)
        } else {
            let total = seconds as u64;
            format!("{}h {:02}m", total / 3600, (total % 3600) / 60)
        }
    }

    /// Format energy in J or kJ
    pub fn format_energy(joules: f64) -> String {
        if joules >= 1_000.0 {
            format!("{:.2} kJ", joules / 1_000.0)
        } else {
            format!("{:.1} J", joules)
        }
    }

    /// Format byte counts with binary suffixes
    pub fn format_bytes(bytes: u64) -> String {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        const MIB: f64 = 1024.0 * 1024.0;
        let value = bytes as f64;
        if value >= GIB {
            format!("{:.1} GiB", value / GIB)
        } else if value >= MIB {
            format!("{:.1} MiB", value / MIB)
        } else if bytes >= 1024 {
            format!("{:.1} KiB", value / 1024.0)
        } else {
            format!("{} B", bytes)
        }
    }

    /// Signed percentage (+1.23%, -0.50%)
    pub fn format_change(percent: f64) -> String {
        format!("{:+.2}%", percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hashrate_units() {
        assert_eq!(FormatUtils::format_hashrate(950.0), "950.00 H/s");
        assert_eq!(FormatUtils::format_hashrate(12_346.0), "12.35 KH/s");
        assert_eq!(FormatUtils::format_hashrate(2_500_000.0), "2.50 MH/s");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(FormatUtils::format_seconds(12.346), "12.35s");
        assert_eq!(FormatUtils::format_seconds(125.0), "2m 05.0s");
        assert_eq!(FormatUtils::format_seconds(3720.0), "1h 02m");
    }

    #[test]
    fn test_format_change_sign() {
        assert_eq!(FormatUtils::format_change(1.234), "+1.23%");
        assert_eq!(FormatUtils::format_change(-0.5), "-0.50%");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(FormatUtils::format_bytes(512), "512 B");
        assert_eq!(FormatUtils::format_bytes(32 * 1024 * 1024), "32.0 MiB");
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Reworked formatting helpers for benchmark reports.
//   - Kept hashrate formatting; added seconds, energy, bytes and change formatting.
