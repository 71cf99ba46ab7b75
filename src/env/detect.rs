// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/env/detect.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Host environment detection: OS family, distribution, CPU identity,
// memory, privilege level and package manager. The snapshot is logged at
// startup and stored in the results file.

use super::packages::PackageManager;
use crate::utils::{FormatUtils, is_privileged};
use log::info;
use serde::{Deserialize, Serialize};
use sysinfo::System;

const LOG_TARGET: &str = "powbench::env";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Windows,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEnvironment {
    pub os: OsFamily,
    pub os_version: Option<String>,
    pub distro: Option<String>,
    pub kernel: Option<String>,
    pub hostname: Option<String>,
    pub cpu_brand: String,
    pub cpu_vendor: String,
    pub logical_cpus: usize,
    pub physical_cores: usize,
    pub total_memory_bytes: u64,
    pub is_privileged: bool,
    pub package_manager: Option<PackageManager>,
}

impl HostEnvironment {
    pub fn detect() -> Self {
        let os = OsFamily::current();

        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let (cpu_brand, cpu_vendor) = sys
            .cpus()
            .first()
            .map(|cpu| (cpu.brand().trim().to_string(), cpu.vendor_id().to_string()))
            .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));

        let distro = if os == OsFamily::Linux {
            std::fs::read_to_string("/etc/os-release")
                .ok()
                .and_then(|content| parse_os_release_id(&content))
        } else {
            None
        };

        Self {
            os,
            os_version: System::long_os_version(),
            distro,
            kernel: System::kernel_version(),
            hostname: System::host_name(),
            cpu_brand,
            cpu_vendor,
            logical_cpus: num_cpus::get(),
            physical_cores: num_cpus::get_physical(),
            total_memory_bytes: sys.total_memory(),
            is_privileged: is_privileged(),
            package_manager: PackageManager::detect(os),
        }
    }

    pub fn log_summary(&self) {
        info!(target: LOG_TARGET, "🖥️ OS: {} ({})",
            self.os_version.as_deref().unwrap_or("unknown"),
            self.distro.as_deref().unwrap_or("-")
        );
        info!(target: LOG_TARGET, "🧠 CPU: {} [{}]", self.cpu_brand, self.cpu_vendor);
        info!(target: LOG_TARGET, "🧵 Cores: {} physical / {} logical", self.physical_cores, self.logical_cpus);
        info!(target: LOG_TARGET, "💾 Memory: {}", FormatUtils::format_bytes(self.total_memory_bytes));
        info!(target: LOG_TARGET, "🔑 Privileged: {}", if self.is_privileged { "yes" } else { "no" });
        match self.package_manager {
            Some(pm) => info!(target: LOG_TARGET, "📦 Package manager: {}", pm.executable()),
            None => info!(target: LOG_TARGET, "📦 Package manager: none detected"),
        }
    }
}

/// `ID=` value of an os-release file, unquoted
pub fn parse_os_release_id(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("ID="))
        .map(|value| value.trim().trim_matches('"').trim_matches('\'').to_string())
        .find(|value| !value.is_empty())
}


// Changelog:
// - v1.0.0 (2026-10-18): Host detection.
//   - OS, distro, CPU brand and vendor, core counts, memory, privilege, package manager.
