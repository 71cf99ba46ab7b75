// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/env/packages.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Build toolchain provisioning. Maps the logical dependencies (git, cmake,
// a C++ compiler, make) onto the package names and non-interactive install
// commands of each supported package manager.

use super::detect::{HostEnvironment, OsFamily};
use crate::utils::{find_in_path, run_command};
use anyhow::{Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "powbench::packages";

const VSWHERE_PATH: &str = r"C:\Program Files (x86)\Microsoft Visual Studio\Installer\vswhere.exe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Apk,
    Winget,
    Choco,
}

/// Tools the benchmark build needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Git,
    Cmake,
    Compiler,
    Make,
}

impl Dependency {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dependency::Git => "git",
            Dependency::Cmake => "cmake",
            Dependency::Compiler => "c++ compiler",
            Dependency::Make => "make",
        }
    }

    /// Executables any one of which satisfies the dependency
    pub const fn probes(&self) -> &'static [&'static str] {
        match self {
            Dependency::Git => &["git"],
            Dependency::Cmake => &["cmake"],
            Dependency::Compiler => &["c++", "g++", "clang++", "cl"],
            Dependency::Make => &["make", "ninja"],
        }
    }

    /// Dependencies required on an OS family
    pub fn required_for(os: OsFamily) -> Vec<Dependency> {
        match os {
            // MSBuild ships with the Visual Studio build tools
            OsFamily::Windows => vec![Dependency::Git, Dependency::Cmake, Dependency::Compiler],
            _ => vec![
                Dependency::Git,
                Dependency::Cmake,
                Dependency::Compiler,
                Dependency::Make,
            ],
        }
    }

    pub fn is_installed(&self) -> bool {
        if self.probes().iter().any(|p| find_in_path(p).is_some()) {
            return true;
        }
        // MSVC is not on PATH outside a developer prompt; CMake finds it via vswhere
        cfg!(windows) && *self == Dependency::Compiler && std::path::Path::new(VSWHERE_PATH).is_file()
    }
}

impl PackageManager {
    /// Detection order; the first one found on PATH wins
    pub const ALL: [PackageManager; 8] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Apk,
        PackageManager::Winget,
        PackageManager::Choco,
    ];

    pub const fn executable(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Apk => "apk",
            PackageManager::Winget => "winget",
            PackageManager::Choco => "choco",
        }
    }

    pub const fn is_windows(&self) -> bool {
        matches!(self, PackageManager::Winget | PackageManager::Choco)
    }

    pub fn detect(os: OsFamily) -> Option<PackageManager> {
        Self::ALL
            .into_iter()
            .filter(|pm| pm.is_windows() == (os == OsFamily::Windows))
            .find(|pm| find_in_path(pm.executable()).is_some())
    }

    /// Package names providing a dependency
    pub fn packages_for(&self, dep: Dependency) -> &'static [&'static str] {
        use Dependency::*;
        use PackageManager::*;
        match (self, dep) {
            (_, Git) if !self.is_windows() => &["git"],
            (_, Cmake) if !self.is_windows() => &["cmake"],
            (Apt, Compiler | Make) => &["build-essential"],
            (Dnf | Yum | Zypper, Compiler) => &["gcc-c++"],
            (Pacman, Compiler) => &["base-devel"],
            (Apk, Compiler) => &["build-base"],
            (Dnf | Yum | Zypper | Pacman | Apk, Make) => &["make"],
            (Winget, Git) => &["Git.Git"],
            (Winget, Cmake) => &["Kitware.CMake"],
            (Winget, Compiler) => &["Microsoft.VisualStudio.2022.BuildTools"],
            (Choco, Git) => &["git"],
            (Choco, Cmake) => &["cmake"],
            (Choco, Compiler) => &["visualstudio2022buildtools"],
            _ => &[],
        }
    }

    /// Commands (program + args) installing the given packages
    pub fn install_commands(&self, packages: &[&str]) -> Vec<Vec<String>> {
        let owned = |parts: &[&str]| -> Vec<String> {
            parts
                .iter()
                .copied()
                .chain(packages.iter().copied())
                .map(str::to_string)
                .collect()
        };
        match self {
            PackageManager::Apt => vec![
                vec!["apt-get".to_string(), "update".to_string()],
                owned(&["apt-get", "install", "-y"]),
            ],
            PackageManager::Dnf => vec![owned(&["dnf", "install", "-y"])],
            PackageManager::Yum => vec![owned(&["yum", "install", "-y"])],
            PackageManager::Pacman => vec![owned(&["pacman", "-S", "--needed", "--noconfirm"])],
            PackageManager::Zypper => vec![owned(&["zypper", "--non-interactive", "install"])],
            PackageManager::Apk => vec![owned(&["apk", "add", "--no-cache"])],
            PackageManager::Winget => packages
                .iter()
                .map(|pkg| {
                    [
                        "winget",
                        "install",
                        "--id",
                        *pkg,
                        "-e",
                        "--accept-package-agreements",
                        "--accept-source-agreements",
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
                })
                .collect(),
            PackageManager::Choco => vec![owned(&["choco", "install", "-y"])],
        }
    }
}

/// Dependencies missing from PATH
pub fn missing_dependencies(os: OsFamily) -> Vec<Dependency> {
    Dependency::required_for(os)
        .into_iter()
        .filter(|dep| !dep.is_installed())
        .collect()
}

/// Install whatever the build needs and is not yet on PATH
pub async fn ensure_dependencies(host: &HostEnvironment) -> Result<()> {
    let missing = missing_dependencies(host.os);
    if missing.is_empty() {
        info!(target: LOG_TARGET, "✅ Build toolchain present (git, cmake, compiler)");
        return Ok(());
    }

    let names: Vec<&str> = missing.iter().map(|d| d.as_str()).collect();
    info!(target: LOG_TARGET, "📦 Missing build dependencies: {}", names.join(", "));

    let Some(manager) = host.package_manager else {
        bail!(
            "no supported package manager found; install {} manually",
            names.join(", ")
        );
    };

    let mut packages: Vec<&str> = Vec::new();
    for dep in &missing {
        for pkg in manager.packages_for(*dep) {
            if !packages.contains(pkg) {
                packages.push(pkg);
            }
        }
    }

    let use_sudo = !host.is_privileged && !manager.is_windows() && find_in_path("sudo").is_some();
    if !host.is_privileged && !use_sudo {
        warn!(target: LOG_TARGET, "⚠️ Not running privileged; package installation may fail");
    }

    for command in manager.install_commands(&packages) {
        let (program, args) = if use_sudo {
            ("sudo", command.as_slice())
        } else {
            let Some((program, rest)) = command.split_first() else {
                continue;
            };
            (program.as_str(), rest)
        };
        run_command(program, args, None).await?;
    }

    let still_missing = missing_dependencies(host.os);
    if !still_missing.is_empty() {
        let names: Vec<&str> = still_missing.iter().map(|d| d.as_str()).collect();
        bail!("dependencies still missing after install: {}", names.join(", "));
    }

    info!(target: LOG_TARGET, "✅ Installed build dependencies via {}", manager.executable());
    Ok(())
}

// Changelog:
// - v1.0.0 (2026-10-18): Package manager mappings and dependency installation.
//   - Installs through sudo when unprivileged.
//   - MSVC counts as installed when vswhere is present.
