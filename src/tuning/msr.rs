// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/tuning/msr.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Model-specific register presets for RandomX-style workloads. The preset is
// picked from the CPU vendor/family/model in /proc/cpuinfo and written to
// every logical CPU through /dev/cpu/N/msr. Original values are kept in an
// MsrSession so they can be written back once the benchmarks finish.
//
// Tree Location:
// - src/tuning/msr.rs (MSR presets, apply/restore)
// - Depends on: log, tuning::TuningError

use super::TuningError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "powbench::msr";

pub const MSR_DEVICE_ROOT: &str = "/dev/cpu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuVendor {
    Intel,
    Amd,
    Other,
}

/// Vendor, family and model as reported by /proc/cpuinfo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuIdentity {
    pub vendor: CpuVendor,
    pub family: u32,
    pub model: u32,
}

impl CpuIdentity {
    /// Parse the first processor block of /proc/cpuinfo
    pub fn from_cpuinfo(content: &str) -> Option<Self> {
        let mut vendor = None;
        let mut family = None;
        let mut model = None;

        for line in content.lines() {
            if line.trim().is_empty() && vendor.is_some() {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "vendor_id" => {
                    vendor = Some(match value {
                        "GenuineIntel" => CpuVendor::Intel,
                        "AuthenticAMD" | "HygonGenuine" => CpuVendor::Amd,
                        _ => CpuVendor::Other,
                    })
                }
                "cpu family" => family = value.parse().ok(),
                "model" => model = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self {
            vendor: vendor?,
            family: family?,
            model: model?,
        })
    }

    #[cfg(target_os = "linux")]
    pub fn detect() -> Option<Self> {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        Self::from_cpuinfo(&content)
    }

    #[cfg(not(target_os = "linux"))]
    pub fn detect() -> Option<Self> {
        None
    }
}

/// Register preset families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsrPreset {
    Intel,
    /// Zen / Zen+ / Zen2 (family 17h)
    Ryzen17h,
    /// Zen3 (family 19h)
    Ryzen19h,
    /// Zen4 (family 19h, Raphael/Genoa/Phoenix models)
    Ryzen19hZen4,
    /// Zen5 (family 1Ah)
    Ryzen1Ah,
}

/// One register write; with a mask only the masked bits are replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrItem {
    pub register: u32,
    pub value: u64,
    pub mask: Option<u64>,
}

impl MsrItem {
    const fn new(register: u32, value: u64) -> Self {
        Self {
            register,
            value,
            mask: None,
        }
    }

    const fn masked(register: u32, value: u64, mask: u64) -> Self {
        Self {
            register,
            value,
            mask: Some(mask),
        }
    }

    /// Value to write given the register's current content
    pub fn effective_value(&self, current: u64) -> u64 {
        match self.mask {
            Some(mask) => masked_value(current, self.value, mask),
            None => self.value,
        }
    }
}

pub const fn masked_value(current: u64, value: u64, mask: u64) -> u64 {
    (value & mask) | (current & !mask)
}

const INTEL_ITEMS: &[MsrItem] = &[MsrItem::new(0x1a4, 0xf)];

const RYZEN_17H_ITEMS: &[MsrItem] = &[
    MsrItem::new(0xc001_1020, 0),
    MsrItem::masked(0xc001_1021, 0x40, !0x20),
    MsrItem::new(0xc001_1022, 0x151_0000),
    MsrItem::new(0xc001_102b, 0x2000_cc16),
];

const RYZEN_19H_ITEMS: &[MsrItem] = &[
    MsrItem::new(0xc001_1020, 0x0004_4800_0000_0000),
    MsrItem::masked(0xc001_1021, 0x001c_0002_0000_0040, !0x20),
    MsrItem::new(0xc001_1022, 0xc000_0004_0157_0000),
    MsrItem::new(0xc001_102b, 0x2000_cc10),
];

const RYZEN_ZEN4_ITEMS: &[MsrItem] = &[
    MsrItem::new(0xc001_1020, 0x0004_4000_0000_0000),
    MsrItem::masked(0xc001_1021, 0x0004_0000_0000_0040, !0x20),
    MsrItem::new(0xc001_1022, 0x8680_0004_0157_0000),
    MsrItem::new(0xc001_102b, 0x2040_cc10),
];

impl MsrPreset {
    pub fn for_cpu(cpu: &CpuIdentity) -> Option<Self> {
        match cpu.vendor {
            CpuVendor::Intel => Some(MsrPreset::Intel),
            CpuVendor::Amd => match cpu.family {
                0x17 => Some(MsrPreset::Ryzen17h),
                0x19 => match cpu.model {
                    0x10..=0x1f | 0x60..=0x7f | 0xa0..=0xaf => Some(MsrPreset::Ryzen19hZen4),
                    _ => Some(MsrPreset::Ryzen19h),
                },
                0x1a => Some(MsrPreset::Ryzen1Ah),
                _ => None,
            },
            CpuVendor::Other => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            MsrPreset::Intel => "intel",
            MsrPreset::Ryzen17h => "ryzen_17h",
            MsrPreset::Ryzen19h => "ryzen_19h",
            MsrPreset::Ryzen19hZen4 => "ryzen_19h_zen4",
            MsrPreset::Ryzen1Ah => "ryzen_1ah_zen5",
        }
    }

    pub const fn items(&self) -> &'static [MsrItem] {
        match self {
            MsrPreset::Intel => INTEL_ITEMS,
            MsrPreset::Ryzen17h => RYZEN_17H_ITEMS,
            MsrPreset::Ryzen19h => RYZEN_19H_ITEMS,
            MsrPreset::Ryzen19hZen4 | MsrPreset::Ryzen1Ah => RYZEN_ZEN4_ITEMS,
        }
    }
}

/// Register values saved before a preset was applied
#[derive(Debug)]
pub struct MsrSession {
    preset: MsrPreset,
    device_root: PathBuf,
    saved: Vec<(usize, u32, u64)>,
}

impl MsrSession {
    pub fn preset(&self) -> MsrPreset {
        self.preset
    }

    pub fn saved_registers(&self) -> usize {
        self.saved.len()
    }

    /// Write the original values back, in reverse order
    pub fn restore(self) -> Result<(), TuningError> {
        let mut first_error = None;
        for (cpu, register, value) in self.saved.iter().rev() {
            if let Err(e) = write_msr(&self.device_root, *cpu, *register, *value) {
                warn!(target: LOG_TARGET, "⚠️ Failed to restore MSR {:#x} on cpu{}: {}", register, cpu, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                info!(target: LOG_TARGET, "♻️ Restored {} MSR values", self.saved.len());
                Ok(())
            }
        }
    }
}

/// Apply a preset to the given logical CPUs under a /dev/cpu-style root
pub fn apply_preset(
    device_root: &Path,
    preset: MsrPreset,
    cpus: &[usize],
) -> Result<MsrSession, TuningError> {
    let mut session = MsrSession {
        preset,
        device_root: device_root.to_path_buf(),
        saved: Vec::new(),
    };

    for &cpu in cpus {
        for item in preset.items() {
            let current = match read_msr(device_root, cpu, item.register) {
                Ok(value) => value,
                Err(e) => {
                    // Roll back what was already written
                    let _ = session.restore();
                    return Err(e);
                }
            };
            let value = item.effective_value(current);
            if let Err(e) = write_msr(device_root, cpu, item.register, value) {
                let _ = session.restore();
                return Err(e);
            }
            debug!(target: LOG_TARGET,
                "cpu{} MSR {:#x}: {:#018x} -> {:#018x}",
                cpu, item.register, current, value
            );
            session.saved.push((cpu, item.register, current));
        }
    }

    info!(target: LOG_TARGET,
        "⚙️ Applied MSR preset {} to {} CPUs",
        preset.name(),
        cpus.len()
    );
    Ok(session)
}

/// Detect the preset for this host and apply it to every logical CPU
#[cfg(target_os = "linux")]
pub async fn apply_host_preset(cpus: &[usize]) -> Result<Option<MsrSession>, TuningError> {
    let Some(identity) = CpuIdentity::detect() else {
        warn!(target: LOG_TARGET, "⚠️ Could not identify CPU; MSR tuning skipped");
        return Ok(None);
    };
    let Some(preset) = MsrPreset::for_cpu(&identity) else {
        info!(target: LOG_TARGET,
            "ℹ️ No MSR preset for {:?} family {:#x} model {:#x}",
            identity.vendor, identity.family, identity.model
        );
        return Ok(None);
    };

    let root = Path::new(MSR_DEVICE_ROOT);
    if !root.join("0/msr").exists() {
        crate::utils::run_command("modprobe", ["msr", "allow_writes=on"], None)
            .await
            .map_err(|e| TuningError::ModuleLoad {
                message: e.to_string(),
            })?;
    }

    apply_preset(root, preset, cpus).map(Some)
}

#[cfg(not(target_os = "linux"))]
pub async fn apply_host_preset(_cpus: &[usize]) -> Result<Option<MsrSession>, TuningError> {
    warn!(target: LOG_TARGET, "⚠️ MSR tuning requires a kernel driver on this OS; skipped");
    Err(TuningError::Unsupported {
        feature: "msr".to_string(),
    })
}

fn msr_path(root: &Path, cpu: usize) -> PathBuf {
    root.join(cpu.to_string()).join("msr")
}

#[cfg(unix)]
fn read_msr(root: &Path, cpu: usize, register: u32) -> Result<u64, TuningError> {
    use std::os::unix::fs::FileExt;
    let path = msr_path(root, cpu);
    let file = std::fs::File::open(&path).map_err(|e| TuningError::Io {
        path: path.clone(),
        source: e,
    })?;
    let mut buf = [0u8; 8];
    file.read_exact_at(&mut buf, u64::from(register))
        .map_err(|e| TuningError::Io { path, source: e })?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(unix)]
fn write_msr(root: &Path, cpu: usize, register: u32, value: u64) -> Result<(), TuningError> {
    use std::os::unix::fs::FileExt;
    let path = msr_path(root, cpu);
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(|e| TuningError::Io {
            path: path.clone(),
            source: e,
        })?;
    file.write_all_at(&value.to_le_bytes(), u64::from(register))
        .map_err(|e| TuningError::Io { path, source: e })
}

#[cfg(not(unix))]
fn read_msr(_root: &Path, _cpu: usize, _register: u32) -> Result<u64, TuningError> {
    Err(TuningError::Unsupported {
        feature: "msr".to_string(),
    })
}

#[cfg(not(unix))]
fn write_msr(_root: &Path, _cpu: usize, _register: u32, _value: u64) -> Result<(), TuningError> {
    Err(TuningError::Unsupported {
        feature: "msr".to_string(),
    })
}

// Changelog:
// - v1.0.0 (2026-10-18): MSR presets for Intel and AMD families 17h, 19h and 1Ah.
//   - Masked writes keep bits outside the preset mask.
//   - MsrSession restores saved values and rolls back partial applies.
