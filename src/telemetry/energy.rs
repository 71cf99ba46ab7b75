// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/telemetry/energy.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Package energy measurement around a single benchmark run. Linux reads the
// RAPL powercap counter before and after the run; Windows runs the Intel
// Power Gadget logger alongside the benchmark and integrates its power
// samples. Hosts with neither report no energy.
//
// Tree Location:
// - src/telemetry/energy.rs (RAPL + Power Gadget energy meters)
// - Depends on: tokio, log, utils::process

use crate::utils::find_in_path;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

const LOG_TARGET: &str = "powbench::energy";

pub const RAPL_PACKAGE_DIR: &str = "/sys/class/powercap/intel-rapl:0";

const POWER_GADGET_EXE: &str = "PowerLog3.0.exe";
const POWER_GADGET_DEFAULT: &str = r"C:\Program Files\Intel\Power Gadget 3.6\PowerLog3.0.exe";

/// RAPL package-domain counter
#[derive(Debug, Clone)]
pub struct RaplMeter {
    energy_path: PathBuf,
    max_range_path: PathBuf,
}

impl RaplMeter {
    pub fn new(domain_dir: &Path) -> Self {
        Self {
            energy_path: domain_dir.join("energy_uj"),
            max_range_path: domain_dir.join("max_energy_range_uj"),
        }
    }

    /// Meter for the domain if its counter is readable
    pub fn probe(domain_dir: &Path) -> Option<Self> {
        let meter = Self::new(domain_dir);
        meter.read_energy_uj().map(|_| meter)
    }

    pub fn read_energy_uj(&self) -> Option<u64> {
        read_u64(&self.energy_path)
    }

    pub fn max_range_uj(&self) -> Option<u64> {
        read_u64(&self.max_range_path)
    }
}

/// Counter delta, accounting for a single wrap at `max_range`
pub fn energy_delta(start: u64, end: u64, max_range: Option<u64>) -> u64 {
    if end >= start {
        end - start
    } else {
        let max = max_range.unwrap_or(u64::MAX);
        max.saturating_sub(start).saturating_add(end)
    }
}

#[derive(Debug, Clone)]
pub enum EnergyMeter {
    Rapl(RaplMeter),
    PowerGadget { executable: PathBuf, log_dir: PathBuf },
    Unavailable,
}

impl EnergyMeter {
    /// Pick the best energy source on this host; Power Gadget logs land in `log_dir`
    pub fn detect(log_dir: &Path) -> Self {
        if cfg!(target_os = "linux") {
            if let Some(meter) = RaplMeter::probe(Path::new(RAPL_PACKAGE_DIR)) {
                info!(target: LOG_TARGET, "🔋 Energy source: RAPL ({})", RAPL_PACKAGE_DIR);
                return EnergyMeter::Rapl(meter);
            }
            warn!(target: LOG_TARGET, "⚠️ RAPL counter not readable (needs root on recent kernels); energy not recorded");
            return EnergyMeter::Unavailable;
        }

        if cfg!(windows) {
            let executable = find_in_path(POWER_GADGET_EXE).or_else(|| {
                let default = PathBuf::from(POWER_GADGET_DEFAULT);
                default.is_file().then_some(default)
            });
            if let Some(executable) = executable {
                info!(target: LOG_TARGET, "🔋 Energy source: Intel Power Gadget ({})", executable.display());
                return EnergyMeter::PowerGadget {
                    executable,
                    log_dir: log_dir.to_path_buf(),
                };
            }
            warn!(target: LOG_TARGET, "⚠️ Intel Power Gadget not found; energy not recorded");
        }

        EnergyMeter::Unavailable
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnergyMeter::Rapl(_) => "rapl",
            EnergyMeter::PowerGadget { .. } => "power-gadget",
            EnergyMeter::Unavailable => "none",
        }
    }

    /// Begin measuring; `label` names the Power Gadget log file
    pub async fn start(&self, label: &str) -> ActiveMeasurement {
        match self {
            EnergyMeter::Rapl(meter) => match meter.read_energy_uj() {
                Some(start_uj) => ActiveMeasurement::Rapl {
                    meter: meter.clone(),
                    start_uj,
                },
                None => ActiveMeasurement::Inactive,
            },
            EnergyMeter::PowerGadget {
                executable,
                log_dir,
            } => {
                let csv_path = log_dir.join(format!("{}-power.csv", label));
                let _ = tokio::fs::remove_file(&csv_path).await;
                let child = Command::new(executable)
                    .arg("-resolution")
                    .arg("100")
                    .arg("-duration")
                    .arg("86400")
                    .arg("-file")
                    .arg(&csv_path)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .spawn();
                match child {
                    Ok(child) => ActiveMeasurement::PowerGadget { child, csv_path },
                    Err(e) => {
                        warn!(target: LOG_TARGET, "⚠️ Failed to start Power Gadget logger: {}", e);
                        ActiveMeasurement::Inactive
                    }
                }
            }
            EnergyMeter::Unavailable => ActiveMeasurement::Inactive,
        }
    }
}

/// An in-flight energy measurement
#[derive(Debug)]
pub enum ActiveMeasurement {
    Rapl { meter: RaplMeter, start_uj: u64 },
    PowerGadget { child: Child, csv_path: PathBuf },
    Inactive,
}

impl ActiveMeasurement {
    /// Stop measuring; returns the energy consumed in microjoules
    pub async fn finish(self) -> Option<u64> {
        match self {
            ActiveMeasurement::Rapl { meter, start_uj } => {
                let end_uj = meter.read_energy_uj()?;
                Some(energy_delta(start_uj, end_uj, meter.max_range_uj()))
            }
            ActiveMeasurement::PowerGadget {
                mut child,
                csv_path,
            } => {
                if let Err(e) = child.kill().await {
                    debug!(target: LOG_TARGET, "Power Gadget logger already exited: {}", e);
                }
                let content = tokio::fs::read_to_string(&csv_path).await.ok()?;
                let joules = parse_power_log(&content)?;
                Some((joules * 1_000_000.0).round() as u64)
            }
            ActiveMeasurement::Inactive => None,
        }
    }
}

/// Energy (J) from a Power Gadget CSV log: the cumulative summary when
/// present, otherwise the integral of the sampled package power
pub fn parse_power_log(content: &str) -> Option<f64> {
    for line in content.lines() {
        if line.trim_start().starts_with("Cumulative Processor Energy_0 (Joules)") {
            if let Some(value) = line.split('=').nth(1).and_then(|v| v.trim().parse().ok()) {
                return Some(value);
            }
        }
    }

    let mut lines = content.lines();
    let header = lines.find(|l| l.contains("Elapsed Time (sec)"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let time_col = columns.iter().position(|c| *c == "Elapsed Time (sec)")?;
    let power_col = columns
        .iter()
        .position(|c| c.starts_with("Processor Power_0"))?;

    let mut joules = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    let mut samples = 0usize;
    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (Some(time), Some(power)) = (
            fields.get(time_col).and_then(|v| v.parse::<f64>().ok()),
            fields.get(power_col).and_then(|v| v.parse::<f64>().ok()),
        ) else {
            continue;
        };
        if let Some((prev_time, prev_power)) = previous {
            let dt = time - prev_time;
            if dt > 0.0 {
                joules += (power + prev_power) / 2.0 * dt;
            }
        }
        previous = Some((time, power));
        samples += 1;
    }

    (samples >= 2).then_some(joules)
}

fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_delta_without_wrap() {
        assert_eq!(energy_delta(1_000, 5_000, Some(10_000)), 4_000);
    }

    #[test]
    fn test_energy_delta_with_wrap() {
        assert_eq!(energy_delta(9_000, 500, Some(10_000)), 1_500);
    }

    #[test]
    fn test_parse_power_log_summary() {
        let log = "System Time,RDTSC,Elapsed Time (sec)\n\
                   \n\
                   Total Elapsed Time (sec) = 10.0\n\
                   Cumulative Processor Energy_0 (Joules) = 512.25\n";
        assert_eq!(parse_power_log(log), Some(512.25));
    }

    #[test]
    fn test_parse_power_log_integrates_samples() {
        let log = "System Time,RDTSC,Elapsed Time (sec),CPU Utilization(%),Processor Power_0 (Watt)\n\
                   10:00:00:000,1,0.000,50,100.0\n\
                   10:00:01:000,2,1.000,50,100.0\n\
                   10:00:02:000,3,2.000,50,200.0\n";
        let joules = parse_power_log(log).unwrap();
        assert!((joules - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_power_log_empty() {
        assert_eq!(parse_power_log(""), None);
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Package energy metering.
//   - RAPL counter sampling with wrap handling at max_energy_range_uj.
//   - Intel Power Gadget logger with summary or trapezoid integration.
