// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/telemetry/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file declares the telemetry module (per-run energy measurement).

pub mod energy;

pub use energy::{ActiveMeasurement, EnergyMeter, RaplMeter, energy_delta, parse_power_log};

// Changelog:
// - v1.0.0 (2026-10-18): Telemetry module.
//   - Re-exports the energy meters and Power Gadget log parser.
