// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/benchmark/stats.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file aggregates run results into per-variant summaries and the v1/v2
// comparison shown in the report and stored in the results file.
//
// Tree Location:
// - src/benchmark/stats.rs (aggregation)
// - Depends on: serde, core::types

use crate::core::{RunResult, Variant};
use serde::{Deserialize, Serialize};

/// Descriptive statistics over a set of samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for a single sample
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl AggregateStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let stddev = if count > 1 {
            let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean,
            stddev,
            min,
            max,
            count,
        })
    }

    /// Standard deviation relative to the mean, in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.stddev / self.mean * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub variant: Variant,
    pub runs: usize,
    pub crashes: usize,
    pub hashrate: Option<AggregateStats>,
    pub energy_joules: Option<AggregateStats>,
    pub average_watts: Option<f64>,
    /// Mean hashrate over mean power draw
    pub hashes_per_joule: Option<f64>,
}

impl VariantSummary {
    pub fn from_runs(variant: Variant, runs: &[RunResult]) -> Self {
        let runs: Vec<&RunResult> = runs.iter().filter(|r| r.variant == variant).collect();
        let crashes = runs.iter().filter(|r| !r.succeeded()).count();

        let hashrates: Vec<f64> = runs
            .iter()
            .filter(|r| r.succeeded())
            .filter_map(|r| r.hashrate)
            .collect();
        let energies: Vec<f64> = runs
            .iter()
            .filter(|r| r.succeeded())
            .filter_map(|r| r.energy_joules())
            .collect();
        let watts: Vec<f64> = runs
            .iter()
            .filter(|r| r.succeeded())
            .filter_map(|r| r.average_watts())
            .collect();

        let hashrate = AggregateStats::from_samples(&hashrates);
        let average_watts = AggregateStats::from_samples(&watts).map(|s| s.mean);
        let hashes_per_joule = match (hashrate, average_watts) {
            (Some(h), Some(w)) if w > 0.0 => Some(h.mean / w),
            _ => None,
        };

        Self {
            variant,
            runs: runs.len(),
            crashes,
            hashrate,
            energy_joules: AggregateStats::from_samples(&energies),
            average_watts,
            hashes_per_joule,
        }
    }
}

/// Summaries for every variant, in `Variant::ALL` order
pub fn summarize(runs: &[RunResult]) -> Vec<VariantSummary> {
    Variant::ALL
        .iter()
        .map(|&variant| VariantSummary::from_runs(variant, runs))
        .collect()
}

/// Relative change from `baseline` to `value` in percent; 0 when the baseline is 0
pub fn percentage_change(baseline: f64, value: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (value - baseline) / baseline * 100.0
    }
}

/// v2 against v1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub hashrate_change_percent: f64,
    pub efficiency_change_percent: Option<f64>,
}

impl Comparison {
    pub fn between(v1: &VariantSummary, v2: &VariantSummary) -> Option<Self> {
        let (base, new) = (v1.hashrate?, v2.hashrate?);
        let efficiency_change_percent = match (v1.hashes_per_joule, v2.hashes_per_joule) {
            (Some(a), Some(b)) => Some(percentage_change(a, b)),
            _ => None,
        };
        Some(Self {
            hashrate_change_percent: percentage_change(base.mean, new.mean),
            efficiency_change_percent,
        })
    }

    /// Comparison from a summary list as produced by `summarize`
    pub fn from_summaries(summaries: &[VariantSummary]) -> Option<Self> {
        let v1 = summaries.iter().find(|s| s.variant == Variant::V1)?;
        let v2 = summaries.iter().find(|s| s.variant == Variant::V2)?;
        Self::between(v1, v2)
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Aggregation over run results.
//   - Sample standard deviation, per-variant summaries, v1/v2 comparison.
