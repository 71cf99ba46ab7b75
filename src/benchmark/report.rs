// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/benchmark/report.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Console report for a finished (or reloaded) benchmark session.

use crate::benchmark::results_file::ResultsFile;
use crate::benchmark::stats::VariantSummary;
use crate::utils::FormatUtils;
use std::fmt::Write;

const RULE: &str = "==============================================================";

/// Render the report as plain text
pub fn render_report(results: &ResultsFile) -> String {
    let mut out = String::new();
    let host = &results.host;
    let config = &results.config;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "📊 POWBENCH REPORT");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "🖥️ Host:      {}", host.hostname.as_deref().unwrap_or("unknown"));
    let _ = writeln!(
        out,
        "💿 OS:        {}",
        host.os_version.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(out, "🧠 CPU:       {}", host.cpu_brand);
    let _ = writeln!(
        out,
        "🧵 Cores:     {} physical / {} logical",
        host.physical_cores, host.logical_cpus
    );
    let _ = writeln!(out, "🔨 Binary:    {}", config.binary.display());
    let _ = writeln!(
        out,
        "⚙️ Threads:   {} (init {}), {} nonces x {} repetitions",
        config.threads, config.init_threads, config.nonces, config.repetitions
    );
    match &results.plan {
        Some(plan) => {
            let ids: Vec<String> = plan
                .selected_logical_ids
                .iter()
                .map(usize::to_string)
                .collect();
            let _ = writeln!(out, "📌 Affinity:  {} [{}]", plan.bitmask, ids.join(","));
        }
        None => {
            let _ = writeln!(out, "📌 Affinity:  none");
        }
    }
    let _ = writeln!(
        out,
        "🔧 Tuning:    msr={} hugepages={} energy={}",
        config.msr_preset.as_deref().unwrap_or("off"),
        config
            .huge_pages
            .map(|p| p.to_string())
            .unwrap_or_else(|| "off".to_string()),
        config.energy_source
    );
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "{:<4} {:>5} {:>14} {:>9} {:>14} {:>14} {:>12} {:>8}",
        "VAR", "RUNS", "MEAN", "STDDEV", "MIN", "MAX", "POWER", "CRASHES"
    );
    for summary in &results.summaries {
        let _ = writeln!(out, "{}", summary_row(summary));
    }
    for summary in &results.summaries {
        if let (Some(energy), Some(hpj)) = (summary.energy_joules, summary.hashes_per_joule) {
            let _ = writeln!(
                out,
                "🔋 {}: {} per run, {:.2} H/J",
                summary.variant,
                FormatUtils::format_energy(energy.mean),
                hpj
            );
        }
    }
    let _ = writeln!(out, "{}", RULE);

    match results.comparison {
        Some(cmp) => {
            let _ = writeln!(
                out,
                "⚖️ v2 vs v1 hashrate: {}",
                FormatUtils::format_change(cmp.hashrate_change_percent)
            );
            if let Some(eff) = cmp.efficiency_change_percent {
                let _ = writeln!(
                    out,
                    "⚖️ v2 vs v1 efficiency: {}",
                    FormatUtils::format_change(eff)
                );
            }
        }
        None => {
            let _ = writeln!(out, "⚖️ No comparison: a variant has no successful runs");
        }
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

pub fn print_report(results: &ResultsFile) {
    print!("{}", render_report(results));
}

fn summary_row(summary: &VariantSummary) -> String {
    let power = summary
        .average_watts
        .map(|w| format!("{:.1} W", w))
        .unwrap_or_else(|| "-".to_string());
    match summary.hashrate {
        Some(stats) => format!(
            "{:<4} {:>5} {:>14} {:>8.2}% {:>14} {:>14} {:>12} {:>8}",
            summary.variant.as_str(),
            summary.runs,
            FormatUtils::format_hashrate(stats.mean),
            stats.coefficient_of_variation(),
            FormatUtils::format_hashrate(stats.min),
            FormatUtils::format_hashrate(stats.max),
            power,
            summary.crashes
        ),
        None => format!(
            "{:<4} {:>5} {:>14} {:>9} {:>14} {:>14} {:>12} {:>8}",
            summary.variant.as_str(),
            summary.runs,
            "-",
            "-",
            "-",
            "-",
            power,
            summary.crashes
        ),
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Console report rendered from a results file.
