// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/benchmark/parse.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Hashrate extraction from captured benchmark output.

const PERFORMANCE_PREFIX: &str = "Performance:";
const SPEED_MARKER: &str = "speed 10s/60s/15m";

/// Hashrate (H/s) reported in benchmark output; the last matching line wins
pub fn parse_hashrate(output: &str) -> Option<f64> {
    output.lines().filter_map(parse_line).last()
}

fn parse_line(line: &str) -> Option<f64> {
    if let Some(idx) = line.find(PERFORMANCE_PREFIX) {
        // "Performance: 1234.56 hashes per second"
        let rest = &line[idx + PERFORMANCE_PREFIX.len()..];
        if !rest.contains("hashes per second") {
            return None;
        }
        return rest.split_whitespace().next()?.parse().ok().filter(|v: &f64| v.is_finite());
    }

    if let Some(idx) = line.find(SPEED_MARKER) {
        // "speed 10s/60s/15m 1234.5 n/a n/a H/s max 1240.1 H/s"
        let rest = &line[idx + SPEED_MARKER.len()..];
        return rest
            .split_whitespace()
            .take_while(|token| *token != "H/s")
            .find_map(|token| token.parse::<f64>().ok())
            .filter(|v| v.is_finite());
    }

    None
}


// Changelog:
// - v1.0.0 (2026-10-18): Hashrate parsing for RandomX benchmark and xmrig-style output.
