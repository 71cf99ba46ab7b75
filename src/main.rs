// PowBench - Free and Open Source Software Statement
//
// File: src/main.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Pipeline: detect host -> deps -> build -> topology/plan -> tuning -> runs -> report

use clap::Parser;
use powbench::{
    Result,
    benchmark::{
        BenchmarkConfig, BenchmarkRunner, ConfigSnapshot, ResultsFile, ResultsFileManager,
        print_report,
    },
    build::SourceBuilder,
    core::types::{Args, Variant},
    env::{HostEnvironment, ensure_dependencies},
    telemetry::EnergyMeter,
    topology::{detect_topology, recommended_threads},
    tuning::{apply_host_preset, required_huge_pages, reserve_host_huge_pages},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(ref path) = args.report_only {
        return handle_report_only(path.clone()).await;
    }

    if let Err(e) = run_pipeline(&args).await {
        eprintln!("❌ Benchmark failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn handle_report_only(path: std::path::PathBuf) -> Result<()> {
    let manager = ResultsFileManager::new(path)?;
    let results = manager.load().await?;
    print_report(&results);
    Ok(())
}

async fn run_pipeline(args: &Args) -> Result<()> {
    info!("🚀 PowBench v{} starting", env!("CARGO_PKG_VERSION"));

    let host = HostEnvironment::detect();
    host.log_summary();

    // Output location is checked before any long-running step
    let results_manager = ResultsFileManager::new(args.output.clone())?;

    tokio::fs::create_dir_all(&args.work_dir).await?;
    let builder = SourceBuilder::new(
        args.repo_url.clone(),
        args.git_ref.clone(),
        args.work_dir.clone(),
    );

    let binary = if let Some(ref binary) = args.binary {
        info!("🔨 Using prebuilt binary {}", binary.display());
        binary.clone()
    } else if args.skip_build {
        builder.existing_binary()?
    } else {
        if args.skip_deps {
            info!("📦 Skipping dependency installation");
        } else {
            ensure_dependencies(&host).await?;
        }
        builder.build().await?
    };

    let topology = detect_topology()?;
    info!(
        "🧩 Topology: {} logical CPUs, {} physical cores, {} LLC domain(s)",
        topology.logical_cpus(),
        topology.physical_cores(),
        topology.domain_count()
    );

    let threads = if args.threads > 0 {
        args.threads
    } else {
        let recommended = recommended_threads(&topology);
        info!("🧵 Auto-selected {} threads from cores and cache size", recommended);
        recommended
    };
    let init_threads = if args.init_threads > 0 {
        args.init_threads
    } else {
        topology.logical_cpus()
    };

    let plan = if args.no_affinity {
        None
    } else {
        let plan = topology.planner()?.plan(threads);
        if plan.len() < threads {
            warn!(
                "⚠️ Only {} logical CPUs available for {} threads; affinity covers all of them",
                plan.len(),
                threads
            );
        }
        info!(
            "📌 Affinity {} -> CPUs {:?}",
            plan.affinity_arg(),
            plan.selected_logical_ids
        );
        Some(plan)
    };

    let huge_pages = if args.skip_hugepages {
        None
    } else {
        match reserve_host_huge_pages(threads) {
            Ok(pages) => Some(pages),
            Err(e) => {
                warn!(
                    "⚠️ Huge page reservation failed ({}); need {} pages",
                    e,
                    required_huge_pages(threads)
                );
                None
            }
        }
    };

    let msr_session = if args.skip_msr {
        None
    } else {
        let cpus: Vec<usize> = topology.entries.iter().map(|e| e.logical_id).collect();
        match apply_host_preset(&cpus).await {
            Ok(session) => session,
            Err(e) => {
                warn!("⚠️ MSR tuning skipped: {}", e);
                None
            }
        }
    };

    let log_dir = args.work_dir.join("logs");
    let meter = EnergyMeter::detect(&log_dir);

    let mut snapshot = ConfigSnapshot::from_args(args, binary.clone(), threads, init_threads);
    snapshot.msr_preset = msr_session.as_ref().map(|s| s.preset().name().to_string());
    snapshot.huge_pages = huge_pages;
    snapshot.energy_source = meter.name().to_string();

    let config = BenchmarkConfig {
        binary,
        threads,
        init_threads,
        nonces: args.nonces,
        repetitions: args.repetitions,
        affinity: plan.as_ref().map(|p| p.bitmask.clone()),
        v1_flags: args.variant_flags(Variant::V1),
        v2_flags: args.variant_flags(Variant::V2),
        log_dir,
    };
    let runner = BenchmarkRunner::new(config, meter);
    let outcome = runner.run().await;

    // Registers go back to their original values even when the run loop failed
    if let Some(session) = msr_session {
        if let Err(e) = session.restore() {
            warn!("⚠️ MSR restore incomplete: {}", e);
        }
    }

    let runs = outcome?;
    let results = ResultsFile::new(host, snapshot, plan.as_ref(), runs);
    print_report(&results);
    results_manager.save(&results).await?;
    info!("💾 Results written to {}", results_manager.file_path().display());

    Ok(())
}

// Changelog:
// - v1.0.0 (2026-10-18): Single pipeline entry point replacing the feature-based
//   miner modes; tracing is initialised with an EnvFilter and --verbose.
