//! strategy-lab: score a hand-written plan and search for better ones.
//!
//! Runs one evaluation job and one optimization job on the same circuit
//! through the scheduler, then prints the comparison.
//!
//! ```text
//! strategy-lab [engine-config.json] [circuit-name]
//! RUST_LOG=pw_eval=debug strategy-lab
//! ```

use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pw_core::{EngineConfig, StrategyId, load_circuits_reader, load_compounds_reader};
use pw_eval::OptimizerConstraints;
use pw_race::Strategy;
use pw_sched::{JobOutput, JobReport, JobRequest, SimulationScheduler};

// ── Reference data ────────────────────────────────────────────────────────────

const CIRCUITS_CSV: &str = "\
name,country,lap_distance,total_laps,base_lap_time,tire_wear_factor,drs_zones,track_type,typical_temp,rain_probability\n\
Bahrain,Bahrain,5.412,57,92.0,1.3,3,permanent,32,0.02\n\
Monza,Italy,5.793,53,81.0,0.9,2,permanent,28,0.10\n\
Monaco,Monaco,3.337,78,72.0,0.7,1,street,24,0.15\n\
Silverstone,United Kingdom,5.891,52,88.0,1.1,2,permanent,20,0.35\n\
";

const COMPOUNDS_CSV: &str = "\
name,base_grip,degradation_rate,optimal_life,cliff_factor,warm_up_laps,dry_performance,wet_performance\n\
C1,0.94,0.015,45,0.4,3,1.0,0.0\n\
C2,0.97,0.022,35,0.45,2,1.0,0.0\n\
C3,1.00,0.030,28,0.5,2,1.0,0.0\n\
C4,1.03,0.040,20,0.6,1,1.0,0.0\n\
C5,1.06,0.055,14,0.7,1,1.0,0.0\n\
INTERMEDIATE,0.85,0.025,30,0.5,2,0.4,0.8\n\
WET,0.75,0.020,35,0.5,2,0.2,1.0\n\
";

const DEFAULT_CIRCUIT: &str = "Bahrain";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<EngineConfig>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => EngineConfig::default(),
    };
    let circuit_name = args.next().unwrap_or_else(|| DEFAULT_CIRCUIT.to_string());

    // 1. Reference data.
    let circuits = load_circuits_reader(Cursor::new(CIRCUITS_CSV))?;
    let compounds = Arc::new(load_compounds_reader(Cursor::new(COMPOUNDS_CSV))?);
    let Some(circuit) = circuits.into_iter().find(|c| c.name.eq_ignore_ascii_case(&circuit_name)) else {
        bail!("unknown circuit {circuit_name:?}");
    };
    let circuit = Arc::new(circuit);
    println!("=== strategy-lab ===");
    println!(
        "{}: {} laps of {:.3} km, base lap {:.1} s, {} °C typical",
        circuit.name, circuit.total_laps, circuit.lap_distance, circuit.base_lap_time, circuit.typical_temp
    );
    println!(
        "{} trials per strategy, seed {}, {} workers",
        config.trials, config.seed, config.max_concurrent_simulations
    );
    println!();

    // 2. A conventional one-stop: medium then hard, split at half distance.
    let first = circuit.total_laps / 2;
    let baseline = Strategy::from_pairs(StrategyId(0), &[("C3", first), ("C2", circuit.total_laps - first)]);

    let sched = SimulationScheduler::new(config.clone())?;
    let t0 = Instant::now();
    let eval_job = sched.submit(JobRequest::evaluate(Arc::clone(&circuit), Arc::clone(&compounds), baseline))?;
    let opt_job = sched.submit(JobRequest::optimize(
        Arc::clone(&circuit),
        Arc::clone(&compounds),
        OptimizerConstraints::from(&config),
    ))?;
    info!(evaluate = %eval_job.id(), optimize = %opt_job.id(), "jobs submitted");

    let eval_report = eval_job.join()?;
    let opt_report = opt_job.join()?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "jobs finished");

    // 3. Report.
    let baseline_mean = print_evaluation(&eval_report)?;
    print_ranking(&opt_report, baseline_mean)?;
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_evaluation(report: &JobReport) -> Result<f64> {
    let Some(JobOutput::Evaluation(eval)) = &report.output else {
        bail!("evaluation job {} ended {}: {}", report.id, report.status, report.error.as_deref().unwrap_or("no output"));
    };
    let s = &eval.statistics;
    println!("Baseline {} ({})", eval.strategy, report.status);
    println!(
        "  mean {:.3} s  stdev {:.3}  range {:.3} – {:.3}  over {}/{} trials",
        s.mean, s.stdev, s.min, s.max, s.trials, eval.requested
    );
    println!();
    Ok(s.mean)
}

fn print_ranking(report: &JobReport, baseline_mean: f64) -> Result<()> {
    let Some(JobOutput::Optimization(outcome)) = &report.output else {
        bail!("optimization job {} ended {}: {}", report.id, report.status, report.error.as_deref().unwrap_or("no output"));
    };
    println!(
        "Optimizer ({}): {} candidates evaluated, {} rejected{}",
        report.status,
        outcome.evaluated,
        outcome.rejected,
        if outcome.partial { ", results partial" } else { "" }
    );
    println!("{:<5} {:<28} {:>12} {:>9} {:>10}", "Rank", "Strategy", "Mean (s)", "Stdev", "vs base");
    println!("{}", "-".repeat(68));
    for ranked in &outcome.ranked {
        let s = &ranked.statistics;
        println!(
            "{:<5} {:<28} {:>12.3} {:>9.3} {:>+10.3}",
            ranked.rank,
            ranked.strategy.label(),
            s.mean,
            s.stdev,
            s.mean - baseline_mean
        );
    }
    Ok(())
}
