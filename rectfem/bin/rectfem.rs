//! Solve a rectangular-mesh task described in JSON
//!
//! Usage:
//!   cargo run --release --bin rectfem -- --config rectfem/data/task.json
//!   cargo run --release --bin rectfem -- --help

use clap::Parser;
use rectfem::config::TaskConfig;
use rectfem::driver::{RunReport, run};
use rectfem::solver::{Backend, KrylovMethod, PreconditionerChoice};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "rectfem")]
#[command(about = "Finite elements on structured rectangular meshes")]
struct Args {
    /// Path to JSON task file
    #[arg(short, long)]
    config: PathBuf,

    /// Write the run report as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the solver backend
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Override the Krylov method
    #[arg(short, long)]
    method: Option<KrylovMethod>,

    /// Override the preconditioner
    #[arg(short, long)]
    preconditioner: Option<PreconditionerChoice>,

    /// Override the number of mesh generations
    #[arg(short, long)]
    generations: Option<usize>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

fn print_report(report: &RunReport) {
    println!("Task: {}", report.task);
    println!(
        "{:>4} {:>10} {:>10} {:>6} {:>12} {:>12} {:>8}",
        "gen", "nodes", "unknowns", "iters", "residual", "L2 error", "ratio"
    );
    let mut previous: Option<f64> = None;
    for g in &report.generations {
        let ratio = match (previous, g.l2_error) {
            (Some(p), Some(e)) if e > 0.0 => format!("{:.2}", p / e),
            _ => "-".to_string(),
        };
        let error = g
            .l2_error
            .map_or_else(|| "-".to_string(), |e| format!("{e:.4e}"));
        println!(
            "{:>4} {:>10} {:>10} {:>6} {:>12.4e} {:>12} {:>8}",
            g.generation,
            format!("{}x{}", g.nodes[0], g.nodes[1]),
            g.unknowns,
            g.iterations,
            g.residual,
            error,
            ratio
        );
        if !g.converged {
            println!("     solver stopped before reaching the tolerance");
        }
        for probe in &g.probes {
            match (probe.value, probe.gradient) {
                (Some(v), Some([gx, gy])) => println!(
                    "     probe ({}, {}): u = {v:.8}, grad = ({gx:.6}, {gy:.6})",
                    probe.point.x, probe.point.y
                ),
                _ => println!("     probe ({}, {}): outside the mesh", probe.point.x, probe.point.y),
            }
        }
        previous = g.l2_error;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        #[cfg(feature = "rayon")]
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        #[cfg(not(feature = "rayon"))]
        log::warn!("Built without rayon, ignoring --threads {threads}");
    }

    println!("Loading task from: {}", args.config.display());
    let mut config = TaskConfig::from_file(&args.config)?;
    if let Some(backend) = args.backend {
        config.solver.backend = backend;
    }
    if let Some(method) = args.method {
        config.solver.method = method;
    }
    if let Some(preconditioner) = args.preconditioner {
        config.solver.preconditioner = preconditioner;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }

    let start = Instant::now();
    let report = run(&config)?;
    print_report(&report);
    println!("Total time: {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
