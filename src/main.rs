//! Benchmark runner for the multiplication kernels.

use std::time::Instant;

use aligned_matmul::matrix::random::init_random;
use aligned_matmul::{
    DEFAULT_TOLERANCE, KernelKind, KernelPool, Matrix, compare_relative, multiply,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Times `dest = A × B` for each selected kernel on random `f32` operands.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Rows of A and of the result.
    #[arg(long, default_value_t = 500)]
    size_m: usize,

    /// Columns of B and of the result.
    #[arg(long, default_value_t = 500)]
    size_n: usize,

    /// Columns of A, rows of B.
    #[arg(long, default_value_t = 500)]
    size_k: usize,

    /// Overrides M, N and K at once when non-zero.
    #[arg(long, default_value_t = 0)]
    square_size: usize,

    /// Kernel to run (basic, ikj, basic_mt, ikj_mt, blas). Repeatable.
    #[arg(long = "implementation", default_value = "basic")]
    implementations: Vec<String>,

    /// Total runs per kernel, warm-up included.
    #[arg(long, default_value_t = 7)]
    repeat_times: usize,

    /// Leading runs excluded from the mean.
    #[arg(long, default_value_t = 2)]
    warmup_times: usize,

    /// Worker threads for the parallel kernels (0 = one per logical CPU).
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Report every run, not just the mean.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    print_each_time: bool,

    /// Print A and B before running.
    #[arg(long)]
    print_operands: bool,

    /// Print the result of the first run.
    #[arg(long)]
    print_result: bool,

    /// Cross-check every kernel against `basic`.
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    init_subscriber();

    let mut args = Args::parse();
    if args.square_size != 0 {
        args.size_m = args.square_size;
        args.size_n = args.square_size;
        args.size_k = args.square_size;
    }

    // Unknown selectors abort the run before any work is done.
    let kinds = args
        .implementations
        .iter()
        .map(|name| name.parse::<KernelKind>())
        .collect::<Result<Vec<_>, _>>()?;

    let pool = KernelPool::new(args.threads)?;
    info!(threads = pool.num_threads(), "kernel pool ready");

    let (m, n, k) = (args.size_m, args.size_n, args.size_k);
    let mut a = Matrix::<f32>::new(m, k).context("allocating A")?;
    let mut b = Matrix::<f32>::new(k, n).context("allocating B")?;
    init_random(&mut a);
    init_random(&mut b);

    if args.print_operands {
        println!("Matrix A:\n{a:7.3}");
        println!("Matrix B:\n{b:7.3}");
    }

    let reference = if args.verify {
        let mut c = Matrix::<f32>::new(m, n).context("allocating reference")?;
        multiply(KernelKind::Basic, &mut c, &a, &b)?;
        Some(c)
    } else {
        None
    };

    for kind in kinds {
        let mut c = Matrix::<f32>::new(m, n).context("allocating C")?;
        measure(&args, &pool, kind, &mut c, &a, &b)?;

        if let Some(reference) = &reference {
            match compare_relative(reference, &c, DEFAULT_TOLERANCE as f32) {
                Ok(()) => info!(kernel = %kind, "result matches basic"),
                Err(mismatch) => {
                    warn!(kernel = %kind, %mismatch, "result differs from basic");
                    anyhow::bail!("{kind}: {mismatch}");
                }
            }
        }
    }

    Ok(())
}

/// Runs one kernel `repeat_times` times and reports time and GFLOPS.
fn measure(
    args: &Args,
    pool: &KernelPool,
    kind: KernelKind,
    c: &mut Matrix<f32>,
    a: &Matrix<f32>,
    b: &Matrix<f32>,
) -> Result<()> {
    let flops = 2.0 * args.size_m as f64 * args.size_n as f64 * args.size_k as f64;
    info!(
        kernel = %kind,
        parallel = kind.is_parallel(),
        "measuring A ({}×{}) × B ({}×{}), {:.3} GFLOP",
        args.size_m,
        args.size_k,
        args.size_k,
        args.size_n,
        flops / 1e9
    );

    let mut total = 0.0;
    let mut timed = 0;
    for run in 0..args.repeat_times {
        let start = Instant::now();
        pool.multiply(kind, c, a, b)?;
        let elapsed = start.elapsed().as_secs_f64();

        if run == 0 && args.print_result {
            println!("Result:\n{c:7.3}");
        }

        let warmup = run < args.warmup_times;
        if !warmup {
            total += elapsed;
            timed += 1;
        }
        if args.print_each_time {
            info!(
                "run {:2}/{:2}: {:8.4} s => {:7.2} GFLOPS {}",
                run + 1,
                args.repeat_times,
                elapsed,
                flops / elapsed / 1e9,
                if warmup { "(warmup)" } else { "" }
            );
        }
    }

    if timed > 0 {
        let avg = total / timed as f64;
        info!(
            kernel = %kind,
            "average time {:8.4} s, {:7.2} GFLOPS",
            avg,
            flops / avg / 1e9
        );
    }
    Ok(())
}

/// Logs to stdout, respecting `RUST_LOG` and defaulting to `info`.
fn init_subscriber() {
    let fmt_layer = fmt::layer().with_target(false);

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
