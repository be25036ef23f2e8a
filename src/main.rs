//! Benchmark runner for blocked matrix operations.
//!
//! Environment:
//! - `BLOCKMAT_SIZES`: comma-separated square sizes (default `256,512,1024`)
//! - `BLOCKMAT_BLOCK_SIZE`: tile side (default: the f64 block size)
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::time::Instant;

use blockmat::matrix::naive_ijk::matmul_naive_ijk;
use blockmat::matrix::naive_ikj::matmul_naive_ikj;
use blockmat::{BlockMatrix, FieldElement, Result};
use tracing::{info, warn};

const DEFAULT_SIZES: [usize; 3] = [256, 512, 1024];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let sizes = env_list("BLOCKMAT_SIZES").unwrap_or_else(|| DEFAULT_SIZES.to_vec());
    let block_size = env_usize("BLOCKMAT_BLOCK_SIZE").unwrap_or(<f64 as FieldElement>::BLOCK_SIZE);
    let iterations = 3;

    println!("=== Blocked Matrix Benchmark ===\n");
    info!(?sizes, block_size, iterations, "starting");

    for &size in &sizes {
        println!("Matrix: {}×{}  (block size {})", size, size, block_size);
        println!("{}", "-".repeat(60));

        let (m, n, k) = (size, size, size);
        let a: Vec<f64> = (0..m * k).map(|i| (i % 100) as f64).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 100) as f64).collect();
        let a_rows: Vec<&[f64]> = a.chunks(k).collect();
        let b_rows: Vec<&[f64]> = b.chunks(n).collect();
        let a_blocked = BlockMatrix::from_rows_with_block_size(&a_rows, block_size)?;
        let b_blocked = BlockMatrix::from_rows_with_block_size(&b_rows, block_size)?;

        let flops = 2.0 * (m * n * k) as f64;
        let mut results: Vec<(&str, f64, f64)> = Vec::new();

        let t = time_avg(iterations, || {
            let mut c = vec![0.0; m * n];
            matmul_naive_ijk(&a, &b, &mut c, m, n, k);
        });
        results.push(("Naive (i-j-k)", t, flops / t / 1e9));

        let t = time_avg(iterations, || {
            let mut c = vec![0.0; m * n];
            matmul_naive_ikj(&a, &b, &mut c, m, n, k);
        });
        results.push(("Scalar (i-k-j)", t, flops / t / 1e9));

        let mut product = None;
        let t = time_avg(iterations, || {
            product = Some(a_blocked.multiply(&b_blocked));
        });
        if let Some(Err(err)) = product {
            return Err(err);
        }
        results.push(("Blocked multiply", t, flops / t / 1e9));

        let t = time_avg(iterations, || {
            let _ = a_blocked.transpose();
        });
        results.push(("Blocked transpose", t, (m * k) as f64 / t / 1e9));

        let baseline = results[0].1;
        for (i, (name, time, rate)) in results.iter().enumerate() {
            println!(
                "{}. {:18} {:9.2} ms  {:6.2} G/s  ({:.1}×)",
                i + 1,
                name,
                time * 1000.0,
                rate,
                baseline / time
            );
        }
        println!();
    }

    Ok(())
}

/// Runs `f` once to warm up, then returns the mean of `iterations` runs in seconds.
fn time_avg<F: FnMut()>(iterations: usize, mut f: F) -> f64 {
    f();
    let mut total = 0.0;
    for _ in 0..iterations {
        let start = Instant::now();
        f();
        total += start.elapsed().as_secs_f64();
    }
    total / iterations as f64
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(0) | Err(_) => {
            warn!(name, value = %raw, "ignoring invalid value");
            None
        }
        Ok(value) => Some(value),
    }
}

fn env_list(name: &str) -> Option<Vec<usize>> {
    let raw = env::var(name).ok()?;
    let parsed: std::result::Result<Vec<usize>, _> =
        raw.split(',').map(|s| s.trim().parse::<usize>()).collect();
    match parsed {
        Ok(list) if !list.is_empty() && list.iter().all(|&s| s > 0) => Some(list),
        _ => {
            warn!(name, value = %raw, "ignoring invalid size list");
            None
        }
    }
}
