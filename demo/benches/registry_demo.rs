//! A minimal runner over the process-wide registry.
//!
//! Run with `cargo bench -p cntryl-bench-registry-demo`. `BENCH_FILTER`
//! selects benchmarks by glob and `RUST_LOG=trace` shows each invocation.

use anyhow::Context;
use cntryl_bench_registry::{benchmark, case_setup, param, Registry, SelectionConfig};
use cntryl_bench_registry_demo::Scratch;
use std::hint::black_box;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

static SCRATCH: Scratch = Scratch::new();

#[case_setup(target = fill_buffer)]
fn clear_scratch() {
    SCRATCH.lock().clear();
}

#[benchmark]
#[param(1048576)]
fn fill_buffer(size: usize) {
    let mut scratch = SCRATCH.lock();
    scratch.resize(size, 0xAB);
    black_box(&*scratch);
}

#[benchmark]
#[param([0x1f, 0x8b, 0x08, 0x00], 4096)]
fn scan_header(header: &[u8], rounds: usize) -> usize {
    (0..rounds)
        .map(|i| header.iter().filter(|&&b| b as usize == i % 256).count())
        .sum()
}

#[benchmark]
#[param(30)]
fn compute_fibonacci(n: u32) -> u64 {
    fibonacci(n)
}

#[benchmark]
#[param("the quick brown fox", 1000)]
fn repeat_text(text: &str, times: usize) -> usize {
    text.repeat(times).len()
}

fn fibonacci(n: u32) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = SelectionConfig::from_env();
    let registry = Registry::global();

    if std::env::args().any(|a| a == "--list") {
        println!("{}", registry.manifest(&config).to_json()?);
        return Ok(());
    }

    for case in registry.select(&config) {
        case.run_setup()
            .with_context(|| format!("setting up {case}"))?;
        let start = Instant::now();
        case.run_benchmark()
            .with_context(|| format!("running {case}"))?;
        eprintln!("{case}: {:.2?}", start.elapsed());
    }

    Ok(())
}
