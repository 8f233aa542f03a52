//! Bi-objective double sphere with Gaussian kernels
//!
//! Runs the ask/evaluate/tell loop by hand, then prints the approximated
//! Pareto front and writes a snapshot of the final state.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example double_sphere --release
//! ```

use anyhow::Result;
use sofomore::prelude::*;
use sofomore::problems::double_sphere;

const NUM_KERNELS: usize = 11;
const DIMENSION: usize = 10;
const MAX_ITERATIONS: usize = 2000;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let options = GaussianKernelOptions { seed: Some(2021), ..Default::default() };
    let starts: Vec<Vec<f64>> = (0..NUM_KERNELS)
        .map(|i| vec![i as f64 / (NUM_KERNELS - 1) as f64; DIMENSION])
        .collect();
    let kernels = GaussianKernel::many(&starts, 0.2, &options);

    let config = SofomoreConfig::new().seed(2021).verb_disp(100);
    let mut moes = Sofomore::new(kernels, vec![11.0, 11.0], config)?;
    let fun = double_sphere();

    while moes.stop().is_empty() && moes.countiter() < MAX_ITERATIONS {
        let solutions = moes.ask_all()?;
        let values: Vec<Vec<f64>> = solutions.iter().map(|x| fun.evaluate(x)).collect();
        moes.tell(&solutions, &values)?;
        moes.disp();
    }

    println!("\nPareto front after {} evaluations:", moes.countevals());
    for f in moes.pareto_front_cut() {
        println!("  {:8.5} {:8.5}", f[0], f[1]);
    }
    println!("Hypervolume: {:.9}", moes.hypervolume());
    if let Some(archive) = moes.archive() {
        println!("Archive: {} points, hypervolume {:.9}", archive.len(), archive.hypervolume());
    }

    moes.snapshot().save_json("double_sphere_snapshot.json")?;
    println!("Snapshot saved to double_sphere_snapshot.json");
    Ok(())
}
