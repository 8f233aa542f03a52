//! Constrained bi-objective problem with kernel restarts
//!
//! Kernels stop after a fixed number of iterations and are replaced by a
//! kernel started from the best contributing incumbent. Solutions whose
//! first coordinate exceeds 0.6 are infeasible.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example constrained_restart --release
//! ```

use anyhow::Result;
use sofomore::lifecycle::best_contributor_restart;
use sofomore::prelude::*;
use sofomore::problems::double_sphere;

const NUM_KERNELS: usize = 5;
const DIMENSION: usize = 4;
const MAX_KERNELS: usize = 12;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let options =
        GaussianKernelOptions { seed: Some(7), maxiter: Some(150), ..Default::default() };
    let starts: Vec<Vec<f64>> = (0..NUM_KERNELS)
        .map(|i| vec![0.1 * i as f64; DIMENSION])
        .collect();
    let kernels = GaussianKernel::many(&starts, 0.3, &options);

    let config = SofomoreConfig::new()
        .update_order(UpdateOrder::EvenOdd)
        .verb_disp(50);
    let mut moes = Sofomore::new(kernels, vec![11.0, 11.0], config)?
        .with_restart(best_contributor_restart(0.1, options.clone()));
    let fun = double_sphere();

    while moes.stop().is_empty() {
        let solutions = moes.ask_all()?;
        let values: Vec<Vec<f64>> = solutions.iter().map(|x| fun.evaluate(x)).collect();
        let g: Vec<f64> = solutions.iter().map(|x| x[0] - 0.6).collect();
        moes.tell_constrained(&solutions, &values, &[g])?;
        moes.disp();

        if moes.num_kernels() >= MAX_KERNELS {
            moes.set_restart(None);
        }
    }

    println!("\n{} kernels, {} iterations", moes.num_kernels(), moes.countiter());
    for (index, status) in moes.termination_status() {
        println!("  kernel {:2}: {:?}", index, status.keys().collect::<Vec<_>>());
    }
    let feasible = moes.pareto_set_cut().iter().filter(|x| x[0] <= 0.6).count();
    println!(
        "Pareto set: {} solutions, {} feasible, hypervolume {:.6}",
        moes.pareto_set_cut().len(),
        feasible,
        moes.hypervolume()
    );
    Ok(())
}
