//! Deterministic kernels and helpers shared by the integration tests

#![allow(dead_code)]

use serde_json::json;
use sofomore::prelude::*;

/// Kernel that samples `popsize` points along a fixed direction and moves to
/// the sample with the lowest fitness. Stops after `max_updates` updates.
pub struct Scripted {
    pub x: Vec<f64>,
    pub step: Vec<f64>,
    pub popsize: usize,
    pub updates: usize,
    pub max_updates: Option<usize>,
}

impl Scripted {
    pub fn new(x: &[f64], popsize: usize) -> Self {
        let step = vec![-0.1; x.len()];
        Self { x: x.to_vec(), step, popsize, updates: 0, max_updates: None }
    }

    pub fn max_updates(mut self, max: usize) -> Self {
        self.max_updates = Some(max);
        self
    }

    pub fn boxed(self) -> Box<dyn Kernel> {
        Box::new(self)
    }
}

impl Kernel for Scripted {
    fn sample(&mut self) -> Vec<Vec<f64>> {
        (1..=self.popsize)
            .map(|k| self.x.iter().zip(&self.step).map(|(x, s)| x + k as f64 * s).collect())
            .collect()
    }

    fn update(&mut self, solutions: &[Vec<f64>], fitness: &[f64]) {
        assert_eq!(solutions.len(), fitness.len());
        let best = (0..fitness.len()).min_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
        if let Some(best) = best {
            self.x = solutions[best].clone();
        }
        self.updates += 1;
    }

    fn incumbent(&self) -> Vec<f64> {
        self.x.clone()
    }

    fn status(&self) -> StopStatus {
        let mut status = StopStatus::new();
        if let Some(max) = self.max_updates {
            if self.updates >= max {
                status.insert("maxiter".to_string(), json!(max));
            }
        }
        status
    }
}

/// Three kernels on the (1,5), (3,3), (5,1) front, reference (6, 6)
pub fn three_kernels(popsize: usize) -> Vec<Box<dyn Kernel>> {
    [[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]
        .iter()
        .map(|x| Scripted::new(x, popsize).boxed())
        .collect()
}

pub fn config() -> SofomoreConfig {
    SofomoreConfig::new().update_order(UpdateOrder::Increasing).verb_disp(0)
}

/// The decision vector is the objective vector
pub fn identity(solutions: &[Vec<f64>]) -> Vec<Vec<f64>> {
    solutions.to_vec()
}

/// One ask(all)/tell round with the identity objective
pub fn round(moes: &mut Sofomore) -> usize {
    let solutions = moes.ask_all().unwrap();
    let values = identity(&solutions);
    moes.tell(&solutions, &values).unwrap();
    solutions.len()
}
