//! Adding, removing, (in)activating and restarting kernels

mod common;

use common::{config, identity, round, three_kernels, Scripted};
use sofomore::lifecycle::best_contributor_restart;
use sofomore::prelude::*;

fn moes(kernels: Vec<Box<dyn Kernel>>) -> Sofomore {
    Sofomore::new(kernels, vec![6.0, 6.0], config()).unwrap()
}

#[test]
fn test_inactivated_kernel_leaves_front_and_schedule() {
    let mut moes = moes(three_kernels(2));
    round(&mut moes);
    assert_eq!(moes.pareto_front_cut().len(), 3);

    assert!(moes.inactivate(2usize).unwrap());
    assert_eq!(moes.pareto_front_cut(), vec![vec![1.0, 5.0], vec![3.0, 3.0]]);

    // two incumbents and two samples from each of the two active kernels
    let solutions = moes.ask_all().unwrap();
    assert_eq!(solutions.len(), 6);
    moes.tell(&solutions, &identity(&solutions)).unwrap();
    // kernel 2 still owes an evaluation for when it is reactivated
    assert_eq!(moes.told_indices(), vec![0, 1, 2]);

    // the inactive kernel keeps its last objective vector
    assert_eq!(moes.objective_values(2), Some(&[5.0, 1.0][..]));
    assert!(moes.activate(2usize).unwrap());
    assert_eq!(moes.pareto_front_cut().len(), 3);
}

#[test]
fn test_remove_mid_round() {
    let mut moes = moes(three_kernels(2));
    let solutions = moes.ask_all().unwrap();
    let removed = moes.remove(&[KernelRef::Index(1)]).unwrap();
    assert_eq!(removed.len(), 1);

    moes.tell(&solutions, &identity(&solutions)).unwrap();
    assert_eq!(moes.num_kernels(), 2);
    assert_eq!(moes.told_indices(), vec![0, 1]);
    assert_eq!(moes.objective_values(1), Some(&[5.0, 1.0][..]));
    assert_eq!(moes.countevals(), 9);
}

#[test]
fn test_remove_unknown_kernel() {
    let mut moes = moes(three_kernels(1));
    let err = moes.remove(&[KernelRef::Id(KernelId(1)), KernelRef::Id(KernelId(42))]);
    assert!(matches!(err, Err(SofomoreError::InvalidArgument(_))));
    assert_eq!(moes.num_kernels(), 3);

    // identifiers stay valid after earlier kernels are removed
    moes.remove(&[KernelRef::Index(0)]).unwrap();
    moes.remove(&[KernelRef::Id(KernelId(2))]).unwrap();
    assert_eq!(moes.kernel_id(0), Some(KernelId(1)));
}

#[test]
fn test_added_kernel_is_evaluated_next() {
    let mut moes = moes(three_kernels(1));
    round(&mut moes);
    let ids = moes.add(vec![Scripted::new(&[2.0, 2.0], 1).boxed()]);
    assert_eq!(ids, vec![KernelId(3)]);

    let solutions = moes.ask(AskCount::Exactly(1)).unwrap();
    // four incumbents lead, the new one last
    assert_eq!(solutions[3], vec![2.0, 2.0]);
    moes.tell(&solutions, &identity(&solutions)).unwrap();
    assert_eq!(moes.objective_values(3), Some(&[2.0, 2.0][..]));
}

#[test]
fn test_global_stop() {
    let kernels: Vec<Box<dyn Kernel>> = [[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]
        .iter()
        .map(|x| Scripted::new(x, 1).max_updates(2).boxed())
        .collect();
    let mut moes = moes(kernels);

    round(&mut moes);
    assert!(moes.stop().is_empty());
    round(&mut moes);
    let stop = moes.stop();
    assert_eq!(stop.len(), 3);
    assert!(stop.values().all(|s| s.contains_key("maxiter")));

    // asking after the global stop only returns pending incumbents
    assert_eq!(round(&mut moes), 3);
    assert_eq!(round(&mut moes), 0);
}

#[test]
fn test_stop_ignores_inactive_kernels() {
    let kernels = vec![
        Scripted::new(&[1.0, 5.0], 1).max_updates(1).boxed(),
        Scripted::new(&[3.0, 3.0], 1).boxed(),
        Scripted::new(&[5.0, 1.0], 1).boxed(),
    ];
    let mut moes = moes(kernels);
    round(&mut moes);
    assert!(moes.stop().is_empty());
    assert_eq!(moes.termination_status().len(), 1);

    moes.inactivate(1usize).unwrap();
    moes.inactivate(2usize).unwrap();
    assert_eq!(moes.stop().len(), 3);

    moes.activate(1usize).unwrap();
    assert!(moes.stop().is_empty());
}

#[test]
fn test_restart_from_best_contributor() {
    let kernels = vec![
        Scripted::new(&[1.0, 5.0], 1).boxed(),
        Scripted::new(&[3.0, 3.0], 1).max_updates(1).boxed(),
        Scripted::new(&[5.0, 1.0], 1).boxed(),
    ];
    let options = GaussianKernelOptions { seed: Some(3), ..Default::default() };
    let mut moes = moes(kernels).with_restart(best_contributor_restart(0.5, options));

    round(&mut moes);
    assert_eq!(moes.num_kernels(), 4);
    assert_eq!(moes.termination_status().keys().copied().collect::<Vec<_>>(), vec![1]);
    assert!(moes.told_indices().contains(&3));
    assert!(moes.stop().is_empty());

    // the replacement starts where the best contributor is
    let start = moes.incumbent(3).unwrap();
    assert!((0..3).any(|i| moes.incumbent(i).as_ref() == Some(&start)));
}
