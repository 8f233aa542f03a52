//! Ordering keys deciding which kernels are sampled first

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Named ordering keys available from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrder {
    /// Fresh uniform key per index on every sort (random permutation)
    #[default]
    Random,
    /// Key is the index itself
    Increasing,
    /// Key is the negated index
    Decreasing,
    /// Even indices first, then odd ones
    EvenOdd,
    /// Odd indices first, then even ones
    OddEven,
}

/// Caller-supplied key: kernel index to a comparable value
pub type KeyFn = Box<dyn FnMut(usize) -> f64 + Send>;

enum KeyKind {
    Random(StdRng),
    Increasing,
    Decreasing,
    EvenOdd,
    OddEven,
    Custom(KeyFn),
}

/// Key used to sort kernel indices before taking the front of the order.
pub struct OrderingKey {
    kind: KeyKind,
}

impl OrderingKey {
    /// Build a key from a configured order. `seed` only matters for `Random`.
    pub fn from_order(order: UpdateOrder, seed: Option<u64>) -> Self {
        let kind = match order {
            UpdateOrder::Random => KeyKind::Random(match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }),
            UpdateOrder::Increasing => KeyKind::Increasing,
            UpdateOrder::Decreasing => KeyKind::Decreasing,
            UpdateOrder::EvenOdd => KeyKind::EvenOdd,
            UpdateOrder::OddEven => KeyKind::OddEven,
        };
        Self { kind }
    }

    /// Wrap an arbitrary key function
    pub fn custom<F>(key: F) -> Self
    where
        F: FnMut(usize) -> f64 + Send + 'static,
    {
        Self { kind: KeyKind::Custom(Box::new(key)) }
    }

    /// Evaluate the key for one kernel index
    pub fn key(&mut self, index: usize) -> f64 {
        match &mut self.kind {
            KeyKind::Random(rng) => rng.r#gen::<f64>(),
            KeyKind::Increasing => index as f64,
            KeyKind::Decreasing => -(index as f64),
            KeyKind::EvenOdd => (index % 2) as f64,
            KeyKind::OddEven => -((index % 2) as f64),
            KeyKind::Custom(key) => key(index),
        }
    }

    /// Sort `indices` by key, evaluating the key once per index.
    ///
    /// The sort is stable, so equal keys keep their incoming order.
    pub fn sort(&mut self, indices: &mut [usize]) {
        let mut keyed: Vec<(f64, usize)> = indices.iter().map(|&i| (self.key(i), i)).collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (slot, (_, index)) in indices.iter_mut().zip(keyed) {
            *slot = index;
        }
    }
}

impl fmt::Debug for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            KeyKind::Random(_) => "Random",
            KeyKind::Increasing => "Increasing",
            KeyKind::Decreasing => "Decreasing",
            KeyKind::EvenOdd => "EvenOdd",
            KeyKind::OddEven => "OddEven",
            KeyKind::Custom(_) => "Custom",
        };
        f.debug_struct("OrderingKey").field("kind", &name).finish()
    }
}
