//! Standard-normal shock sources.
//!
//! The engine pulls exactly one draw per tick. Seeded sources make runs
//! reproducible; scripted sources make them fully deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Supplier of i.i.d. standard-normal draws.
pub trait ShockSource {
    fn next_shock(&mut self) -> f64;
}

impl<S: ShockSource + ?Sized> ShockSource for Box<S> {
    fn next_shock(&mut self) -> f64 {
        (**self).next_shock()
    }
}

/// Pseudo-random Gaussian shocks.
pub struct GaussianShocks {
    rng: StdRng,
}

impl GaussianShocks {
    /// Seeded when `seed` is given, otherwise seeded from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl ShockSource for GaussianShocks {
    fn next_shock(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

/// The same draw every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantShock(pub f64);

impl ShockSource for ConstantShock {
    fn next_shock(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed sequence, wrapping around when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedShocks {
    values: Vec<f64>,
    pos: usize,
}

impl ScriptedShocks {
    /// An empty script behaves like `ConstantShock(0.0)`.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

impl ShockSource for ScriptedShocks {
    fn next_shock(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let z = self.values[self.pos];
        self.pos = (self.pos + 1) % self.values.len();
        z
    }
}
