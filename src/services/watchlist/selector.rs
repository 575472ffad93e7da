use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform random pick over collected candidates
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Selector seeded from the operating system
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic selector for reproducible picks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picks one item with probability `1/n`; `None` on an empty slice
    pub fn select<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..items.len());
        items.get(index)
    }
}
