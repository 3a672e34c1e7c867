// Every stochastic component owns its own StdRng. A fixed seed makes a run reproducible, no seed
// pulls one from the OS.

use rand::{SeedableRng, rngs::StdRng};

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
