//! A [`Host`] for unit tests.

use quire_foundation::{Facing, Host};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct TestHost {
    pub rng: ChaCha8Rng,
    pub facing: Facing,
}

impl TestHost {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            facing: Facing::North,
        }
    }
}

impl Host for TestHost {
    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }
}
