// src/policy/random.rs
#![forbid(unsafe_code)]

use rand::prelude::*;

use crate::engine::ACTION_DIM;

use super::base::{Decision, Policy, PolicyResult};

/// Seeded uniform baseline. The log-prob is the exact uniform value so
/// downstream estimators stay well-formed.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, _observation: &[f32]) -> PolicyResult {
        let action = self.rng.gen_range(0..ACTION_DIM);
        Ok(Decision {
            action,
            log_prob: -(ACTION_DIM as f32).ln(),
            value: 0.0,
        })
    }
}
