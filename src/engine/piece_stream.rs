// src/engine/piece_stream.rs
use rand::prelude::*;

use crate::engine::pieces::Kind;

/// Uniform IID piece source.
///
/// One stream per simulator, seeded once at construction. `Game::reset` keeps
/// drawing from the same stream, so successive episodes of one simulator are
/// slices of a single deterministic sequence.
#[derive(Clone)]
pub(crate) struct PieceStream {
    rng: StdRng,
}

impl PieceStream {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn draw(&mut self) -> Kind {
        let all = Kind::all();
        let idx = self.rng.gen_range(0..all.len());
        all[idx]
    }
}
