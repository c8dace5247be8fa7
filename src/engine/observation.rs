// src/engine/observation.rs
#![forbid(unsafe_code)]

use crate::engine::board::Board;
use crate::engine::constants::{H_BOARD, PIECE_SIZE, W_BOARD};

/// The per-step observation: four uint8 matrices.
///
/// `board` and `active` cover the full board; `holder` is one 4x4 piece box;
/// `queue` stacks one 4x4 box per upcoming piece (so `4 * queue_size` rows).
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Cell types of locked pieces (`Kind::idx()`, 0 = empty).
    pub board: Board,
    /// 0/1 mask of the falling piece.
    pub active: Board,
    /// 0/1 mask of the held piece; all zeros while the holder is empty.
    pub holder: [[u8; PIECE_SIZE]; PIECE_SIZE],
    /// 0/1 masks of the upcoming pieces, head of the queue first.
    pub queue: Vec<[u8; PIECE_SIZE]>,
}

impl Observation {
    pub fn new(queue_size: usize) -> Self {
        Self {
            board: [[0u8; W_BOARD]; H_BOARD],
            active: [[0u8; W_BOARD]; H_BOARD],
            holder: [[0u8; PIECE_SIZE]; PIECE_SIZE],
            queue: vec![[0u8; PIECE_SIZE]; PIECE_SIZE * queue_size],
        }
    }

    /// Flat f32 length. Fixed per `queue_size`; the collector computes it
    /// once at construction and treats it as an invariant.
    pub fn dim(&self) -> usize {
        2 * H_BOARD * W_BOARD + PIECE_SIZE * PIECE_SIZE + self.queue.len() * PIECE_SIZE
    }

    /// Write the observation into `dest` as single-precision floats.
    ///
    /// Sub-matrix order is fixed (`active`, `board`, `holder`, `queue`),
    /// row-major within each matrix. This layout is the wire contract with
    /// every policy; it must stay byte-identical across episodes.
    pub fn flatten_into(&self, dest: &mut [f32]) {
        debug_assert_eq!(dest.len(), self.dim());
        let mut i = 0;
        for row in &self.active {
            for &c in row {
                dest[i] = f32::from(c);
                i += 1;
            }
        }
        for row in &self.board {
            for &c in row {
                dest[i] = f32::from(c);
                i += 1;
            }
        }
        for row in &self.holder {
            for &c in row {
                dest[i] = f32::from(c);
                i += 1;
            }
        }
        for row in &self.queue {
            for &c in row {
                dest[i] = f32::from(c);
                i += 1;
            }
        }
    }

    /// Convenience allocation of `flatten_into`.
    pub fn flatten(&self) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim()];
        self.flatten_into(&mut v);
        v
    }
}
