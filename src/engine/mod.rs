// src/engine/mod.rs
#![forbid(unsafe_code)]

mod action;
mod board;
mod constants;
mod game;
mod observation;
mod piece_stream;
mod pieces;

/**
 * Curated engine public API.
 *
 * Internal implementation modules remain private; only stable items are
 * re-exported here.
 */
pub use action::{Action, ACTION_DIM};
pub use board::{clear_piece_rows, empty_board, fits_on_board, lock_on_board, Board};
pub use constants::{
    DEFAULT_QUEUE_PREVIEW, H_BOARD, H_PLAY, MAX_QUEUE_PREVIEW, MAX_ROTS, NUM_KINDS, PIECE_SIZE,
    SPAWN_X, SPAWN_Y, W_BOARD, W_PLAY,
};
pub use game::{ActivePiece, Game, StepResult};
pub use observation::Observation;
pub use pieces::{cells, mask_4x4, Kind};
