// src/engine/constants.rs
#![forbid(unsafe_code)]

/// Full board height, including the headroom rows above the playable field.
pub const H_BOARD: usize = 24;
/// Full board width, including the dead columns right of the playable field.
pub const W_BOARD: usize = 18;

/// Playable field: the game happens in the bottom-left `H_PLAY x W_PLAY`
/// sub-grid (row 0 is the bottom row). The remaining cells exist for spawn
/// headroom and to keep the observation layout rectangular.
pub const H_PLAY: usize = 20;
pub const W_PLAY: usize = 10;

/// Side length of the 4x4 box every tetromino rotation fits in.
pub const PIECE_SIZE: usize = 4;

pub const NUM_KINDS: usize = 7;
pub const MAX_ROTS: usize = 4;

/**
 * Spawn pose of a freshly drawn piece (rotation 0).
 * - `SPAWN_Y` sits at the top of the playable region; the piece body extends
 *   into the headroom rows, which is why collision checks rows against
 *   `H_BOARD` rather than `H_PLAY`.
 * - A collision at this pose is the game-over condition.
 */
pub const SPAWN_X: i32 = (W_PLAY / 2) as i32;
pub const SPAWN_Y: i32 = (H_PLAY - 1) as i32;

/// Preview-queue sizing: `DEFAULT_QUEUE_PREVIEW` upcoming pieces unless the
/// caller asks for more, capped at `MAX_QUEUE_PREVIEW`.
pub const DEFAULT_QUEUE_PREVIEW: usize = 3;
pub const MAX_QUEUE_PREVIEW: usize = 8;
