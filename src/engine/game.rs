// src/engine/game.rs
#![forbid(unsafe_code)]

use crate::engine::action::Action;
use crate::engine::board::{
    clear_piece_rows, empty_board, fits_on_board, lock_on_board, Board,
};
use crate::engine::constants::{
    H_PLAY, MAX_QUEUE_PREVIEW, MAX_ROTS, PIECE_SIZE, SPAWN_X, SPAWN_Y, W_PLAY,
};
use crate::engine::observation::Observation;
use crate::engine::piece_stream::PieceStream;
use crate::engine::pieces::{cells, mask_4x4, Kind};

/// The falling piece: `(x, y)` is the board coordinate of the piece box's
/// `(0, 0)` cell, so the piece occupies `(y + dy, x + dx)` per `cells()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActivePiece {
    pub kind: Kind,
    pub rot: usize,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct StepResult {
    /// Lines cleared this step, one reward point each.
    pub reward: f32,
    pub cleared_lines: u32,
    /// True game over (blocked spawn) OR engine already in game_over.
    pub terminated: bool,
}

/// Single Tetris instance with the `reset / step` contract.
///
/// Determinism: the piece stream is seeded once in `new`; `reset` starts a
/// fresh episode on the SAME stream, so a simulator's episode sequence is a
/// pure function of `(queue_size, seed, actions)`.
#[derive(Clone)]
pub struct Game {
    pub board: Board,
    pub active: ActivePiece,
    pub holder: Option<Kind>,

    /// Lines cleared since `reset` (the cumulative score).
    pub score: u64,
    pub steps: u64,
    pub game_over: bool,

    queue: Vec<Kind>,
    queue_head: usize,
    queue_size: usize,

    /// Lines cleared by the most recent step.
    scored: u32,

    stream: PieceStream,
    obs: Observation,
}

impl Game {
    pub fn new(queue_size: usize, seed: u64) -> Self {
        debug_assert!((1..=MAX_QUEUE_PREVIEW).contains(&queue_size));

        let mut g = Self {
            board: empty_board(),
            active: ActivePiece {
                kind: Kind::I,
                rot: 0,
                x: SPAWN_X,
                y: SPAWN_Y,
            },
            holder: None,
            score: 0,
            steps: 0,
            game_over: false,
            queue: Vec::with_capacity(queue_size),
            queue_head: 0,
            queue_size,
            scored: 0,
            stream: PieceStream::new(seed),
            obs: Observation::new(queue_size),
        };
        g.start_episode();
        g
    }

    /// Re-initialize every field to the post-construction state, continuing
    /// the existing piece stream. Leaves no residue from the prior episode.
    pub fn reset(&mut self) {
        self.board = empty_board();
        self.holder = None;
        self.score = 0;
        self.steps = 0;
        self.game_over = false;
        self.scored = 0;
        self.start_episode();
    }

    /// Shared tail of `new` and `reset`: refill the queue from the live
    /// stream and bring in the first piece.
    fn start_episode(&mut self) {
        self.queue.clear();
        for _ in 0..self.queue_size {
            let k = self.stream.draw();
            self.queue.push(k);
        }
        self.queue_head = 0;

        self.spawn_piece();
        if !self.fits_active() {
            self.game_over = true;
        }
        self.update_observation();
    }

    // -------------------------------------------------------------------------
    // Queue / holder plumbing
    // -------------------------------------------------------------------------

    /// Pop the queue head, refill that slot from the stream, advance the head.
    fn next_piece(&mut self) -> Kind {
        let k = self.queue[self.queue_head];
        self.queue[self.queue_head] = self.stream.draw();
        self.queue_head = (self.queue_head + 1) % self.queue_size;
        k
    }

    /// Upcoming pieces in draw order (queue head first).
    pub fn queue_preview(&self) -> Vec<Kind> {
        (0..self.queue_size)
            .map(|i| self.queue[(self.queue_head + i) % self.queue_size])
            .collect()
    }

    fn spawn_piece(&mut self) {
        let kind = self.next_piece();
        self.active = ActivePiece {
            kind,
            rot: 0,
            x: SPAWN_X,
            y: SPAWN_Y,
        };
    }

    fn fits_active(&self) -> bool {
        fits_on_board(
            &self.board,
            self.active.kind,
            self.active.rot,
            self.active.x,
            self.active.y,
        )
    }

    // -------------------------------------------------------------------------
    // Step pipeline
    // -------------------------------------------------------------------------

    /// Apply one action, then one gravity unit (`Drop` runs the full lock
    /// pipeline itself and skips gravity), then refresh the observation.
    ///
    /// Under `game_over` the step is a no-op: last observation, reward 0,
    /// terminated true.
    pub fn step(&mut self, action: Action) -> StepResult {
        if self.game_over {
            return StepResult {
                reward: 0.0,
                cleared_lines: 0,
                terminated: true,
            };
        }

        self.scored = 0;
        let locked = self.apply_action(action);
        if !locked && !self.game_over {
            self.gravity_tick();
        }
        self.steps += 1;
        self.update_observation();

        StepResult {
            reward: self.scored as f32,
            cleared_lines: self.scored,
            terminated: self.game_over,
        }
    }

    /// Try-and-revert action semantics. Returns true iff the action was a
    /// hard drop, which has already locked and spawned.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Left => self.try_shift(-1, 0),
            Action::Right => self.try_shift(1, 0),
            Action::Down => self.try_shift(0, -1),
            Action::RotateCw => self.try_rotate(1),
            Action::RotateCcw => self.try_rotate(MAX_ROTS - 1),
            Action::Drop => {
                while self.fits_active() {
                    self.active.y -= 1;
                }
                self.active.y += 1; // back up to the last valid row
                self.settle_active();
                return true;
            }
            Action::Swap => self.swap_holder(),
            Action::Noop => {}
        }
        false
    }

    fn try_shift(&mut self, dx: i32, dy: i32) {
        self.active.x += dx;
        self.active.y += dy;
        if !self.fits_active() {
            self.active.x -= dx;
            self.active.y -= dy;
        }
    }

    fn try_rotate(&mut self, delta: usize) {
        let old = self.active.rot;
        self.active.rot = (self.active.rot + delta) % MAX_ROTS;
        if !self.fits_active() {
            self.active.rot = old;
        }
    }

    /// Holder exchange. The spawn pose is re-applied in both arms; a
    /// collision at the spawn pose ends the game WITHOUT reverting, because
    /// the held piece has already changed hands.
    fn swap_holder(&mut self) {
        let incoming = match self.holder.take() {
            None => {
                self.holder = Some(self.active.kind);
                self.next_piece()
            }
            Some(held) => {
                self.holder = Some(self.active.kind);
                held
            }
        };
        self.active = ActivePiece {
            kind: incoming,
            rot: 0,
            x: SPAWN_X,
            y: SPAWN_Y,
        };
        if !self.fits_active() {
            self.game_over = true;
        }
    }

    /// One gravity unit: sink a row or lock in place.
    fn gravity_tick(&mut self) {
        self.active.y -= 1;
        if !self.fits_active() {
            self.active.y += 1;
            self.settle_active();
        }
    }

    /// Lock the active piece, clear any completed rows it produced, and
    /// bring in the next piece. A blocked spawn ends the game.
    fn settle_active(&mut self) {
        lock_on_board(
            &mut self.board,
            self.active.kind,
            self.active.rot,
            self.active.x,
            self.active.y,
        );
        let cleared = clear_piece_rows(&mut self.board, self.active.y);
        self.scored = cleared;
        self.score += u64::from(cleared);

        self.spawn_piece();
        if !self.fits_active() {
            self.game_over = true;
        }
    }

    // -------------------------------------------------------------------------
    // Observation views
    // -------------------------------------------------------------------------

    pub fn observation(&self) -> &Observation {
        &self.obs
    }

    fn update_observation(&mut self) {
        self.obs.board = self.board;

        self.obs.active = empty_board();
        for &(dx, dy) in cells(self.active.kind, self.active.rot) {
            let bx = (self.active.x + dx) as usize;
            let by = (self.active.y + dy) as usize;
            self.obs.active[by][bx] = 1;
        }

        self.obs.holder = match self.holder {
            Some(kind) => mask_4x4(kind, 1),
            None => [[0u8; PIECE_SIZE]; PIECE_SIZE],
        };

        for i in 0..self.queue_size {
            let kind = self.queue[(self.queue_head + i) % self.queue_size];
            let mask = mask_4x4(kind, 1);
            for r in 0..PIECE_SIZE {
                self.obs.queue[i * PIECE_SIZE + r] = mask[r];
            }
        }
    }

    pub fn render_ascii(&self) -> String {
        let mut s = String::new();
        s.push_str("+----------+\n");
        for r in (0..H_PLAY).rev() {
            s.push('|');
            for c in 0..W_PLAY {
                let v = if self.board[r][c] != 0 {
                    '#'
                } else if self.obs.active[r][c] != 0 {
                    '*'
                } else {
                    ' '
                };
                s.push(v);
            }
            s.push_str("|\n");
        }
        s.push_str("+----------+\n");
        s.push_str(&format!(
            "active={} holder={} score={} steps={} over={}\n",
            self.active.kind.glyph(),
            self.holder.map_or('-', Kind::glyph),
            self.score,
            self.steps,
            self.game_over
        ));
        s
    }
}
