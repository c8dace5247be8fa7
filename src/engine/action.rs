// src/engine/action.rs
#![forbid(unsafe_code)]

/// Fixed action-space dimension (all eight `Action` variants).
pub const ACTION_DIM: usize = 8;

/// The eight discrete per-step commands.
///
/// Rotations wrap mod 4 with no wall kicks; `Drop` locks immediately and
/// skips the gravity unit of that step; everything else (including `Noop`)
/// is followed by one gravity unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Left,
    Right,
    Down,
    RotateCw,
    RotateCcw,
    Drop,
    Swap,
    Noop,
}

impl Action {
    pub fn all() -> &'static [Action; ACTION_DIM] {
        use Action::*;
        &[Left, Right, Down, RotateCw, RotateCcw, Drop, Swap, Noop]
    }

    /// Wire index in `[0, ACTION_DIM)`; this is the encoding policies emit.
    pub fn index(self) -> usize {
        use Action::*;
        match self {
            Left => 0,
            Right => 1,
            Down => 2,
            RotateCw => 3,
            RotateCcw => 4,
            Drop => 5,
            Swap => 6,
            Noop => 7,
        }
    }

    /// Inverse of `index()`. Returns None for out-of-range indices.
    pub fn from_index(idx: usize) -> Option<Self> {
        use Action::*;
        match idx {
            0 => Some(Left),
            1 => Some(Right),
            2 => Some(Down),
            3 => Some(RotateCw),
            4 => Some(RotateCcw),
            5 => Some(Drop),
            6 => Some(Swap),
            7 => Some(Noop),
            _ => None,
        }
    }
}
